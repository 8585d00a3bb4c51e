//! # Adjustment Core
//!
//! Nets the outstanding receivables of a customer against the outstanding
//! payables of the matching supplier, computes the realised exchange gain or
//! loss and produces balanced general ledger postings.
//!
//! ## Features
//!
//! - **Outstanding fetch**: Invoices, credit notes, debit notes and journal entries for both parties
//! - **Multi-currency**: Payment currency and company currency rates per voucher currency
//! - **Allocation**: Greedy netting of the smaller side against both reference tables
//! - **GL posting**: Party lines plus an exchange gain/loss line, with reversal on cancel
//! - **Storage abstraction**: Database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use adjustment_core::{AdjustmentManager, AdjustmentSettings};
//! use adjustment_core::utils::MemoryStorage;
//!
//! // Any AdjustmentStorage implementation can back the manager
//! let manager = AdjustmentManager::new(MemoryStorage::new(), AdjustmentSettings::default());
//! assert_eq!(manager.settings().currency_precision, 2);
//! ```

pub mod adjustment;
pub mod ledger;
pub mod settings;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use adjustment::*;
pub use ledger::*;
pub use settings::AdjustmentSettings;
pub use traits::*;
pub use types::*;
