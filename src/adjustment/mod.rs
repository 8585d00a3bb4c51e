//! Adjustment entries netting receivables against payables

pub mod document;
pub mod exchange;
pub mod manager;
pub mod reference;

pub use document::*;
pub use exchange::*;
pub use manager::*;
pub use reference::*;
