//! Ledger module containing GL lines and adjustment postings

pub mod gl_entry;
pub mod posting;

pub use gl_entry::*;
pub use posting::*;
