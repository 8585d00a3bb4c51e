//! Core types and data structures for adjustment entries

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Voucher types that can be netted by an adjustment entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    /// Sales invoice (or a credit note when its outstanding is negative)
    SalesInvoice,
    /// Purchase invoice (or a debit note when its outstanding is negative)
    PurchaseInvoice,
    /// Journal entry booked against a party account
    JournalEntry,
}

impl VoucherType {
    /// All voucher types accepted as adjustment references
    pub const ALL: [VoucherType; 3] = [
        VoucherType::SalesInvoice,
        VoucherType::PurchaseInvoice,
        VoucherType::JournalEntry,
    ];

    /// Display name used in messages and GL entries
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherType::SalesInvoice => "Sales Invoice",
            VoucherType::PurchaseInvoice => "Purchase Invoice",
            VoucherType::JournalEntry => "Journal Entry",
        }
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoucherType {
    type Err = AdjustmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoucherType::ALL
            .iter()
            .copied()
            .find(|voucher_type| voucher_type.as_str() == s)
            .ok_or_else(|| {
                AdjustmentError::Validation(
                    "Reference Doctype must be one of Sales Invoice, Purchase Invoice or Journal Entry"
                        .to_string(),
                )
            })
    }
}

/// Party side of the adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyType {
    Customer,
    Supplier,
}

impl PartyType {
    /// Order doctype associated with the party
    pub fn order_doctype(&self) -> &'static str {
        match self {
            PartyType::Customer => "Sales Order",
            PartyType::Supplier => "Purchase Order",
        }
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyType::Customer => f.write_str("Customer"),
            PartyType::Supplier => f.write_str("Supplier"),
        }
    }
}

/// Which reference table a row belongs to
///
/// Debit entries hold what the customer owes us (sales invoices and debit
/// notes), credit entries hold what we owe (purchase invoices and credit notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceSide {
    DebitEntries,
    CreditEntries,
}

impl ReferenceSide {
    /// Party whose account the side is settled against
    pub fn party_type(&self) -> PartyType {
        match self {
            ReferenceSide::DebitEntries => PartyType::Customer,
            ReferenceSide::CreditEntries => PartyType::Supplier,
        }
    }

    /// The side on the other end of the netting
    pub fn opposite(&self) -> ReferenceSide {
        match self {
            ReferenceSide::DebitEntries => ReferenceSide::CreditEntries,
            ReferenceSide::CreditEntries => ReferenceSide::DebitEntries,
        }
    }

    /// Side whose party account a voucher is booked on
    ///
    /// Invoices always belong to their own party; journal entries follow the
    /// table they were listed in.
    pub fn for_voucher(voucher_type: VoucherType, listed_in: ReferenceSide) -> ReferenceSide {
        match voucher_type {
            VoucherType::SalesInvoice => ReferenceSide::DebitEntries,
            VoucherType::PurchaseInvoice => ReferenceSide::CreditEntries,
            VoucherType::JournalEntry => listed_in,
        }
    }
}

impl fmt::Display for ReferenceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSide::DebitEntries => f.write_str("debit_entries"),
            ReferenceSide::CreditEntries => f.write_str("credit_entries"),
        }
    }
}

/// Lifecycle status of an adjustment entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocStatus {
    #[default]
    Draft,
    Submitted,
    Cancelled,
}

/// Outstanding voucher as reported by the storage backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingVoucher {
    pub voucher_type: VoucherType,
    pub voucher_no: String,
    /// GL entry backing a journal entry row
    pub gl_entry: Option<String>,
    pub posting_date: NaiveDate,
    /// Signed outstanding amount; negative for credit and debit notes
    pub outstanding_amount: BigDecimal,
    pub currency: Option<String>,
    pub exchange_rate: Option<BigDecimal>,
    pub cost_center: Option<String>,
    pub supplier_bill_no: Option<String>,
    pub supplier_bill_date: Option<NaiveDate>,
}

impl OutstandingVoucher {
    /// Create an outstanding voucher with no enrichment applied yet
    pub fn new(
        voucher_type: VoucherType,
        voucher_no: String,
        posting_date: NaiveDate,
        outstanding_amount: BigDecimal,
    ) -> Self {
        Self {
            voucher_type,
            voucher_no,
            gl_entry: None,
            posting_date,
            outstanding_amount,
            currency: None,
            exchange_rate: None,
            cost_center: None,
            supplier_bill_no: None,
            supplier_bill_date: None,
        }
    }
}

/// A submitted reference document looked up by type and number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub voucher_type: VoucherType,
    pub voucher_no: String,
    pub posting_date: NaiveDate,
    pub outstanding_amount: BigDecimal,
    pub currency: String,
    /// Voucher currency to company currency rate
    pub conversion_rate: BigDecimal,
    pub cost_center: Option<String>,
    /// `debit_to` for sales invoices, `credit_to` for purchase invoices
    pub party_account: Option<String>,
    pub is_submitted: bool,
    pub supplier_bill_no: Option<String>,
    pub supplier_bill_date: Option<NaiveDate>,
}

impl Voucher {
    /// View the voucher the way outstanding queries report it
    pub fn to_outstanding(&self) -> OutstandingVoucher {
        OutstandingVoucher {
            voucher_type: self.voucher_type,
            voucher_no: self.voucher_no.clone(),
            gl_entry: None,
            posting_date: self.posting_date,
            outstanding_amount: self.outstanding_amount.clone(),
            currency: Some(self.currency.clone()),
            exchange_rate: Some(self.conversion_rate.clone()),
            cost_center: self.cost_center.clone(),
            supplier_bill_no: self.supplier_bill_no.clone(),
            supplier_bill_date: self.supplier_bill_date,
        }
    }
}

/// Amounts on the GL line behind a journal entry reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalGlDetails {
    pub debit: BigDecimal,
    pub debit_in_account_currency: BigDecimal,
    pub account_currency: String,
    pub cost_center: Option<String>,
}

/// Receivable or payable account of a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAccount {
    pub account: String,
    pub account_currency: String,
}

/// Company level accounting defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDefaults {
    pub default_currency: String,
    pub exchange_gain_loss_account: Option<String>,
    pub cost_center: Option<String>,
}

/// Errors that can occur while building or posting an adjustment entry
#[derive(Debug, thiserror::Error)]
pub enum AdjustmentError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid adjustment entry: {0}")]
    InvalidAdjustmentEntry(String),
    #[error("Please select {0} first")]
    MissingField(String),
    #[error("{voucher_type} {voucher_no} does not exist")]
    VoucherNotFound {
        voucher_type: VoucherType,
        voucher_no: String,
    },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("GL entries are not balanced: debit = {debit}, credit = {credit}")]
    UnbalancedPosting {
        debit: BigDecimal,
        credit: BigDecimal,
    },
    #[error("Exchange gain loss account not set for {0}")]
    MissingExchangeGainLossAccount(String),
    #[error("Invalid exchange rate for {0}")]
    InvalidExchangeRate(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

/// Result type for adjustment operations
pub type AdjustmentResult<T> = Result<T, AdjustmentError>;
