//! General ledger lines and balanced postings

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Voucher type stamped on every line produced by an adjustment entry
pub const ADJUSTMENT_VOUCHER_TYPE: &str = "Adjustment Entry";

/// A single general ledger line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlEntry {
    pub name: String,
    pub posting_date: NaiveDate,
    pub account: String,
    pub party_type: Option<PartyType>,
    pub party: Option<String>,
    pub against: Option<String>,
    pub account_currency: String,
    pub cost_center: Option<String>,
    pub against_voucher_type: Option<VoucherType>,
    pub against_voucher: Option<String>,
    pub voucher_type: String,
    pub voucher_no: String,
    /// Debit in company currency
    pub debit: BigDecimal,
    /// Credit in company currency
    pub credit: BigDecimal,
    pub debit_in_account_currency: BigDecimal,
    pub credit_in_account_currency: BigDecimal,
}

impl GlEntry {
    /// Same line with debit and credit columns swapped
    pub fn reversed(&self) -> Self {
        Self {
            name: uuid::Uuid::new_v4().to_string(),
            debit: self.credit.clone(),
            credit: self.debit.clone(),
            debit_in_account_currency: self.credit_in_account_currency.clone(),
            credit_in_account_currency: self.debit_in_account_currency.clone(),
            ..self.clone()
        }
    }

    pub fn is_debit(&self) -> bool {
        self.debit > BigDecimal::from(0)
    }
}

/// Builder for GL lines of one voucher
#[derive(Debug)]
pub struct GlEntryBuilder {
    entry: GlEntry,
}

impl GlEntryBuilder {
    /// Start a line for an account with zero amounts
    pub fn new(
        voucher_no: String,
        posting_date: NaiveDate,
        account: String,
        account_currency: String,
    ) -> Self {
        Self {
            entry: GlEntry {
                name: uuid::Uuid::new_v4().to_string(),
                posting_date,
                account,
                party_type: None,
                party: None,
                against: None,
                account_currency,
                cost_center: None,
                against_voucher_type: None,
                against_voucher: None,
                voucher_type: ADJUSTMENT_VOUCHER_TYPE.to_string(),
                voucher_no,
                debit: BigDecimal::from(0),
                credit: BigDecimal::from(0),
                debit_in_account_currency: BigDecimal::from(0),
                credit_in_account_currency: BigDecimal::from(0),
            },
        }
    }

    pub fn party(mut self, party_type: PartyType, party: String) -> Self {
        self.entry.party_type = Some(party_type);
        self.entry.party = Some(party);
        self
    }

    pub fn against(mut self, against: String) -> Self {
        self.entry.against = Some(against);
        self
    }

    pub fn cost_center(mut self, cost_center: Option<String>) -> Self {
        self.entry.cost_center = cost_center;
        self
    }

    pub fn against_voucher(mut self, voucher_type: VoucherType, voucher_no: String) -> Self {
        self.entry.against_voucher_type = Some(voucher_type);
        self.entry.against_voucher = Some(voucher_no);
        self
    }

    /// Set the debit side in company and account currency
    pub fn debit(mut self, amount: BigDecimal, amount_in_account_currency: BigDecimal) -> Self {
        self.entry.debit = amount;
        self.entry.debit_in_account_currency = amount_in_account_currency;
        self
    }

    /// Set the credit side in company and account currency
    pub fn credit(mut self, amount: BigDecimal, amount_in_account_currency: BigDecimal) -> Self {
        self.entry.credit = amount;
        self.entry.credit_in_account_currency = amount_in_account_currency;
        self
    }

    pub fn build(self) -> GlEntry {
        self.entry
    }
}

/// The full set of GL lines for one adjustment entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlPosting {
    pub entries: Vec<GlEntry>,
    /// Whether this posting reverses an earlier one
    pub is_cancellation: bool,
}

impl GlPosting {
    pub fn new(entries: Vec<GlEntry>) -> Self {
        Self {
            entries,
            is_cancellation: false,
        }
    }

    /// Calculate total debits in company currency
    pub fn total_debit(&self) -> BigDecimal {
        self.entries.iter().map(|e| &e.debit).sum()
    }

    /// Calculate total credits in company currency
    pub fn total_credit(&self) -> BigDecimal {
        self.entries.iter().map(|e| &e.credit).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debit() == self.total_credit()
    }

    /// Lines posted to one account
    pub fn entries_for_account<'a>(&'a self, account: &'a str) -> impl Iterator<Item = &'a GlEntry> {
        self.entries.iter().filter(move |e| e.account == account)
    }

    /// Check the posting can be handed to the ledger
    pub fn validate(&self) -> AdjustmentResult<()> {
        if self.entries.is_empty() {
            return Err(AdjustmentError::Validation(
                "Posting must have at least one GL entry".to_string(),
            ));
        }

        for entry in &self.entries {
            if entry.debit < BigDecimal::from(0) || entry.credit < BigDecimal::from(0) {
                return Err(AdjustmentError::Validation(format!(
                    "GL entry for account '{}' has a negative amount",
                    entry.account
                )));
            }
        }

        if !self.is_balanced() {
            return Err(AdjustmentError::UnbalancedPosting {
                debit: self.total_debit(),
                credit: self.total_credit(),
            });
        }

        Ok(())
    }

    /// Posting that undoes this one line by line
    pub fn reversed(&self) -> Self {
        Self {
            entries: self.entries.iter().map(GlEntry::reversed).collect(),
            is_cancellation: !self.is_cancellation,
        }
    }
}
