//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::adjustment::{AdjustmentEntry, ReferenceEntry};
use crate::types::*;

/// Source of the master and transactional data an adjustment entry reads
///
/// The adjustment core never writes; implement this trait over whatever
/// backend holds invoices, journal entries, accounts and exchange rates.
#[async_trait]
pub trait AdjustmentStorage: Send + Sync {
    /// Receivable or payable account of a party within a company
    async fn get_party_account(
        &self,
        party_type: PartyType,
        party: &str,
        company: &str,
    ) -> AdjustmentResult<Option<PartyAccount>>;

    /// Vouchers with a positive outstanding amount on the party account
    async fn get_outstanding_invoices(
        &self,
        party_type: PartyType,
        party: &str,
        party_account: &str,
        cost_center: Option<&str>,
    ) -> AdjustmentResult<Vec<OutstandingVoucher>>;

    /// Vouchers with a negative outstanding amount (credit and debit notes)
    async fn get_negative_outstanding_invoices(
        &self,
        party_type: PartyType,
        party: &str,
        party_account: &str,
        cost_center: Option<&str>,
    ) -> AdjustmentResult<Vec<OutstandingVoucher>>;

    /// Look up a reference document
    async fn get_voucher(
        &self,
        voucher_type: VoucherType,
        voucher_no: &str,
    ) -> AdjustmentResult<Option<Voucher>>;

    /// Amounts of the GL line behind a journal entry reference
    async fn get_journal_gl_details(
        &self,
        gl_entry: &str,
    ) -> AdjustmentResult<Option<JournalGlDetails>>;

    /// Rate converting one unit of `from` into `to` on a date
    async fn get_exchange_rate(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> AdjustmentResult<Option<BigDecimal>>;

    /// Accounting defaults of a company
    async fn get_company_defaults(&self, company: &str)
        -> AdjustmentResult<Option<CompanyDefaults>>;
}

/// Trait for implementing custom reference row validation rules
pub trait ReferenceValidator: Send + Sync {
    /// Validate one reference row against its looked-up voucher
    fn validate_reference(
        &self,
        doc: &AdjustmentEntry,
        side: ReferenceSide,
        entry: &ReferenceEntry,
        voucher: Option<&Voucher>,
    ) -> AdjustmentResult<()>;
}

/// Default validator: the voucher must exist, be submitted, belong to the
/// document's party account and have enough outstanding for the allocation
pub struct DefaultReferenceValidator;

impl ReferenceValidator for DefaultReferenceValidator {
    fn validate_reference(
        &self,
        doc: &AdjustmentEntry,
        side: ReferenceSide,
        entry: &ReferenceEntry,
        voucher: Option<&Voucher>,
    ) -> AdjustmentResult<()> {
        let voucher = voucher.ok_or_else(|| AdjustmentError::VoucherNotFound {
            voucher_type: entry.voucher_type,
            voucher_no: entry.voucher_number.clone(),
        })?;

        let expected_account = match entry.voucher_type {
            VoucherType::SalesInvoice => doc.customer_account.as_deref(),
            VoucherType::PurchaseInvoice => doc.supplier_account.as_deref(),
            VoucherType::JournalEntry => None,
        };
        if let Some(expected) = expected_account {
            let actual = voucher.party_account.as_deref().unwrap_or_default();
            if actual != expected {
                return Err(AdjustmentError::Validation(format!(
                    "{} {} is associated with {}, but Party Account is {}",
                    entry.voucher_type, entry.voucher_number, actual, expected
                )));
            }
        }

        if !voucher.is_submitted {
            return Err(AdjustmentError::Validation(format!(
                "{} {} must be submitted",
                entry.voucher_type, entry.voucher_number
            )));
        }

        if entry.allocated_amount > BigDecimal::from(0)
            && crate::adjustment::round_amount(&entry.allocated_amount, doc.precision)
                > crate::adjustment::round_amount(&entry.voucher_payment_amount, doc.precision)
        {
            return Err(AdjustmentError::Validation(format!(
                "{} Row #{}: Allocated Amount cannot be greater than outstanding amount.",
                side, entry.idx
            )));
        }

        Ok(())
    }
}
