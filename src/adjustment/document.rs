//! The adjustment entry document and its in-memory computations

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::exchange::{ensure_positive_rate, round_amount, ExchangeRateRecord, ExchangeRateTable};
use super::reference::ReferenceEntry;
use crate::ledger::{make_gl_entries, GlPosting};
use crate::types::*;

/// Document netting a customer's receivables against a supplier's payables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    pub name: String,
    pub company: Option<String>,
    pub posting_date: NaiveDate,
    pub customer: Option<String>,
    pub supplier: Option<String>,
    pub customer_account: Option<String>,
    pub customer_account_currency: Option<String>,
    pub supplier_account: Option<String>,
    pub supplier_account_currency: Option<String>,
    /// Currency allocations are expressed in
    pub payment_currency: String,
    pub company_currency: String,
    pub cost_center: Option<String>,
    /// When unset, allocation clears every row instead of netting
    pub allocate_payment_amount: bool,
    pub exchange_rates: ExchangeRateTable,
    pub debit_entries: Vec<ReferenceEntry>,
    pub credit_entries: Vec<ReferenceEntry>,
    pub receivable_adjusted: BigDecimal,
    pub payable_adjusted: BigDecimal,
    pub total_balance: BigDecimal,
    pub total_gain_loss: BigDecimal,
    pub difference_amount: BigDecimal,
    /// Decimal places for currency amounts
    pub precision: u32,
    pub docstatus: DocStatus,
}

impl AdjustmentEntry {
    /// Create a new draft adjustment entry
    pub fn new(
        name: String,
        posting_date: NaiveDate,
        payment_currency: String,
        company_currency: String,
        precision: u32,
    ) -> Self {
        Self {
            name,
            company: None,
            posting_date,
            customer: None,
            supplier: None,
            customer_account: None,
            customer_account_currency: None,
            supplier_account: None,
            supplier_account_currency: None,
            payment_currency,
            company_currency,
            cost_center: None,
            allocate_payment_amount: false,
            exchange_rates: ExchangeRateTable::new(),
            debit_entries: Vec::new(),
            credit_entries: Vec::new(),
            receivable_adjusted: BigDecimal::from(0),
            payable_adjusted: BigDecimal::from(0),
            total_balance: BigDecimal::from(0),
            total_gain_loss: BigDecimal::from(0),
            difference_amount: BigDecimal::from(0),
            precision,
            docstatus: DocStatus::Draft,
        }
    }

    pub fn entries(&self, side: ReferenceSide) -> &[ReferenceEntry] {
        match side {
            ReferenceSide::DebitEntries => &self.debit_entries,
            ReferenceSide::CreditEntries => &self.credit_entries,
        }
    }

    pub fn entries_mut(&mut self, side: ReferenceSide) -> &mut Vec<ReferenceEntry> {
        match side {
            ReferenceSide::DebitEntries => &mut self.debit_entries,
            ReferenceSide::CreditEntries => &mut self.credit_entries,
        }
    }

    /// Party type, party and order doctype for a reference table
    pub fn party_details(&self, side: ReferenceSide) -> (PartyType, Option<&str>, &'static str) {
        let party_type = side.party_type();
        let party = match party_type {
            PartyType::Customer => self.customer.as_deref(),
            PartyType::Supplier => self.supplier.as_deref(),
        };
        (party_type, party, party_type.order_doctype())
    }

    pub fn party_account(&self, side: ReferenceSide) -> Option<&str> {
        match side {
            ReferenceSide::DebitEntries => self.customer_account.as_deref(),
            ReferenceSide::CreditEntries => self.supplier_account.as_deref(),
        }
    }

    pub fn party_account_currency(&self, side: ReferenceSide) -> Option<&str> {
        match side {
            ReferenceSide::DebitEntries => self.customer_account_currency.as_deref(),
            ReferenceSide::CreditEntries => self.supplier_account_currency.as_deref(),
        }
    }

    /// Store the receivable/payable account resolved for a party
    pub fn set_party_account(&mut self, party_type: PartyType, party_account: PartyAccount) {
        match party_type {
            PartyType::Customer => {
                self.customer_account = Some(party_account.account);
                self.customer_account_currency = Some(party_account.account_currency);
            }
            PartyType::Supplier => {
                self.supplier_account = Some(party_account.account);
                self.supplier_account_currency = Some(party_account.account_currency);
            }
        }
    }

    /// Both party accounts must share a currency that the payment can be made in
    pub fn validate_customer_supplier_account(&self) -> AdjustmentResult<()> {
        let customer_currency = self.customer_account_currency.as_deref();
        let supplier_currency = self.supplier_account_currency.as_deref();

        if self.customer.is_some() && self.supplier.is_some() && customer_currency != supplier_currency
        {
            return Err(AdjustmentError::InvalidAdjustmentEntry(format!(
                "Customer account currency ({}) and supplier account currency ({}) should be same",
                customer_currency.unwrap_or_default(),
                supplier_currency.unwrap_or_default()
            )));
        }

        if let Some(currency) = customer_currency {
            if currency != self.payment_currency && currency != self.company_currency {
                return Err(AdjustmentError::InvalidAdjustmentEntry(format!(
                    "Payment currency ({}) should be same as Customer/Supplier account currency ({})",
                    self.payment_currency, currency
                )));
            }
        }

        Ok(())
    }

    /// Company, customer and supplier are needed before fetching entries
    pub fn check_mandatory_to_fetch(&self) -> AdjustmentResult<()> {
        let fields = [
            ("Company", &self.company),
            ("Customer", &self.customer),
            ("Supplier", &self.supplier),
        ];
        for (label, value) in fields {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(AdjustmentError::MissingField(label.to_string()));
            }
        }
        Ok(())
    }

    /// Drop rows that carry no allocation and renumber the rest
    pub fn clear_unallocated_reference_document_rows(&mut self) {
        for side in [ReferenceSide::DebitEntries, ReferenceSide::CreditEntries] {
            let entries = self.entries_mut(side);
            entries.retain(ReferenceEntry::is_allocated);
            renumber(entries);
        }
    }

    /// Add a rate record unless the currency already has one
    pub fn add_exchange_rate(&mut self, record: ExchangeRateRecord) -> bool {
        self.exchange_rates.push(record)
    }

    /// Currencies needing a rate: those of the given rows plus the payment currency
    pub fn currencies_for<'a, I>(&self, currencies: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for currency in currencies {
            if !unique.iter().any(|c| c == currency) {
                unique.push(currency.to_string());
            }
        }
        if !unique.contains(&self.payment_currency) {
            unique.push(self.payment_currency.clone());
        }
        unique
    }

    /// Fill a row from a voucher and recompute its amounts
    pub fn set_reference_entry_details(
        &self,
        entry: &mut ReferenceEntry,
        side: ReferenceSide,
        voucher: &OutstandingVoucher,
    ) -> AdjustmentResult<()> {
        let party_account_currency = self
            .party_account_currency(ReferenceSide::for_voucher(voucher.voucher_type, side))
            .unwrap_or(self.company_currency.as_str());

        entry.voucher_date = Some(voucher.posting_date);
        entry.currency = voucher
            .currency
            .clone()
            .unwrap_or_else(|| self.company_currency.clone());
        entry.exchange_rate = voucher
            .exchange_rate
            .clone()
            .unwrap_or_else(|| BigDecimal::from(1));
        ensure_positive_rate(&entry.exchange_rate, &entry.currency)?;
        entry.cost_center = voucher.cost_center.clone();

        let outstanding = &voucher.outstanding_amount;
        if party_account_currency != self.company_currency {
            entry.voucher_base_amount = (outstanding * &entry.exchange_rate).abs();
            entry.voucher_amount = outstanding.abs();
        } else {
            entry.voucher_base_amount = outstanding.abs();
            entry.voucher_amount = (&entry.voucher_base_amount / &entry.exchange_rate).abs();
        }

        entry.recalculate_amounts(
            side,
            &self.payment_currency,
            &self.exchange_rates.to_map(),
            self.precision,
        )?;
        entry.supplier_bill_no = voucher.supplier_bill_no.clone();
        entry.supplier_bill_date = voucher.supplier_bill_date;
        Ok(())
    }

    /// Replace a reference table with rows built from outstanding vouchers
    pub fn add_invoice_entries(
        &mut self,
        vouchers: &[OutstandingVoucher],
        side: ReferenceSide,
    ) -> AdjustmentResult<()> {
        let mut entries = Vec::with_capacity(vouchers.len());
        for voucher in vouchers {
            let mut entry = ReferenceEntry::new(voucher.voucher_type, voucher.voucher_no.clone());
            self.set_reference_entry_details(&mut entry, side, voucher)?;
            entries.push(entry);
        }
        renumber(&mut entries);
        *self.entries_mut(side) = entries;
        Ok(())
    }

    /// Refresh a single row from its voucher, failing on duplicate rows
    pub fn refresh_reference(
        &mut self,
        side: ReferenceSide,
        voucher: &OutstandingVoucher,
    ) -> AdjustmentResult<()> {
        let matching = self
            .entries(side)
            .iter()
            .filter(|e| e.matches(voucher.voucher_type, &voucher.voucher_no))
            .count();
        if matching > 1 {
            return Err(AdjustmentError::Validation(format!(
                "{} {} is already present in {}",
                voucher.voucher_type, voucher.voucher_no, side
            )));
        }

        let position = self
            .entries(side)
            .iter()
            .position(|e| e.matches(voucher.voucher_type, &voucher.voucher_no));
        let mut entry = match position {
            Some(i) => self.entries(side)[i].clone(),
            None => ReferenceEntry::new(voucher.voucher_type, voucher.voucher_no.clone()),
        };
        self.set_reference_entry_details(&mut entry, side, voucher)?;

        let entries = self.entries_mut(side);
        match position {
            Some(i) => entries[i] = entry,
            None => {
                entries.push(entry);
                renumber(entries);
            }
        }

        self.calculate_summary_totals();
        Ok(())
    }

    /// Recompute rows of the given tables from the current rates
    pub fn recalculate_references(&mut self, sides: &[ReferenceSide]) -> AdjustmentResult<()> {
        let rates = self.exchange_rates.to_map();
        let payment_currency = self.payment_currency.clone();
        let precision = self.precision;

        for &side in sides {
            for entry in self.entries_mut(side).iter_mut() {
                entry.recalculate_amounts(side, &payment_currency, &rates, precision)?;
            }
        }

        self.calculate_summary_totals();
        Ok(())
    }

    pub fn calculate_summary_totals(&mut self) {
        self.receivable_adjusted = round_amount(
            &total(&self.debit_entries, |e| &e.allocated_amount),
            self.precision,
        );
        self.payable_adjusted = round_amount(
            &total(&self.credit_entries, |e| &e.allocated_amount),
            self.precision,
        );
        self.total_balance = (total(&self.debit_entries, |e| &e.balance)
            - total(&self.credit_entries, |e| &e.balance))
            .abs();
        self.total_gain_loss = total(&self.debit_entries, |e| &e.gain_loss_amount)
            + total(&self.credit_entries, |e| &e.gain_loss_amount);
        self.difference_amount = round_amount(
            &(&self.receivable_adjusted - &self.payable_adjusted).abs(),
            self.precision,
        );
    }

    /// Net the smaller side's outstanding against both tables, oldest row first
    pub fn allocate_amount_to_references(&mut self) -> AdjustmentResult<()> {
        let total_debit_outstanding: BigDecimal = self
            .debit_entries
            .iter()
            .map(|e| &e.voucher_payment_amount)
            .sum();
        let total_credit_outstanding: BigDecimal = self
            .credit_entries
            .iter()
            .map(|e| &e.voucher_payment_amount)
            .sum();

        let allocate_order = if total_debit_outstanding > total_credit_outstanding {
            [ReferenceSide::CreditEntries, ReferenceSide::DebitEntries]
        } else {
            [ReferenceSide::DebitEntries, ReferenceSide::CreditEntries]
        };
        let pool = std::cmp::min(total_debit_outstanding, total_credit_outstanding);
        debug!(
            adjustment = %self.name,
            pool = %pool,
            allocate = self.allocate_payment_amount,
            "allocating outstanding amounts"
        );

        let rates = self.exchange_rates.to_map();
        let payment_currency = self.payment_currency.clone();
        let precision = self.precision;
        let allocate = self.allocate_payment_amount;

        for side in allocate_order {
            let mut remaining = pool.clone();
            for entry in self.entries_mut(side).iter_mut() {
                entry.allocated_amount = BigDecimal::from(0);
                if allocate && remaining > BigDecimal::from(0) {
                    entry.allocated_amount =
                        std::cmp::min(entry.voucher_payment_amount.clone(), remaining.clone());
                    remaining -= &entry.allocated_amount;
                }
                entry.recalculate_amounts(side, &payment_currency, &rates, precision)?;
            }
        }

        self.calculate_summary_totals();
        Ok(())
    }

    /// Build the GL lines for this document, reversed when cancelling
    pub fn make_gl_entries(
        &self,
        defaults: &CompanyDefaults,
        cancel: bool,
    ) -> AdjustmentResult<GlPosting> {
        make_gl_entries(self, defaults, cancel)
    }

    /// Post a draft whose receivable and payable sides agree
    pub fn submit(&mut self, defaults: &CompanyDefaults) -> AdjustmentResult<GlPosting> {
        if self.docstatus != DocStatus::Draft {
            return Err(AdjustmentError::InvalidState(format!(
                "{} must be a draft to submit",
                self.name
            )));
        }
        if self.difference_amount != BigDecimal::from(0) {
            return Err(AdjustmentError::Validation(
                "Difference Amount must be zero".to_string(),
            ));
        }

        let posting = self.make_gl_entries(defaults, false)?;
        self.docstatus = DocStatus::Submitted;
        info!(
            adjustment = %self.name,
            lines = posting.entries.len(),
            gain_loss = %self.total_gain_loss,
            "adjustment entry submitted"
        );
        Ok(posting)
    }

    /// Reverse a submitted document
    pub fn cancel(&mut self, defaults: &CompanyDefaults) -> AdjustmentResult<GlPosting> {
        if self.docstatus != DocStatus::Submitted {
            return Err(AdjustmentError::InvalidState(format!(
                "{} must be submitted to cancel",
                self.name
            )));
        }

        let posting = self.make_gl_entries(defaults, true)?;
        self.docstatus = DocStatus::Cancelled;
        info!(adjustment = %self.name, "adjustment entry cancelled");
        Ok(posting)
    }
}

fn total(entries: &[ReferenceEntry], field: fn(&ReferenceEntry) -> &BigDecimal) -> BigDecimal {
    entries.iter().map(field).sum()
}

fn renumber(entries: &mut [ReferenceEntry]) {
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.idx = i + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn voucher(voucher_type: VoucherType, no: &str, amount: &str, currency: &str, rate: &str) -> OutstandingVoucher {
        let mut v = OutstandingVoucher::new(voucher_type, no.to_string(), date(), dec(amount));
        v.currency = Some(currency.to_string());
        v.exchange_rate = Some(dec(rate));
        v
    }

    fn inr_document() -> AdjustmentEntry {
        let mut doc = AdjustmentEntry::new(
            "ADJ-0001".to_string(),
            date(),
            "INR".to_string(),
            "INR".to_string(),
            2,
        );
        doc.company = Some("Acme".to_string());
        doc.customer = Some("Globex".to_string());
        doc.supplier = Some("Globex Supplies".to_string());
        doc.set_party_account(
            PartyType::Customer,
            PartyAccount {
                account: "Debtors".to_string(),
                account_currency: "INR".to_string(),
            },
        );
        doc.set_party_account(
            PartyType::Supplier,
            PartyAccount {
                account: "Creditors".to_string(),
                account_currency: "INR".to_string(),
            },
        );
        doc.add_exchange_rate(ExchangeRateRecord::new("INR".to_string(), dec("1"), dec("1")));
        doc
    }

    fn defaults() -> CompanyDefaults {
        CompanyDefaults {
            default_currency: "INR".to_string(),
            exchange_gain_loss_account: Some("Exchange Gain/Loss".to_string()),
            cost_center: Some("Main".to_string()),
        }
    }

    #[test]
    fn test_allocation_nets_smaller_side() {
        let mut doc = inr_document();
        doc.add_invoice_entries(
            &[
                voucher(VoucherType::SalesInvoice, "SINV-1", "700", "INR", "1"),
                voucher(VoucherType::SalesInvoice, "SINV-2", "300", "INR", "1"),
            ],
            ReferenceSide::DebitEntries,
        )
        .unwrap();
        doc.add_invoice_entries(
            &[voucher(VoucherType::PurchaseInvoice, "PINV-1", "800", "INR", "1")],
            ReferenceSide::CreditEntries,
        )
        .unwrap();

        doc.allocate_payment_amount = true;
        doc.allocate_amount_to_references().unwrap();

        assert_eq!(doc.debit_entries[0].allocated_amount, dec("700"));
        assert_eq!(doc.debit_entries[1].allocated_amount, dec("100"));
        assert_eq!(doc.debit_entries[1].balance, dec("200"));
        assert_eq!(doc.credit_entries[0].allocated_amount, dec("800"));
        assert_eq!(doc.receivable_adjusted, dec("800"));
        assert_eq!(doc.payable_adjusted, dec("800"));
        assert_eq!(doc.difference_amount, dec("0"));
        assert_eq!(doc.total_balance, dec("200"));
    }

    #[test]
    fn test_allocation_flag_off_clears_rows() {
        let mut doc = inr_document();
        doc.add_invoice_entries(
            &[voucher(VoucherType::SalesInvoice, "SINV-1", "500", "INR", "1")],
            ReferenceSide::DebitEntries,
        )
        .unwrap();
        doc.add_invoice_entries(
            &[voucher(VoucherType::PurchaseInvoice, "PINV-1", "500", "INR", "1")],
            ReferenceSide::CreditEntries,
        )
        .unwrap();
        doc.debit_entries[0].allocated_amount = dec("200");

        doc.allocate_amount_to_references().unwrap();

        assert_eq!(doc.debit_entries[0].allocated_amount, dec("0"));
        assert_eq!(doc.receivable_adjusted, dec("0"));
        assert_eq!(doc.total_balance, dec("0"));
    }

    #[test]
    fn test_party_details_per_side() {
        let doc = inr_document();
        assert_eq!(
            doc.party_details(ReferenceSide::DebitEntries),
            (PartyType::Customer, Some("Globex"), "Sales Order")
        );
        assert_eq!(
            doc.party_details(ReferenceSide::CreditEntries),
            (PartyType::Supplier, Some("Globex Supplies"), "Purchase Order")
        );
    }

    #[test]
    fn test_total_balance_is_not_rounded() {
        let mut doc = inr_document();
        doc.add_invoice_entries(
            &[voucher(VoucherType::SalesInvoice, "SINV-1", "100", "INR", "1")],
            ReferenceSide::DebitEntries,
        )
        .unwrap();
        doc.add_invoice_entries(
            &[voucher(VoucherType::PurchaseInvoice, "PINV-1", "40", "INR", "1")],
            ReferenceSide::CreditEntries,
        )
        .unwrap();
        doc.debit_entries[0].balance = dec("100.125");

        doc.calculate_summary_totals();

        assert_eq!(doc.total_balance, dec("60.125"));
    }

    #[test]
    fn test_clear_unallocated_rows_renumbers() {
        let mut doc = inr_document();
        doc.add_invoice_entries(
            &[
                voucher(VoucherType::SalesInvoice, "SINV-1", "100", "INR", "1"),
                voucher(VoucherType::SalesInvoice, "SINV-2", "100", "INR", "1"),
            ],
            ReferenceSide::DebitEntries,
        )
        .unwrap();
        doc.debit_entries[1].allocated_amount = dec("50");

        doc.clear_unallocated_reference_document_rows();

        assert_eq!(doc.debit_entries.len(), 1);
        assert_eq!(doc.debit_entries[0].voucher_number, "SINV-2");
        assert_eq!(doc.debit_entries[0].idx, 1);
    }

    #[test]
    fn test_company_currency_account_derives_voucher_amount() {
        let mut doc = inr_document();
        doc.add_exchange_rate(ExchangeRateRecord::new("USD".to_string(), dec("80"), dec("80")));
        doc.add_invoice_entries(
            &[voucher(VoucherType::SalesInvoice, "SINV-1", "8000", "USD", "80")],
            ReferenceSide::DebitEntries,
        )
        .unwrap();

        let entry = &doc.debit_entries[0];
        assert_eq!(entry.voucher_base_amount, dec("8000"));
        assert_eq!(entry.voucher_amount, dec("100"));
        assert_eq!(entry.voucher_payment_amount, dec("8000"));
    }

    #[test]
    fn test_currency_mismatch_between_parties() {
        let mut doc = inr_document();
        doc.supplier_account_currency = Some("USD".to_string());

        let err = doc.validate_customer_supplier_account().unwrap_err();
        assert!(matches!(err, AdjustmentError::InvalidAdjustmentEntry(_)));
        assert!(err.to_string().contains("should be same"));
    }

    #[test]
    fn test_payment_currency_must_match_foreign_account() {
        let mut doc = inr_document();
        doc.customer_account_currency = Some("USD".to_string());
        doc.supplier_account_currency = Some("USD".to_string());
        doc.payment_currency = "EUR".to_string();

        let err = doc.validate_customer_supplier_account().unwrap_err();
        assert!(err.to_string().contains("Payment currency (EUR)"));

        doc.payment_currency = "USD".to_string();
        assert!(doc.validate_customer_supplier_account().is_ok());
    }

    #[test]
    fn test_mandatory_fields() {
        let mut doc = inr_document();
        doc.supplier = None;

        let err = doc.check_mandatory_to_fetch().unwrap_err();
        assert_eq!(err.to_string(), "Please select Supplier first");
    }

    #[test]
    fn test_refresh_reference_rejects_duplicates() {
        let mut doc = inr_document();
        let sinv = voucher(VoucherType::SalesInvoice, "SINV-1", "100", "INR", "1");
        doc.add_invoice_entries(&[sinv.clone(), sinv.clone()], ReferenceSide::DebitEntries)
            .unwrap();

        let err = doc
            .refresh_reference(ReferenceSide::DebitEntries, &sinv)
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Sales Invoice SINV-1 is already present in debit_entries"));
    }

    #[test]
    fn test_refresh_reference_appends_missing_row() {
        let mut doc = inr_document();
        let pinv = voucher(VoucherType::PurchaseInvoice, "PINV-9", "250", "INR", "1");

        doc.refresh_reference(ReferenceSide::CreditEntries, &pinv)
            .unwrap();

        assert_eq!(doc.credit_entries.len(), 1);
        assert_eq!(doc.credit_entries[0].idx, 1);
        assert_eq!(doc.credit_entries[0].voucher_payment_amount, dec("250"));
    }

    #[test]
    fn test_submit_requires_zero_difference() {
        let mut doc = inr_document();
        doc.add_invoice_entries(
            &[voucher(VoucherType::SalesInvoice, "SINV-1", "100", "INR", "1")],
            ReferenceSide::DebitEntries,
        )
        .unwrap();
        doc.debit_entries[0].allocated_amount = dec("100");
        doc.calculate_summary_totals();

        let err = doc.submit(&defaults()).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Difference Amount must be zero");
        assert_eq!(doc.docstatus, DocStatus::Draft);
    }

    #[test]
    fn test_submit_and_cancel_lifecycle() {
        let mut doc = inr_document();
        doc.add_invoice_entries(
            &[voucher(VoucherType::SalesInvoice, "SINV-1", "400", "INR", "1")],
            ReferenceSide::DebitEntries,
        )
        .unwrap();
        doc.add_invoice_entries(
            &[voucher(VoucherType::PurchaseInvoice, "PINV-1", "300", "INR", "1")],
            ReferenceSide::CreditEntries,
        )
        .unwrap();
        doc.allocate_payment_amount = true;
        doc.allocate_amount_to_references().unwrap();

        assert!(doc.cancel(&defaults()).is_err());

        let posting = doc.submit(&defaults()).unwrap();
        assert_eq!(doc.docstatus, DocStatus::Submitted);
        assert!(posting.is_balanced());
        assert_eq!(posting.entries.len(), 2);
        assert!(doc.submit(&defaults()).is_err());

        let reversal = doc.cancel(&defaults()).unwrap();
        assert_eq!(doc.docstatus, DocStatus::Cancelled);
        assert!(reversal.is_cancellation);
        assert_eq!(reversal.total_debit(), dec("300"));
    }
}
