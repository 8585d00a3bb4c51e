//! Storage-backed operations on adjustment entries

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::document::AdjustmentEntry;
use super::exchange::{ensure_positive_rate, ExchangeRateRecord};
use crate::ledger::GlPosting;
use crate::settings::AdjustmentSettings;
use crate::traits::*;
use crate::types::*;

const BOTH_SIDES: [ReferenceSide; 2] = [ReferenceSide::DebitEntries, ReferenceSide::CreditEntries];

/// Adjustment manager for fetching, allocating, validating and posting
pub struct AdjustmentManager<S: AdjustmentStorage> {
    storage: S,
    validator: Box<dyn ReferenceValidator>,
    settings: AdjustmentSettings,
}

impl<S: AdjustmentStorage> AdjustmentManager<S> {
    /// Create a new adjustment manager
    pub fn new(storage: S, settings: AdjustmentSettings) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultReferenceValidator),
            settings,
        }
    }

    /// Create a new adjustment manager with custom validator
    pub fn with_validator(
        storage: S,
        settings: AdjustmentSettings,
        validator: Box<dyn ReferenceValidator>,
    ) -> Self {
        Self {
            storage,
            validator,
            settings,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn settings(&self) -> &AdjustmentSettings {
        &self.settings
    }

    /// Start a draft for a company, taking its currency from the company defaults
    pub async fn new_document(
        &self,
        name: String,
        company: &str,
        posting_date: NaiveDate,
        payment_currency: String,
    ) -> AdjustmentResult<AdjustmentEntry> {
        let defaults = self.company_defaults(company).await?;
        let mut doc = AdjustmentEntry::new(
            name,
            posting_date,
            payment_currency,
            defaults.default_currency,
            self.settings.currency_precision,
        );
        doc.company = Some(company.to_string());
        Ok(doc)
    }

    /// Resolve and store the account of the customer or supplier
    pub async fn set_party_account_details(
        &self,
        doc: &mut AdjustmentEntry,
        party_type: PartyType,
    ) -> AdjustmentResult<()> {
        let company = doc
            .company
            .clone()
            .ok_or_else(|| AdjustmentError::MissingField("Company".to_string()))?;
        let party = match party_type {
            PartyType::Customer => doc.customer.clone(),
            PartyType::Supplier => doc.supplier.clone(),
        }
        .ok_or_else(|| AdjustmentError::MissingField(party_type.to_string()))?;

        let account = self
            .storage
            .get_party_account(party_type, &party, &company)
            .await?
            .ok_or_else(|| {
                AdjustmentError::Validation(format!(
                    "No party account found for {} {} in {}",
                    party_type, party, company
                ))
            })?;
        doc.set_party_account(party_type, account);
        Ok(())
    }

    /// Load every outstanding voucher of both parties without allocating
    pub async fn get_unreconciled_entries(&self, doc: &mut AdjustmentEntry) -> AdjustmentResult<()> {
        doc.allocate_payment_amount = false;
        doc.check_mandatory_to_fetch()?;
        self.get_entries(doc).await?;
        doc.calculate_summary_totals();
        Ok(())
    }

    /// Fetch invoices and notes for both parties and rebuild the reference tables
    pub async fn get_entries(&self, doc: &mut AdjustmentEntry) -> AdjustmentResult<()> {
        let sales_invoices = self
            .get_positive_outstanding_entries(doc, ReferenceSide::DebitEntries)
            .await?;
        let credit_notes = self
            .get_negative_outstanding_entries(doc, ReferenceSide::DebitEntries)
            .await?;
        let purchase_invoices = self
            .get_positive_outstanding_entries(doc, ReferenceSide::CreditEntries)
            .await?;
        let debit_notes = self
            .get_negative_outstanding_entries(doc, ReferenceSide::CreditEntries)
            .await?;

        info!(
            adjustment = %doc.name,
            sales_invoices = sales_invoices.len(),
            credit_notes = credit_notes.len(),
            purchase_invoices = purchase_invoices.len(),
            debit_notes = debit_notes.len(),
            "fetched outstanding vouchers"
        );

        let currencies = doc.currencies_for(
            sales_invoices
                .iter()
                .chain(&purchase_invoices)
                .chain(&credit_notes)
                .chain(&debit_notes)
                .filter_map(|v| v.currency.as_deref()),
        );
        self.get_exchange_rates(doc, &currencies).await?;

        let debit_vouchers: Vec<OutstandingVoucher> =
            sales_invoices.into_iter().chain(debit_notes).collect();
        let credit_vouchers: Vec<OutstandingVoucher> =
            purchase_invoices.into_iter().chain(credit_notes).collect();
        doc.add_invoice_entries(&debit_vouchers, ReferenceSide::DebitEntries)?;
        doc.add_invoice_entries(&credit_vouchers, ReferenceSide::CreditEntries)?;
        Ok(())
    }

    /// Invoices the party still owes or is owed
    pub async fn get_positive_outstanding_entries(
        &self,
        doc: &AdjustmentEntry,
        side: ReferenceSide,
    ) -> AdjustmentResult<Vec<OutstandingVoucher>> {
        let (party_type, party, party_account) = self.party_query(doc, side)?;
        let mut vouchers = self
            .storage
            .get_outstanding_invoices(party_type, party, party_account, self.cost_center_filter(doc))
            .await?;
        self.get_extra_invoice_details(&mut vouchers).await?;
        Ok(vouchers)
    }

    /// Returns and notes leaving a negative outstanding on the party account
    pub async fn get_negative_outstanding_entries(
        &self,
        doc: &AdjustmentEntry,
        side: ReferenceSide,
    ) -> AdjustmentResult<Vec<OutstandingVoucher>> {
        let (party_type, party, party_account) = self.party_query(doc, side)?;
        let mut vouchers = self
            .storage
            .get_negative_outstanding_invoices(
                party_type,
                party,
                party_account,
                self.cost_center_filter(doc),
            )
            .await?;
        self.get_extra_invoice_details(&mut vouchers).await?;
        Ok(vouchers)
    }

    /// Fill in currency, rate and cost center from the underlying vouchers
    pub async fn get_extra_invoice_details(
        &self,
        vouchers: &mut [OutstandingVoucher],
    ) -> AdjustmentResult<()> {
        for voucher in vouchers.iter_mut() {
            voucher.exchange_rate = Some(BigDecimal::from(1));

            match voucher.voucher_type {
                VoucherType::SalesInvoice | VoucherType::PurchaseInvoice => {
                    let details = self
                        .storage
                        .get_voucher(voucher.voucher_type, &voucher.voucher_no)
                        .await?
                        .ok_or_else(|| AdjustmentError::VoucherNotFound {
                            voucher_type: voucher.voucher_type,
                            voucher_no: voucher.voucher_no.clone(),
                        })?;
                    voucher.exchange_rate = Some(details.conversion_rate);
                    voucher.currency = Some(details.currency);
                    voucher.cost_center = details.cost_center;
                    if voucher.voucher_type == VoucherType::PurchaseInvoice {
                        voucher.supplier_bill_no = details.supplier_bill_no;
                        voucher.supplier_bill_date = details.supplier_bill_date;
                    }
                }
                VoucherType::JournalEntry => {
                    let gl_entry = voucher
                        .gl_entry
                        .clone()
                        .unwrap_or_else(|| voucher.voucher_no.clone());
                    let details = self
                        .storage
                        .get_journal_gl_details(&gl_entry)
                        .await?
                        .ok_or_else(|| AdjustmentError::VoucherNotFound {
                            voucher_type: voucher.voucher_type,
                            voucher_no: voucher.voucher_no.clone(),
                        })?;
                    ensure_positive_rate(
                        &details.debit_in_account_currency.abs(),
                        &details.account_currency,
                    )?;
                    voucher.exchange_rate =
                        Some(&details.debit / &details.debit_in_account_currency);
                    voucher.currency = Some(details.account_currency);
                    voucher.cost_center = details.cost_center;
                }
            }
        }
        Ok(())
    }

    /// Add the rate record of a currency if the document lacks one
    pub async fn add_invoice_currency_exchange_rate(
        &self,
        doc: &mut AdjustmentEntry,
        currency: &str,
    ) -> AdjustmentResult<()> {
        if doc.exchange_rates.contains(currency) {
            return Ok(());
        }

        let to_payment = self
            .rate_or_one(currency, &doc.payment_currency, doc.posting_date)
            .await?;
        let to_base = self
            .rate_or_one(currency, &doc.company_currency, doc.posting_date)
            .await?;
        doc.add_exchange_rate(ExchangeRateRecord::new(
            currency.to_string(),
            to_payment,
            to_base,
        ));
        Ok(())
    }

    /// Rebuild the rate table for the given currencies
    pub async fn get_exchange_rates(
        &self,
        doc: &mut AdjustmentEntry,
        currencies: &[String],
    ) -> AdjustmentResult<()> {
        doc.exchange_rates.clear();
        for currency in currencies {
            self.add_invoice_currency_exchange_rate(doc, currency).await?;
        }
        Ok(())
    }

    /// Refetch rates for the current rows and recompute every row and total
    pub async fn recalculate_tables(&self, doc: &mut AdjustmentEntry) -> AdjustmentResult<()> {
        let currencies = doc.currencies_for(
            doc.debit_entries
                .iter()
                .chain(&doc.credit_entries)
                .map(|e| e.currency.as_str()),
        );
        self.get_exchange_rates(doc, &currencies).await?;
        doc.recalculate_references(&BOTH_SIDES)
    }

    /// Load one reference document into its row, adding the row when needed
    pub async fn add_reference_doc_details(
        &self,
        doc: &mut AdjustmentEntry,
        side: ReferenceSide,
        voucher_type: VoucherType,
        voucher_no: &str,
    ) -> AdjustmentResult<()> {
        let voucher = self
            .storage
            .get_voucher(voucher_type, voucher_no)
            .await?
            .ok_or_else(|| AdjustmentError::VoucherNotFound {
                voucher_type,
                voucher_no: voucher_no.to_string(),
            })?;
        self.add_invoice_currency_exchange_rate(doc, &voucher.currency)
            .await?;
        doc.refresh_reference(side, &voucher.to_outstanding())
    }

    /// Check currencies and every reference row, then drop unallocated rows
    pub async fn validate(&self, doc: &mut AdjustmentEntry) -> AdjustmentResult<()> {
        doc.validate_customer_supplier_account()?;

        for side in BOTH_SIDES {
            for entry in doc.entries(side) {
                let voucher = self
                    .storage
                    .get_voucher(entry.voucher_type, &entry.voucher_number)
                    .await?;
                self.validator
                    .validate_reference(doc, side, entry, voucher.as_ref())?;
            }
        }

        doc.clear_unallocated_reference_document_rows();
        debug!(
            adjustment = %doc.name,
            debit_rows = doc.debit_entries.len(),
            credit_rows = doc.credit_entries.len(),
            "adjustment entry validated"
        );
        Ok(())
    }

    /// The company must name an account for exchange differences
    pub async fn validate_company_exchange_gain_loss_account(
        &self,
        company: &str,
    ) -> AdjustmentResult<String> {
        self.company_defaults(company)
            .await?
            .exchange_gain_loss_account
            .ok_or_else(|| AdjustmentError::MissingExchangeGainLossAccount(company.to_string()))
    }

    /// Validate and post the document
    pub async fn submit(&self, doc: &mut AdjustmentEntry) -> AdjustmentResult<GlPosting> {
        self.validate(doc).await?;
        let defaults = self.document_company_defaults(doc).await?;
        doc.submit(&defaults)
    }

    /// Reverse a submitted document's postings
    pub async fn cancel(&self, doc: &mut AdjustmentEntry) -> AdjustmentResult<GlPosting> {
        let defaults = self.document_company_defaults(doc).await?;
        doc.cancel(&defaults)
    }

    async fn company_defaults(&self, company: &str) -> AdjustmentResult<CompanyDefaults> {
        self.storage
            .get_company_defaults(company)
            .await?
            .ok_or_else(|| AdjustmentError::Validation(format!("Company {} does not exist", company)))
    }

    async fn document_company_defaults(
        &self,
        doc: &AdjustmentEntry,
    ) -> AdjustmentResult<CompanyDefaults> {
        let company = doc
            .company
            .as_deref()
            .ok_or_else(|| AdjustmentError::MissingField("Company".to_string()))?;
        self.company_defaults(company).await
    }

    async fn rate_or_one(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> AdjustmentResult<BigDecimal> {
        if from_currency == to_currency {
            return Ok(BigDecimal::from(1));
        }

        match self
            .storage
            .get_exchange_rate(from_currency, to_currency, date)
            .await?
        {
            Some(rate) if rate > BigDecimal::from(0) => Ok(rate),
            _ => {
                warn!(
                    from = from_currency,
                    to = to_currency,
                    %date,
                    "no exchange rate found, using 1"
                );
                Ok(BigDecimal::from(1))
            }
        }
    }

    fn party_query<'a>(
        &self,
        doc: &'a AdjustmentEntry,
        side: ReferenceSide,
    ) -> AdjustmentResult<(PartyType, &'a str, &'a str)> {
        let (party_type, party, order_doctype) = doc.party_details(side);
        let party = party.ok_or_else(|| AdjustmentError::MissingField(party_type.to_string()))?;
        let party_account = doc
            .party_account(side)
            .ok_or_else(|| AdjustmentError::MissingField(format!("{} Account", party_type)))?;
        debug!(
            adjustment = %doc.name,
            %party_type,
            party,
            party_account,
            order_doctype,
            "fetching outstanding vouchers"
        );
        Ok((party_type, party, party_account))
    }

    fn cost_center_filter<'a>(&self, doc: &'a AdjustmentEntry) -> Option<&'a str> {
        if self.settings.allow_cost_center_in_entry_of_bs_account {
            doc.cost_center.as_deref()
        } else {
            None
        }
    }
}
