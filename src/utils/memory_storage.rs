//! In-memory storage implementation for testing

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Clone)]
struct OutstandingRow {
    party_type: PartyType,
    party: String,
    party_account: String,
    voucher: OutstandingVoucher,
}

#[derive(Debug, Default)]
struct Tables {
    party_accounts: HashMap<(PartyType, String, String), PartyAccount>,
    outstanding: Vec<OutstandingRow>,
    vouchers: HashMap<(VoucherType, String), Voucher>,
    journal_gl: HashMap<String, JournalGlDetails>,
    exchange_rates: HashMap<(String, String), BigDecimal>,
    companies: HashMap<String, CompanyDefaults>,
}

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AdjustmentResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AdjustmentError::Storage("memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> AdjustmentResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AdjustmentError::Storage("memory storage lock poisoned".to_string()))
    }

    pub fn insert_company(&self, company: &str, defaults: CompanyDefaults) -> AdjustmentResult<()> {
        self.write()?.companies.insert(company.to_string(), defaults);
        Ok(())
    }

    pub fn insert_party_account(
        &self,
        party_type: PartyType,
        party: &str,
        company: &str,
        account: PartyAccount,
    ) -> AdjustmentResult<()> {
        self.write()?.party_accounts.insert(
            (party_type, party.to_string(), company.to_string()),
            account,
        );
        Ok(())
    }

    /// Register a voucher and, when it has an outstanding amount, list it as outstanding
    pub fn insert_voucher(
        &self,
        party_type: PartyType,
        party: &str,
        voucher: Voucher,
    ) -> AdjustmentResult<()> {
        let mut tables = self.write()?;
        if voucher.is_submitted && voucher.outstanding_amount != BigDecimal::from(0) {
            let mut outstanding = OutstandingVoucher::new(
                voucher.voucher_type,
                voucher.voucher_no.clone(),
                voucher.posting_date,
                voucher.outstanding_amount.clone(),
            );
            outstanding.cost_center = voucher.cost_center.clone();
            tables.outstanding.push(OutstandingRow {
                party_type,
                party: party.to_string(),
                party_account: voucher.party_account.clone().unwrap_or_default(),
                voucher: outstanding,
            });
        }
        tables
            .vouchers
            .insert((voucher.voucher_type, voucher.voucher_no.clone()), voucher);
        Ok(())
    }

    /// Register a journal entry line left outstanding against a party account
    pub fn insert_journal_entry(
        &self,
        party_type: PartyType,
        party: &str,
        party_account: &str,
        voucher: OutstandingVoucher,
        details: JournalGlDetails,
    ) -> AdjustmentResult<()> {
        let mut tables = self.write()?;
        let gl_entry = voucher
            .gl_entry
            .clone()
            .unwrap_or_else(|| voucher.voucher_no.clone());
        let conversion_rate = if details.debit_in_account_currency == BigDecimal::from(0) {
            BigDecimal::from(1)
        } else {
            &details.debit / &details.debit_in_account_currency
        };
        tables.vouchers.insert(
            (VoucherType::JournalEntry, voucher.voucher_no.clone()),
            Voucher {
                voucher_type: VoucherType::JournalEntry,
                voucher_no: voucher.voucher_no.clone(),
                posting_date: voucher.posting_date,
                outstanding_amount: voucher.outstanding_amount.clone(),
                currency: details.account_currency.clone(),
                conversion_rate,
                cost_center: details.cost_center.clone(),
                party_account: Some(party_account.to_string()),
                is_submitted: true,
                supplier_bill_no: None,
                supplier_bill_date: None,
            },
        );
        tables.journal_gl.insert(gl_entry, details);
        tables.outstanding.push(OutstandingRow {
            party_type,
            party: party.to_string(),
            party_account: party_account.to_string(),
            voucher,
        });
        Ok(())
    }

    pub fn insert_exchange_rate(
        &self,
        from_currency: &str,
        to_currency: &str,
        rate: BigDecimal,
    ) -> AdjustmentResult<()> {
        self.write()?
            .exchange_rates
            .insert((from_currency.to_string(), to_currency.to_string()), rate);
        Ok(())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> AdjustmentResult<()> {
        *self.write()? = Tables::default();
        Ok(())
    }

    fn outstanding_where(
        &self,
        party_type: PartyType,
        party: &str,
        party_account: &str,
        cost_center: Option<&str>,
        positive: bool,
    ) -> AdjustmentResult<Vec<OutstandingVoucher>> {
        let tables = self.read()?;
        let zero = BigDecimal::from(0);
        Ok(tables
            .outstanding
            .iter()
            .filter(|row| {
                row.party_type == party_type
                    && row.party == party
                    && row.party_account == party_account
            })
            .filter(|row| {
                cost_center.is_none_or(|cc| row.voucher.cost_center.as_deref() == Some(cc))
            })
            .filter(|row| {
                if positive {
                    row.voucher.outstanding_amount > zero
                } else {
                    row.voucher.outstanding_amount < zero
                }
            })
            .map(|row| row.voucher.clone())
            .collect())
    }
}

#[async_trait]
impl AdjustmentStorage for MemoryStorage {
    async fn get_party_account(
        &self,
        party_type: PartyType,
        party: &str,
        company: &str,
    ) -> AdjustmentResult<Option<PartyAccount>> {
        Ok(self
            .read()?
            .party_accounts
            .get(&(party_type, party.to_string(), company.to_string()))
            .cloned())
    }

    async fn get_outstanding_invoices(
        &self,
        party_type: PartyType,
        party: &str,
        party_account: &str,
        cost_center: Option<&str>,
    ) -> AdjustmentResult<Vec<OutstandingVoucher>> {
        self.outstanding_where(party_type, party, party_account, cost_center, true)
    }

    async fn get_negative_outstanding_invoices(
        &self,
        party_type: PartyType,
        party: &str,
        party_account: &str,
        cost_center: Option<&str>,
    ) -> AdjustmentResult<Vec<OutstandingVoucher>> {
        self.outstanding_where(party_type, party, party_account, cost_center, false)
    }

    async fn get_voucher(
        &self,
        voucher_type: VoucherType,
        voucher_no: &str,
    ) -> AdjustmentResult<Option<Voucher>> {
        Ok(self
            .read()?
            .vouchers
            .get(&(voucher_type, voucher_no.to_string()))
            .cloned())
    }

    async fn get_journal_gl_details(
        &self,
        gl_entry: &str,
    ) -> AdjustmentResult<Option<JournalGlDetails>> {
        Ok(self.read()?.journal_gl.get(gl_entry).cloned())
    }

    async fn get_exchange_rate(
        &self,
        from_currency: &str,
        to_currency: &str,
        _date: NaiveDate,
    ) -> AdjustmentResult<Option<BigDecimal>> {
        Ok(self
            .read()?
            .exchange_rates
            .get(&(from_currency.to_string(), to_currency.to_string()))
            .cloned())
    }

    async fn get_company_defaults(
        &self,
        company: &str,
    ) -> AdjustmentResult<Option<CompanyDefaults>> {
        Ok(self.read()?.companies.get(company).cloned())
    }
}
