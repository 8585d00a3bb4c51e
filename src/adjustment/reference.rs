//! Reference rows of an adjustment entry

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::exchange::{ensure_positive_rate, round_amount, RatePair};
use crate::types::*;

/// One reconciled voucher line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// 1-based row number within its table
    pub idx: usize,
    pub voucher_type: VoucherType,
    pub voucher_number: String,
    pub voucher_date: Option<NaiveDate>,
    pub currency: String,
    /// Historical voucher currency to company currency rate
    pub exchange_rate: BigDecimal,
    pub cost_center: Option<String>,
    /// Outstanding in voucher currency
    pub voucher_amount: BigDecimal,
    /// Outstanding in company currency at the historical rate
    pub voucher_base_amount: BigDecimal,
    /// Voucher currency to payment currency rate
    pub payment_exchange_rate: BigDecimal,
    /// Outstanding in payment currency
    pub voucher_payment_amount: BigDecimal,
    /// Amount netted, in payment currency
    pub allocated_amount: BigDecimal,
    pub balance: BigDecimal,
    /// Positive for an exchange gain, negative for a loss
    pub gain_loss_amount: BigDecimal,
    pub supplier_bill_no: Option<String>,
    pub supplier_bill_date: Option<NaiveDate>,
}

impl ReferenceEntry {
    /// Create an empty row for a voucher; amounts are filled in later
    pub fn new(voucher_type: VoucherType, voucher_number: String) -> Self {
        Self {
            idx: 0,
            voucher_type,
            voucher_number,
            voucher_date: None,
            currency: String::new(),
            exchange_rate: BigDecimal::from(1),
            cost_center: None,
            voucher_amount: BigDecimal::from(0),
            voucher_base_amount: BigDecimal::from(0),
            payment_exchange_rate: BigDecimal::from(1),
            voucher_payment_amount: BigDecimal::from(0),
            allocated_amount: BigDecimal::from(0),
            balance: BigDecimal::from(0),
            gain_loss_amount: BigDecimal::from(0),
            supplier_bill_no: None,
            supplier_bill_date: None,
        }
    }

    pub fn matches(&self, voucher_type: VoucherType, voucher_number: &str) -> bool {
        self.voucher_type == voucher_type && self.voucher_number == voucher_number
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated_amount != BigDecimal::from(0)
    }

    /// Allocated amount expressed in the voucher currency
    pub fn allocated_in_entry_currency(&self) -> BigDecimal {
        &self.allocated_amount / &self.payment_exchange_rate
    }

    /// Refresh payment currency amounts, balance and gain/loss from current rates
    pub fn recalculate_amounts(
        &mut self,
        side: ReferenceSide,
        payment_currency: &str,
        exchange_rates: &HashMap<String, RatePair>,
        precision: u32,
    ) -> AdjustmentResult<()> {
        let rates = exchange_rates.get(&self.currency);

        self.payment_exchange_rate = if self.currency == payment_currency {
            BigDecimal::from(1)
        } else {
            rates
                .map(|r| r.to_payment_currency.clone())
                .unwrap_or_else(|| BigDecimal::from(1))
        };
        ensure_positive_rate(&self.payment_exchange_rate, &self.currency)?;

        self.voucher_payment_amount =
            round_amount(&(&self.voucher_amount * &self.payment_exchange_rate), precision);
        self.balance = &self.voucher_payment_amount - &self.allocated_amount;

        let current_base_rate = rates
            .map(|r| r.to_base_currency.clone())
            .unwrap_or_else(|| self.exchange_rate.clone());
        let rate_movement = match side {
            ReferenceSide::DebitEntries => &current_base_rate - &self.exchange_rate,
            ReferenceSide::CreditEntries => &self.exchange_rate - &current_base_rate,
        };
        self.gain_loss_amount = round_amount(
            &(self.allocated_in_entry_currency() * rate_movement),
            precision,
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn usd_entry() -> ReferenceEntry {
        let mut entry = ReferenceEntry::new(VoucherType::SalesInvoice, "SINV-0001".to_string());
        entry.currency = "USD".to_string();
        entry.exchange_rate = dec("80");
        entry.voucher_amount = dec("100");
        entry.voucher_base_amount = dec("8000");
        entry
    }

    fn rates(to_payment: &str, to_base: &str) -> HashMap<String, RatePair> {
        let mut map = HashMap::new();
        map.insert(
            "USD".to_string(),
            RatePair {
                to_payment_currency: dec(to_payment),
                to_base_currency: dec(to_base),
            },
        );
        map
    }

    #[test]
    fn test_receivable_gain_when_rate_rises() {
        let mut entry = usd_entry();
        entry.allocated_amount = dec("50");

        entry
            .recalculate_amounts(ReferenceSide::DebitEntries, "USD", &rates("1", "82"), 2)
            .unwrap();

        assert_eq!(entry.payment_exchange_rate, dec("1"));
        assert_eq!(entry.voucher_payment_amount, dec("100"));
        assert_eq!(entry.balance, dec("50"));
        // 50 USD collected at 82 instead of 80
        assert_eq!(entry.gain_loss_amount, dec("100"));
    }

    #[test]
    fn test_payable_loss_when_rate_rises() {
        let mut entry = usd_entry();
        entry.voucher_type = VoucherType::PurchaseInvoice;
        entry.allocated_amount = dec("100");

        entry
            .recalculate_amounts(ReferenceSide::CreditEntries, "USD", &rates("1", "82"), 2)
            .unwrap();

        assert_eq!(entry.balance, dec("0"));
        assert_eq!(entry.gain_loss_amount, dec("-200"));
    }

    #[test]
    fn test_payment_currency_conversion() {
        let mut entry = usd_entry();
        entry.allocated_amount = dec("45");

        entry
            .recalculate_amounts(ReferenceSide::DebitEntries, "EUR", &rates("0.9", "80"), 2)
            .unwrap();

        assert_eq!(entry.payment_exchange_rate, dec("0.9"));
        assert_eq!(entry.voucher_payment_amount, dec("90"));
        assert_eq!(entry.balance, dec("45"));
        assert_eq!(entry.allocated_in_entry_currency(), dec("50"));
        assert_eq!(entry.gain_loss_amount, dec("0"));
    }

    #[test]
    fn test_zero_payment_rate_rejected() {
        let mut entry = usd_entry();
        let result =
            entry.recalculate_amounts(ReferenceSide::DebitEntries, "EUR", &rates("0", "80"), 2);
        assert!(matches!(
            result,
            Err(AdjustmentError::InvalidExchangeRate(_))
        ));
    }
}
