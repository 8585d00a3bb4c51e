//! Exchange rate records and currency rounding

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;

/// Round an amount half-up to the given number of decimals
pub fn round_amount(value: &BigDecimal, precision: u32) -> BigDecimal {
    value.with_scale_round(i64::from(precision), RoundingMode::HalfUp)
}

/// Convert an amount with a rate and round it to the currency precision
pub fn convert(amount: &BigDecimal, rate: &BigDecimal, precision: u32) -> BigDecimal {
    round_amount(&(amount * rate), precision)
}

/// Conversion rates of a single currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateRecord {
    pub currency: String,
    /// Currency to payment currency
    pub exchange_rate_to_payment_currency: BigDecimal,
    /// Currency to company currency
    pub exchange_rate_to_base_currency: BigDecimal,
}

impl ExchangeRateRecord {
    pub fn new(
        currency: String,
        exchange_rate_to_payment_currency: BigDecimal,
        exchange_rate_to_base_currency: BigDecimal,
    ) -> Self {
        Self {
            currency,
            exchange_rate_to_payment_currency,
            exchange_rate_to_base_currency,
        }
    }
}

/// Rate pair looked up by currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePair {
    pub to_payment_currency: BigDecimal,
    pub to_base_currency: BigDecimal,
}

/// Ordered exchange rate table, one record per currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    records: Vec<ExchangeRateRecord>,
}

impl ExchangeRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.records.iter().any(|r| r.currency == currency)
    }

    /// Add a record; a second record for the same currency is ignored
    pub fn push(&mut self, record: ExchangeRateRecord) -> bool {
        if self.contains(&record.currency) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn rates_for(&self, currency: &str) -> Option<&ExchangeRateRecord> {
        self.records.iter().find(|r| r.currency == currency)
    }

    pub fn records(&self) -> &[ExchangeRateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Snapshot of the table keyed by currency
    pub fn to_map(&self) -> HashMap<String, RatePair> {
        self.records
            .iter()
            .map(|r| {
                (
                    r.currency.clone(),
                    RatePair {
                        to_payment_currency: r.exchange_rate_to_payment_currency.clone(),
                        to_base_currency: r.exchange_rate_to_base_currency.clone(),
                    },
                )
            })
            .collect()
    }
}

/// Reject rates that cannot be divided by
pub fn ensure_positive_rate(rate: &BigDecimal, currency: &str) -> AdjustmentResult<()> {
    if *rate <= BigDecimal::from(0) {
        return Err(AdjustmentError::InvalidExchangeRate(currency.to_string()));
    }
    Ok(())
}
