//! Validation utilities

use crate::adjustment::{AdjustmentEntry, ReferenceEntry};
use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(amount: &BigDecimal, field: &str) -> AdjustmentResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(AdjustmentError::Validation(format!(
            "{} cannot be negative",
            field
        )))
    } else {
        Ok(())
    }
}

/// Validate that a currency code looks like an ISO 4217 code
pub fn validate_currency_code(currency: &str) -> AdjustmentResult<()> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(AdjustmentError::Validation(format!(
            "Currency '{}' must be a three letter ISO code",
            currency
        )));
    }
    Ok(())
}

/// Validate that a voucher number is usable as a reference
pub fn validate_voucher_number(voucher_number: &str) -> AdjustmentResult<()> {
    if voucher_number.trim().is_empty() {
        return Err(AdjustmentError::Validation(
            "Voucher number cannot be empty".to_string(),
        ));
    }

    if voucher_number.len() > 140 {
        return Err(AdjustmentError::Validation(
            "Voucher number cannot exceed 140 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced reference validator with detailed checks
pub struct EnhancedReferenceValidator;

impl ReferenceValidator for EnhancedReferenceValidator {
    fn validate_reference(
        &self,
        doc: &AdjustmentEntry,
        side: ReferenceSide,
        entry: &ReferenceEntry,
        voucher: Option<&Voucher>,
    ) -> AdjustmentResult<()> {
        validate_voucher_number(&entry.voucher_number)?;
        validate_currency_code(&entry.currency)?;
        validate_non_negative_amount(&entry.allocated_amount, "Allocated Amount")?;

        // A row may only be netted once per table
        let occurrences = doc
            .entries(side)
            .iter()
            .filter(|e| e.matches(entry.voucher_type, &entry.voucher_number))
            .count();
        if occurrences > 1 {
            return Err(AdjustmentError::Validation(format!(
                "{} {} is already present in {}",
                entry.voucher_type, entry.voucher_number, side
            )));
        }

        DefaultReferenceValidator.validate_reference(doc, side, entry, voucher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("US").is_err());
    }

    #[test]
    fn test_non_negative_amount() {
        assert!(validate_non_negative_amount(&BigDecimal::from(0), "Allocated Amount").is_ok());
        let err = validate_non_negative_amount(&BigDecimal::from(-1), "Allocated Amount")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Allocated Amount cannot be negative"
        );
    }

    #[test]
    fn test_voucher_number() {
        assert!(validate_voucher_number("SINV-0001").is_ok());
        assert!(validate_voucher_number("  ").is_err());
        assert!(validate_voucher_number(&"X".repeat(141)).is_err());
    }
}
