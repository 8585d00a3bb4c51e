//! GL posting for adjustment entries

use bigdecimal::BigDecimal;
use tracing::{debug, warn};

use super::gl_entry::{GlEntry, GlEntryBuilder, GlPosting};
use crate::adjustment::exchange::round_amount;
use crate::adjustment::AdjustmentEntry;
use crate::types::*;

/// Build the party and exchange gain/loss lines of an adjustment entry
pub fn make_gl_entries(
    doc: &AdjustmentEntry,
    defaults: &CompanyDefaults,
    cancel: bool,
) -> AdjustmentResult<GlPosting> {
    let mut gl_entries = Vec::new();
    add_party_gl_entries(doc, &mut gl_entries)?;
    add_gain_loss_entries(doc, defaults, &mut gl_entries)?;

    let posting = GlPosting::new(gl_entries);
    posting.validate()?;

    if cancel {
        Ok(posting.reversed())
    } else {
        Ok(posting)
    }
}

fn add_party_gl_entries(
    doc: &AdjustmentEntry,
    gl_entries: &mut Vec<GlEntry>,
) -> AdjustmentResult<()> {
    for side in [ReferenceSide::DebitEntries, ReferenceSide::CreditEntries] {
        for entry in doc.entries(side).iter().filter(|e| e.is_allocated()) {
            let ledger_side = ReferenceSide::for_voucher(entry.voucher_type, side);
            let (party_type, party, _) = doc.party_details(ledger_side);
            let party =
                party.ok_or_else(|| AdjustmentError::MissingField(party_type.to_string()))?;
            let account = doc
                .party_account(ledger_side)
                .ok_or_else(|| AdjustmentError::MissingField(format!("{} Account", party_type)))?;
            let account_currency = doc
                .party_account_currency(ledger_side)
                .unwrap_or(doc.company_currency.as_str());
            let against = doc
                .party_account(ledger_side.opposite())
                .ok_or_else(|| {
                    AdjustmentError::MissingField(format!(
                        "{} Account",
                        ledger_side.opposite().party_type()
                    ))
                })?;

            let in_entry_currency = entry.allocated_in_entry_currency();
            let in_company_currency =
                round_amount(&(&in_entry_currency * &entry.exchange_rate), doc.precision);
            let in_account_currency = if account_currency != doc.company_currency {
                round_amount(&in_entry_currency, doc.precision)
            } else {
                in_company_currency.clone()
            };

            let builder = GlEntryBuilder::new(
                doc.name.clone(),
                doc.posting_date,
                account.to_string(),
                account_currency.to_string(),
            )
            .party(party_type, party.to_string())
            .against(against.to_string())
            .cost_center(entry.cost_center.clone().or_else(|| doc.cost_center.clone()))
            .against_voucher(entry.voucher_type, entry.voucher_number.clone());

            // Settling a receivable credits it, settling a payable debits it
            let gl_entry = match side {
                ReferenceSide::DebitEntries => {
                    builder.credit(in_company_currency, in_account_currency)
                }
                ReferenceSide::CreditEntries => {
                    builder.debit(in_company_currency, in_account_currency)
                }
            };
            gl_entries.push(gl_entry.build());
        }
    }
    Ok(())
}

fn add_gain_loss_entries(
    doc: &AdjustmentEntry,
    defaults: &CompanyDefaults,
    gl_entries: &mut Vec<GlEntry>,
) -> AdjustmentResult<()> {
    let total_debit: BigDecimal = gl_entries.iter().map(|e| &e.debit).sum();
    let total_credit: BigDecimal = gl_entries.iter().map(|e| &e.credit).sum();
    let difference = &total_debit - &total_credit;

    if difference == BigDecimal::from(0) {
        return Ok(());
    }
    if difference != doc.total_gain_loss {
        warn!(
            adjustment = %doc.name,
            posted = %difference,
            computed = %doc.total_gain_loss,
            "exchange difference posted differs from computed gain/loss"
        );
    }

    let company = doc.company.clone().unwrap_or_default();
    let account = defaults
        .exchange_gain_loss_account
        .clone()
        .ok_or(AdjustmentError::MissingExchangeGainLossAccount(company))?;

    let builder = GlEntryBuilder::new(
        doc.name.clone(),
        doc.posting_date,
        account,
        doc.company_currency.clone(),
    )
    .cost_center(doc.cost_center.clone().or_else(|| defaults.cost_center.clone()));

    let amount = difference.abs();
    let gl_entry = if difference > BigDecimal::from(0) {
        builder.credit(amount.clone(), amount)
    } else {
        builder.debit(amount.clone(), amount)
    };
    debug!(adjustment = %doc.name, difference = %difference, "posting exchange gain/loss");
    gl_entries.push(gl_entry.build());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::{ExchangeRateRecord, ReferenceEntry};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn usd_document() -> AdjustmentEntry {
        let mut doc = AdjustmentEntry::new(
            "ADJ-0002".to_string(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            "USD".to_string(),
            "INR".to_string(),
            2,
        );
        doc.company = Some("Acme".to_string());
        doc.customer = Some("Globex".to_string());
        doc.supplier = Some("Globex Supplies".to_string());
        doc.set_party_account(
            PartyType::Customer,
            PartyAccount {
                account: "Debtors USD".to_string(),
                account_currency: "USD".to_string(),
            },
        );
        doc.set_party_account(
            PartyType::Supplier,
            PartyAccount {
                account: "Creditors USD".to_string(),
                account_currency: "USD".to_string(),
            },
        );
        doc.add_exchange_rate(ExchangeRateRecord::new(
            "USD".to_string(),
            dec("1"),
            dec("85"),
        ));
        doc
    }

    fn row(voucher_type: VoucherType, no: &str, amount: &str, rate: &str) -> ReferenceEntry {
        let mut entry = ReferenceEntry::new(voucher_type, no.to_string());
        entry.currency = "USD".to_string();
        entry.exchange_rate = dec(rate);
        entry.voucher_amount = dec(amount);
        entry
    }

    fn defaults(gain_loss_account: Option<&str>) -> CompanyDefaults {
        CompanyDefaults {
            default_currency: "INR".to_string(),
            exchange_gain_loss_account: gain_loss_account.map(str::to_string),
            cost_center: Some("Main - AC".to_string()),
        }
    }

    fn allocate(doc: &mut AdjustmentEntry) {
        doc.recalculate_references(&[ReferenceSide::DebitEntries, ReferenceSide::CreditEntries])
            .unwrap();
        doc.allocate_payment_amount = true;
        doc.allocate_amount_to_references().unwrap();
    }

    fn netted_document() -> AdjustmentEntry {
        let mut doc = usd_document();
        doc.debit_entries
            .push(row(VoucherType::SalesInvoice, "SINV-1", "100", "80"));
        doc.credit_entries
            .push(row(VoucherType::PurchaseInvoice, "PINV-1", "60", "82"));
        allocate(&mut doc);
        doc
    }

    #[test]
    fn test_gain_loss_line_balances_posting() {
        let doc = netted_document();
        assert_eq!(doc.total_gain_loss, dec("120"));

        let posting = make_gl_entries(&doc, &defaults(Some("Exchange Gain/Loss")), false).unwrap();
        assert!(posting.is_balanced());
        assert_eq!(posting.entries.len(), 3);

        let receivable = posting.entries_for_account("Debtors USD").next().unwrap();
        assert_eq!(receivable.credit, dec("4800"));
        assert_eq!(receivable.credit_in_account_currency, dec("60"));
        assert_eq!(receivable.against.as_deref(), Some("Creditors USD"));
        assert_eq!(receivable.party_type, Some(PartyType::Customer));
        assert_eq!(receivable.against_voucher.as_deref(), Some("SINV-1"));

        let payable = posting.entries_for_account("Creditors USD").next().unwrap();
        assert_eq!(payable.debit, dec("4920"));
        assert_eq!(payable.debit_in_account_currency, dec("60"));

        let gain = posting
            .entries_for_account("Exchange Gain/Loss")
            .next()
            .unwrap();
        assert_eq!(gain.credit, dec("120"));
        assert_eq!(gain.account_currency, "INR");
        assert_eq!(gain.cost_center.as_deref(), Some("Main - AC"));
    }

    #[test]
    fn test_net_loss_debits_gain_loss_account() {
        let mut doc = usd_document();
        doc.debit_entries
            .push(row(VoucherType::SalesInvoice, "SINV-1", "50", "90"));
        doc.credit_entries
            .push(row(VoucherType::PurchaseInvoice, "PINV-1", "50", "85"));
        allocate(&mut doc);
        assert_eq!(doc.total_gain_loss, dec("-250"));

        let posting = make_gl_entries(&doc, &defaults(Some("Exchange Gain/Loss")), false).unwrap();
        let loss = posting
            .entries_for_account("Exchange Gain/Loss")
            .next()
            .unwrap();
        assert_eq!(loss.debit, dec("250"));
        assert!(posting.is_balanced());
    }

    #[test]
    fn test_missing_gain_loss_account() {
        let doc = netted_document();
        let err = make_gl_entries(&doc, &defaults(None), false).unwrap_err();
        assert_eq!(err.to_string(), "Exchange gain loss account not set for Acme");
    }

    #[test]
    fn test_credit_note_posts_to_customer_account() {
        let mut doc = usd_document();
        doc.exchange_rates.clear();
        doc.add_exchange_rate(ExchangeRateRecord::new(
            "USD".to_string(),
            dec("1"),
            dec("80"),
        ));
        doc.debit_entries
            .push(row(VoucherType::SalesInvoice, "SINV-1", "30", "80"));
        doc.credit_entries
            .push(row(VoucherType::SalesInvoice, "SINV-RET-1", "30", "80"));
        allocate(&mut doc);

        let posting = make_gl_entries(&doc, &defaults(None), false).unwrap();
        let customer_lines: Vec<_> = posting.entries_for_account("Debtors USD").collect();
        assert_eq!(customer_lines.len(), 2);
        assert!(customer_lines.iter().any(|e| e.debit == dec("2400")));
        assert!(customer_lines.iter().any(|e| e.credit == dec("2400")));
        assert!(customer_lines
            .iter()
            .all(|e| e.against.as_deref() == Some("Creditors USD")));
        assert!(posting.entries_for_account("Creditors USD").next().is_none());
    }

    #[test]
    fn test_cancel_reverses_lines() {
        let doc = netted_document();
        let posting = make_gl_entries(&doc, &defaults(Some("Exchange Gain/Loss")), true).unwrap();

        assert!(posting.is_cancellation);
        let receivable = posting.entries_for_account("Debtors USD").next().unwrap();
        assert_eq!(receivable.debit, dec("4800"));
        assert_eq!(receivable.credit, dec("0"));
    }
}
