//! Netting a customer's invoices against the same counterparty's bills

use adjustment_core::utils::MemoryStorage;
use adjustment_core::{
    AdjustmentManager, AdjustmentSettings, CompanyDefaults, PartyAccount, PartyType, Voucher,
    VoucherType,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

fn invoice(
    voucher_type: VoucherType,
    voucher_no: &str,
    outstanding: i64,
    conversion_rate: i64,
    party_account: &str,
) -> Voucher {
    Voucher {
        voucher_type,
        voucher_no: voucher_no.to_string(),
        posting_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        outstanding_amount: BigDecimal::from(outstanding),
        currency: "USD".to_string(),
        conversion_rate: BigDecimal::from(conversion_rate),
        cost_center: None,
        party_account: Some(party_account.to_string()),
        is_submitted: true,
        supplier_bill_no: None,
        supplier_bill_date: None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Adjustment Core - Receivable/Payable Netting Example\n");

    let storage = MemoryStorage::new();
    storage.insert_company(
        "Acme",
        CompanyDefaults {
            default_currency: "INR".to_string(),
            exchange_gain_loss_account: Some("Exchange Gain/Loss".to_string()),
            cost_center: Some("Main".to_string()),
        },
    )?;
    storage.insert_party_account(
        PartyType::Customer,
        "Globex",
        "Acme",
        PartyAccount {
            account: "Debtors USD".to_string(),
            account_currency: "USD".to_string(),
        },
    )?;
    storage.insert_party_account(
        PartyType::Supplier,
        "Globex Supplies",
        "Acme",
        PartyAccount {
            account: "Creditors USD".to_string(),
            account_currency: "USD".to_string(),
        },
    )?;
    storage.insert_exchange_rate("USD", "INR", BigDecimal::from(84))?;
    storage.insert_voucher(
        PartyType::Customer,
        "Globex",
        invoice(VoucherType::SalesInvoice, "SINV-0001", 1200, 82, "Debtors USD"),
    )?;
    storage.insert_voucher(
        PartyType::Supplier,
        "Globex Supplies",
        invoice(VoucherType::PurchaseInvoice, "PINV-0001", 800, 83, "Creditors USD"),
    )?;

    let manager = AdjustmentManager::new(storage, AdjustmentSettings::load()?);
    let mut doc = manager
        .new_document(
            "ADJ-0001".to_string(),
            "Acme",
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            "USD".to_string(),
        )
        .await?;
    doc.customer = Some("Globex".to_string());
    doc.supplier = Some("Globex Supplies".to_string());
    manager
        .set_party_account_details(&mut doc, PartyType::Customer)
        .await?;
    manager
        .set_party_account_details(&mut doc, PartyType::Supplier)
        .await?;

    manager.get_unreconciled_entries(&mut doc).await?;
    doc.allocate_payment_amount = true;
    doc.allocate_amount_to_references()?;

    println!("Receivable adjusted: {}", doc.receivable_adjusted);
    println!("Payable adjusted:    {}", doc.payable_adjusted);
    println!("Exchange gain/loss:  {}\n", doc.total_gain_loss);

    let posting = manager.submit(&mut doc).await?;
    println!("GL entries:");
    for entry in &posting.entries {
        println!(
            "  {:<20} Dr {:>10}  Cr {:>10}",
            entry.account, entry.debit, entry.credit
        );
    }
    println!(
        "\nTotal debit {} / total credit {}",
        posting.total_debit(),
        posting.total_credit()
    );

    Ok(())
}
