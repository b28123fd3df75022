//! Transaction CSV export and import
//!
//! The export column order is fixed and the import side reads the same
//! layout back by header name, so an exported file re-imports losslessly
//! (tags round-trip through a pipe-joined column).

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionType};

/// Fixed export column order
pub const EXPORT_COLUMNS: [&str; 15] = [
    "id",
    "date",
    "amount",
    "currency",
    "type",
    "category_id",
    "account",
    "tags",
    "vendor",
    "client",
    "project_id",
    "invoice_id",
    "receipt_url",
    "reconciled",
    "notes",
];

/// Render transactions as CSV in the fixed column order
pub fn transactions_to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(EXPORT_COLUMNS)?;

    for tx in transactions {
        writer.write_record([
            tx.id.to_string(),
            tx.date.to_string(),
            tx.amount.to_string(),
            tx.currency.clone(),
            tx.tx_type.to_string(),
            tx.category_id.clone(),
            tx.account.clone(),
            tx.tags.join("|"),
            tx.vendor.clone(),
            tx.client.clone(),
            tx.project_id.clone(),
            tx.invoice_id.clone(),
            tx.receipt_url.clone(),
            tx.reconciled.to_string(),
            tx.notes.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::InvalidData(format!("CSV buffer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV encoding error: {}", e)))
}

/// Parse a CSV upload into insertable transactions for `user_id`
///
/// Fields are matched by header name; anything missing falls back to the
/// same defaults used on manual creation. Rows with an unparseable date use
/// `fallback_date` (import time).
pub fn parse_transactions_csv(
    data: &[u8],
    user_id: i64,
    fallback_date: NaiveDate,
) -> Result<Vec<NewTransaction>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(data);

    let headers = reader.headers()?.clone();
    let index_of = |name: &str| headers.iter().position(|h| h == name);

    let idx_date = index_of("date");
    let idx_amount = index_of("amount");
    let idx_currency = index_of("currency");
    let idx_type = index_of("type");
    let idx_category = index_of("category_id");
    let idx_account = index_of("account");
    let idx_tags = index_of("tags");
    let idx_vendor = index_of("vendor");
    let idx_client = index_of("client");
    let idx_project = index_of("project_id");
    let idx_invoice = index_of("invoice_id");
    let idx_receipt = index_of("receipt_url");
    let idx_reconciled = index_of("reconciled");
    let idx_notes = index_of("notes");

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string()
    };

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record?;

        let tx_type = field(&record, idx_type)
            .parse::<TransactionType>()
            .unwrap_or(TransactionType::Expense);
        let category_default = match tx_type {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        };

        let category_id = {
            let v = field(&record, idx_category);
            if v.is_empty() {
                category_default.to_string()
            } else {
                v
            }
        };
        let currency = {
            let v = field(&record, idx_currency);
            if v.is_empty() {
                "INR".to_string()
            } else {
                v
            }
        };
        let account = {
            let v = field(&record, idx_account);
            if v.is_empty() {
                "Cash".to_string()
            } else {
                v
            }
        };

        let tags: Vec<String> = field(&record, idx_tags)
            .split('|')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();

        out.push(NewTransaction {
            user_id,
            date: field(&record, idx_date)
                .parse::<NaiveDate>()
                .unwrap_or(fallback_date),
            amount: field(&record, idx_amount).parse::<f64>().unwrap_or(0.0),
            currency,
            tx_type,
            category_id,
            account,
            tags,
            vendor: field(&record, idx_vendor),
            client: field(&record, idx_client),
            project_id: field(&record, idx_project),
            invoice_id: field(&record, idx_invoice),
            receipt_url: field(&record, idx_receipt),
            reconciled: field(&record, idx_reconciled) == "true",
            notes: field(&record, idx_notes),
            splits: json!([]),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(id: i64, tags: Vec<&str>) -> Transaction {
        Transaction {
            id,
            user_id: 7,
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            amount: 250.5,
            currency: "INR".to_string(),
            tx_type: TransactionType::Expense,
            category_id: "food".to_string(),
            account: "Cash".to_string(),
            tags: tags.into_iter().map(String::from).collect(),
            vendor: "Cafe, Ltd".to_string(),
            client: "".to_string(),
            project_id: "".to_string(),
            invoice_id: "".to_string(),
            receipt_url: "".to_string(),
            reconciled: true,
            notes: "lunch \"meeting\"".to_string(),
            splits: json!([]),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn export_emits_fixed_header() {
        let csv = transactions_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().next().unwrap(), EXPORT_COLUMNS.join(","));
    }

    #[test]
    fn roundtrip_preserves_amount_type_category_and_tags() {
        let original = vec![sample(1, vec!["a", "b"]), sample(2, vec![])];
        let csv = transactions_to_csv(&original).unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let imported = parse_transactions_csv(csv.as_bytes(), 9, today).unwrap();

        assert_eq!(imported.len(), original.len());
        for (got, want) in imported.iter().zip(&original) {
            assert_eq!(got.amount, want.amount);
            assert_eq!(got.tx_type, want.tx_type);
            assert_eq!(got.category_id, want.category_id);
            assert_eq!(got.tags, want.tags);
            assert_eq!(got.date, want.date);
            assert_eq!(got.reconciled, want.reconciled);
            // Imported rows belong to the importing caller, not the exporter
            assert_eq!(got.user_id, 9);
        }
    }

    #[test]
    fn quoted_fields_survive() {
        let csv = transactions_to_csv(&[sample(1, vec!["x"])]).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let imported = parse_transactions_csv(csv.as_bytes(), 1, today).unwrap();
        assert_eq!(imported[0].vendor, "Cafe, Ltd");
        assert_eq!(imported[0].notes, "lunch \"meeting\"");
    }

    #[test]
    fn missing_columns_fall_back_to_defaults() {
        let data = b"date,amount,type\n2025-01-05,42,expense\n,0,\n";
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let rows = parse_transactions_csv(data, 3, today).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, 42.0);
        assert_eq!(rows[0].currency, "INR");
        assert_eq!(rows[0].account, "Cash");
        assert_eq!(rows[0].category_id, "expense");
        assert_eq!(rows[1].date, today);
        assert_eq!(rows[1].amount, 0.0);
    }
}
