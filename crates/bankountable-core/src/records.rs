//! Defensive decoding of backend records
//!
//! The statements backend returns loosely-typed JSON. Rather than failing a
//! whole response on one odd row, each record is coerced field by field:
//! missing numbers become 0, missing arrays become empty, and only records
//! without an id or a usable date are dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::warn;

use crate::models::{
    dedupe_tags, CategoryRecord, ImportRecord, PaymentMethod, TagRecord, Transaction,
    TransactionId, UNCATEGORIZED,
};

/// Decode a list of transaction records, skipping unusable ones
pub fn transactions_from_json(value: &Value) -> Vec<Transaction> {
    let Some(items) = value.as_array() else {
        warn!("Expected a JSON array of transactions");
        return Vec::new();
    };
    items.iter().filter_map(transaction_from_record).collect()
}

/// Decode one transaction record
///
/// Returns `None` when the record has no id or no parseable date.
pub fn transaction_from_record(record: &Value) -> Option<Transaction> {
    let Some(id) = record.get("id").and_then(coerce_id) else {
        warn!(record = %record, "Dropping transaction without id");
        return None;
    };

    let raw_date = record
        .get("transaction_date")
        .or_else(|| record.get("date"));
    let Some(date) = raw_date.and_then(Value::as_str).and_then(parse_timestamp) else {
        warn!(id = %id, "Dropping transaction with missing or invalid date");
        return None;
    };

    let mut amount = record.get("amount").map(coerce_amount).unwrap_or(0);
    if amount < 0 {
        warn!(id = %id, amount, "Negative amount clamped to 0");
        amount = 0;
    }

    let category = coerce_string(record.get("category_name").or_else(|| record.get("category")))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    let payment_method = coerce_string(record.get("payment_method"))
        .map(|p| PaymentMethod::from_wire(&p))
        .unwrap_or(PaymentMethod::Unspecified);

    Some(Transaction {
        id,
        date,
        description: coerce_string(record.get("description")).unwrap_or_default(),
        merchant: coerce_string(record.get("merchant")).unwrap_or_default(),
        amount,
        category,
        category_id: record.get("category_id").and_then(Value::as_i64),
        payment_method,
        tags: coerce_tags(record.get("tags")),
    })
}

/// Decode the category listing, dropping nameless entries
pub fn categories_from_json(value: &Value) -> Vec<CategoryRecord> {
    records(value)
        .filter_map(|record| {
            let name = coerce_string(record.get("name")).filter(|n| !n.is_empty())?;
            Some(CategoryRecord {
                id: record.get("id").and_then(Value::as_i64).unwrap_or(0),
                name,
                description: coerce_string(record.get("description")),
                color: coerce_string(record.get("color")),
            })
        })
        .collect()
}

/// Decode the tag listing, dropping nameless entries
pub fn tags_from_json(value: &Value) -> Vec<TagRecord> {
    records(value)
        .filter_map(|record| {
            let name = coerce_string(record.get("name")).filter(|n| !n.is_empty())?;
            Some(TagRecord {
                id: record.get("id").and_then(Value::as_i64).unwrap_or(0),
                name,
            })
        })
        .collect()
}

/// Decode the import history listing
pub fn imports_from_json(value: &Value) -> Vec<ImportRecord> {
    records(value)
        .map(|record| ImportRecord {
            id: record.get("id").and_then(Value::as_i64).unwrap_or(0),
            filename: coerce_string(record.get("filename")).unwrap_or_default(),
            status: coerce_string(record.get("status")).unwrap_or_default(),
            transactions_count: record.get("transactions_count").map(coerce_amount).unwrap_or(0),
            imported_at: record
                .get("imported_at")
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            error_message: coerce_string(record.get("error_message")),
        })
        .collect()
}

/// Every distinct tag across transactions, in first-seen order
pub fn known_tags(transactions: &[Transaction]) -> Vec<String> {
    dedupe_tags(transactions.iter().flat_map(|t| t.tags.iter().cloned()))
}

fn records(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

fn coerce_id(value: &Value) -> Option<TransactionId> {
    match value {
        Value::Number(n) => Some(TransactionId::new(n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(TransactionId::new(s.trim())),
        _ => None,
    }
}

/// Numbers and numeric strings become whole pesos; anything else is 0
pub(crate) fn coerce_amount(value: &Value) -> i64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.round() as i64,
        _ => 0,
    }
}

fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_tags(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    dedupe_tags(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string),
    )
}

/// Parse the timestamp shapes the backend produces
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let record = json!({
            "id": 42,
            "transaction_date": "2024-03-15",
            "description": "COMPRA STARBUCKS",
            "merchant": "Starbucks",
            "amount": 3500.0,
            "category_id": 3,
            "category_name": "Alimentación",
            "payment_method": "credit",
            "tags": ["café", "recurrente"]
        });

        let tx = transaction_from_record(&record).unwrap();
        assert_eq!(tx.id.as_str(), "42");
        assert_eq!(tx.date.to_string(), "2024-03-15 00:00:00");
        assert_eq!(tx.merchant, "Starbucks");
        assert_eq!(tx.amount, 3500);
        assert_eq!(tx.category, "Alimentación");
        assert_eq!(tx.category_id, Some(3));
        assert_eq!(tx.payment_method, PaymentMethod::Credit);
        assert_eq!(tx.tags, vec!["café", "recurrente"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let record = json!({"id": "abc", "transaction_date": "2024-01-02T10:15:00"});
        let tx = transaction_from_record(&record).unwrap();
        assert_eq!(tx.amount, 0);
        assert_eq!(tx.description, "");
        assert_eq!(tx.merchant, "");
        assert_eq!(tx.category, UNCATEGORIZED);
        assert_eq!(tx.payment_method, PaymentMethod::Unspecified);
        assert!(tx.tags.is_empty());
    }

    #[test]
    fn test_null_and_malformed_fields() {
        let record = json!({
            "id": 7,
            "transaction_date": "2024-01-02",
            "merchant": null,
            "amount": "not a number",
            "category_name": null,
            "payment_method": "transferencia",
            "tags": "recurrente"
        });
        let tx = transaction_from_record(&record).unwrap();
        assert_eq!(tx.amount, 0);
        assert_eq!(tx.merchant, "");
        assert_eq!(tx.category, UNCATEGORIZED);
        assert_eq!(
            tx.payment_method,
            PaymentMethod::Other("transferencia".to_string())
        );
        assert!(tx.tags.is_empty());
    }

    #[test]
    fn test_payment_method_requires_exact_wire_value() {
        let method = |raw: &str| {
            let record = json!({"id": 1, "transaction_date": "2024-01-02", "payment_method": raw});
            transaction_from_record(&record).unwrap().payment_method
        };
        assert_eq!(method("debit"), PaymentMethod::Debit);
        assert_eq!(method("CREDIT"), PaymentMethod::Other("CREDIT".to_string()));
        assert_eq!(method("Crédito"), PaymentMethod::Other("Crédito".to_string()));
        assert_eq!(method(""), PaymentMethod::Unspecified);
    }

    #[test]
    fn test_numeric_string_amount_rounded() {
        let record = json!({"id": 1, "transaction_date": "2024-01-02", "amount": "1999.6"});
        assert_eq!(transaction_from_record(&record).unwrap().amount, 2000);
    }

    #[test]
    fn test_negative_amount_clamped() {
        let record = json!({"id": 1, "transaction_date": "2024-01-02", "amount": -1500});
        assert_eq!(transaction_from_record(&record).unwrap().amount, 0);
    }

    #[test]
    fn test_duplicate_tags_removed() {
        let record = json!({
            "id": 1,
            "transaction_date": "2024-01-02",
            "tags": ["a", "b", "a", 3, "b"]
        });
        assert_eq!(transaction_from_record(&record).unwrap().tags, vec!["a", "b"]);
    }

    #[test]
    fn test_records_without_id_or_date_dropped() {
        let payload = json!([
            {"transaction_date": "2024-01-01", "amount": 10},
            {"id": 2, "transaction_date": "garbage", "amount": 10},
            {"id": 3, "amount": 10},
            {"id": 4, "transaction_date": "2024-01-01", "amount": 10}
        ]);
        let txs = transactions_from_json(&payload);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id.as_str(), "4");
    }

    #[test]
    fn test_non_array_payload() {
        assert!(transactions_from_json(&json!({"detail": "boom"})).is_empty());
        assert!(categories_from_json(&json!(null)).is_empty());
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        assert!(parse_timestamp("2024-01-02").is_some());
        assert!(parse_timestamp("2024-01-02T03:04:05").is_some());
        assert!(parse_timestamp("2024-01-02T03:04:05.123456").is_some());
        assert!(parse_timestamp("2024-01-02 03:04:05").is_some());
        assert!(parse_timestamp("2024-01-02T03:04:05Z").is_some());
        assert!(parse_timestamp("02/01/2024").is_none());
    }

    #[test]
    fn test_categories_and_tags() {
        let cats = categories_from_json(&json!([
            {"id": 1, "name": "Transporte", "description": null, "color": "#4facfe"},
            {"id": 2, "name": ""},
            {"id": 3}
        ]));
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, "Transporte");
        assert_eq!(cats[0].color.as_deref(), Some("#4facfe"));

        let tags = tags_from_json(&json!([{"id": 9, "name": "café"}, {"id": 10}]));
        assert_eq!(tags, vec![TagRecord { id: 9, name: "café".into() }]);
    }

    #[test]
    fn test_imports() {
        let imports = imports_from_json(&json!([{
            "id": 1,
            "filename": "cartola.pdf",
            "status": "completed",
            "transactions_count": 37,
            "imported_at": "2024-02-01T09:00:00",
            "error_message": null
        }]));
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].transactions_count, 37);
        assert!(imports[0].imported_at.is_some());
        assert!(imports[0].error_message.is_none());
    }

    #[test]
    fn test_known_tags_first_seen_order() {
        let txs = transactions_from_json(&json!([
            {"id": 1, "transaction_date": "2024-01-01", "tags": ["b", "a"]},
            {"id": 2, "transaction_date": "2024-01-01", "tags": ["c", "a"]}
        ]));
        assert_eq!(known_tags(&txs), vec!["b", "a", "c"]);
    }
}
