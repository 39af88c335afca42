//! Integration tests for bankountable-core
//!
//! These tests exercise the full fetch → aggregate → filter → alert workflow.

use bankountable_core::{
    aggregate, bucket_by_month, compute_alerts, default_month, filter_and_sort, month_summary,
    records::transactions_from_json,
    Alert, DataSource, EditSession, FieldEdit, Filter, FilterState, Locale, MonthKey, MonthOrder,
    PaymentMethod, Severity, SortField, StaticSource, TransactionId, UNCATEGORIZED,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

/// Raw backend payload: two months of spending, mostly on credit, with a
/// long tail of small recurring coffee purchases
fn statement_payload() -> Value {
    let mut records = vec![
        json!({
            "id": 1000,
            "transaction_date": "2024-01-03T10:00:00",
            "description": "ARRIENDO ENERO",
            "merchant": "Inmobiliaria",
            "amount": 450000,
            "category_id": 5,
            "category_name": "Vivienda",
            "payment_method": "debit",
            "tags": []
        }),
        json!({
            "id": 1001,
            "transaction_date": "2024-02-03T10:00:00",
            "description": "ARRIENDO FEBRERO",
            "merchant": "Inmobiliaria",
            "amount": 450000.0,
            "category_id": 5,
            "category_name": "Vivienda",
            "payment_method": "credit",
            "tags": []
        }),
        json!({
            "id": 1002,
            "transaction_date": "2024-02-10",
            "description": "REGALO",
            "merchant": null,
            "amount": null,
            "category_name": null,
            "payment_method": null,
            "tags": "not-a-list"
        }),
        json!({"id": 1003, "transaction_date": "31/02/2024", "amount": 999}),
    ];

    for i in 0..55 {
        records.push(json!({
            "id": i,
            "transaction_date": format!("2024-02-{:02}T08:30:00", (i % 28) + 1),
            "description": format!("STARBUCKS {}", i),
            "merchant": "Starbucks",
            "amount": 3000,
            "category_id": 1,
            "category_name": "Alimentación",
            "payment_method": "credit",
            "tags": ["café", "Recurrente"]
        }));
    }

    Value::Array(records)
}

async fn load() -> Vec<bankountable_core::Transaction> {
    let source = StaticSource::new(transactions_from_json(&statement_payload()));
    source.transactions().await.unwrap()
}

// =============================================================================
// Full Workflow
// =============================================================================

#[tokio::test]
async fn test_full_dashboard_workflow() {
    let transactions = load().await;

    // Unparseable date dropped, sparse record kept with defaults
    assert_eq!(transactions.len(), 58);
    let sparse = transactions
        .iter()
        .find(|t| t.id == TransactionId::from(1002))
        .unwrap();
    assert_eq!(sparse.amount, 0);
    assert_eq!(sparse.category, UNCATEGORIZED);
    assert_eq!(sparse.payment_method, PaymentMethod::Unspecified);
    assert!(sparse.tags.is_empty());

    let stats = aggregate(&transactions);
    assert_eq!(stats.total, 450000 * 2 + 55 * 3000);
    assert_eq!(stats.total_transactions, 58);
    assert_eq!(stats.top_categories[0].name, "Vivienda");
    assert_eq!(stats.top_merchants[0].name, "Inmobiliaria");
    let category_sum: i64 = stats.by_category.iter().map(|c| c.amount).sum();
    assert_eq!(category_sum, stats.total);

    let alerts = compute_alerts(&transactions, &stats);
    let kinds: Vec<(Severity, &str)> = alerts
        .iter()
        .map(|a: &Alert| (a.severity, a.icon.as_str()))
        .collect();
    // credit = 450000 + 165000 of 1065000 = 57.7%, below the threshold
    assert_eq!(
        kinds,
        vec![(Severity::Info, "☕"), (Severity::Warning, "⚠️")]
    );
    assert_eq!(
        alerts[0].message,
        "Tienes 55 gastos pequeños recurrentes. Estos suman $165.000"
    );
    assert_eq!(alerts[1].message, "Vivienda representa el 84.5% de tus gastos.");
}

#[tokio::test]
async fn test_months_and_default_selection() {
    let transactions = load().await;

    let months = bucket_by_month(&transactions, Locale::EsCl.months(), MonthOrder::Descending);
    let labels: Vec<_> = months.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["febrero de 2024", "enero de 2024"]);

    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let selected = default_month(&months, today).unwrap();
    assert_eq!(selected, MonthKey::new(2024, 2).unwrap());

    let summary = month_summary(&transactions, selected);
    assert_eq!(summary.total, 450000 + 165000);
    assert_eq!(summary.debit, 0);
    assert_eq!(summary.credit_share(), 100.0);

    let bucket_sum: i64 = months.iter().map(|m| m.total).sum();
    assert_eq!(bucket_sum, aggregate(&transactions).total);
}

#[tokio::test]
async fn test_table_filtering_with_pending_edits() {
    let transactions = load().await;
    let mut session = EditSession::new(transactions);

    // Recategorize January rent without touching the canonical record
    session
        .stage(
            &TransactionId::from(1000),
            FieldEdit::Category {
                name: "Arriendo".into(),
                category_id: Some(9),
            },
        )
        .unwrap();

    let filters = FilterState::new()
        .category(Filter::Only("Arriendo".into()))
        .payment_method(Filter::Only(PaymentMethod::Debit));
    let rows = session.visible(&filters);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "ARRIENDO ENERO");

    // Stats keep using canonical values
    assert_eq!(session.stats().top_categories[0].name, "Vivienda");

    let filters = FilterState::new()
        .search("arriendo")
        .sort_by(SortField::Amount)
        .sort_by(SortField::Date);
    let rows = filter_and_sort(session.transactions(), &filters, session.overlay());
    let ids: Vec<_> = rows.iter().map(|t| t.id.to_string()).collect();
    assert_eq!(ids, vec!["1000", "1001"]);
}

#[tokio::test]
async fn test_no_op_filters_preserve_input() {
    let transactions = load().await;
    let session = EditSession::new(transactions.clone());
    let rows = session.visible(&FilterState::new());
    assert_eq!(rows.len(), transactions.len());
    assert!(rows.iter().zip(transactions.iter()).all(|(a, b)| a.id == b.id));
}

#[test]
fn test_empty_backend_response() {
    let transactions = transactions_from_json(&json!([]));
    let stats = aggregate(&transactions);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.credit_usage, 0.0);
    assert!(compute_alerts(&transactions, &stats).is_empty());
    assert!(bucket_by_month(&transactions, Locale::En.months(), MonthOrder::Ascending).is_empty());
}
