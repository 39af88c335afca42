//! Test utilities for bankountable-core
//!
//! This module provides a mock statements backend that serves the same
//! `/api/...` routes as the real service, backed by an in-memory fixture.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::records::transactions_from_json;
use crate::reports::aggregate;

type ApiResult = std::result::Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Mock statements backend for testing
pub struct MockBackendServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Clone)]
struct MockState {
    transactions: Arc<Mutex<Vec<Value>>>,
    imports: Arc<Mutex<Vec<Value>>>,
}

impl MockBackendServer {
    /// Start the mock server with the default fixture on an available port
    pub async fn start() -> Self {
        Self::with_transactions(fixture_transactions()).await
    }

    /// Start the mock server serving the given raw transaction records
    pub async fn with_transactions(records: Vec<Value>) -> Self {
        let state = MockState {
            transactions: Arc::new(Mutex::new(records)),
            imports: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/api/transactions", get(handle_transactions))
            .route(
                "/api/transactions/:id",
                put(handle_update).delete(handle_delete),
            )
            .route("/api/categories", get(handle_categories))
            .route("/api/tags", get(handle_tags))
            .route("/api/stats", get(handle_stats))
            .route("/api/import/pdf", post(handle_import))
            .route("/api/import/list", get(handle_import_list))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockBackendServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Raw records as the backend emits them
///
/// The last record has no date and is dropped by the decoder.
pub fn fixture_transactions() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "transaction_date": "2024-01-05T09:12:00",
            "description": "COMPRA STARBUCKS COSTANERA",
            "merchant": "Starbucks",
            "amount": 4500.0,
            "category_id": 1,
            "category_name": "Alimentación",
            "payment_method": "credit",
            "tags": ["café", "recurrente"]
        }),
        json!({
            "id": 2,
            "transaction_date": "2024-01-12T18:40:00",
            "description": "COPEC LAS CONDES",
            "merchant": "Copec",
            "amount": 42000.0,
            "category_id": 2,
            "category_name": "Transporte",
            "payment_method": "debit",
            "tags": []
        }),
        json!({
            "id": 3,
            "transaction_date": "2024-02-02T13:05:00",
            "description": "LIDER EXPRESS",
            "merchant": "Lider",
            "amount": 38990.0,
            "category_id": 1,
            "category_name": "Alimentación",
            "payment_method": "credit",
            "tags": null
        }),
        json!({
            "id": 4,
            "transaction_date": "2024-02-15",
            "description": "TRANSFERENCIA",
            "merchant": null,
            "amount": "15000",
            "category_id": null,
            "category_name": null,
            "payment_method": "debit"
        }),
        json!({
            "id": 5,
            "description": "SIN FECHA",
            "amount": 100.0,
            "payment_method": "credit"
        }),
    ]
}

fn fixture_categories() -> Value {
    json!([
        {"id": 1, "name": "Alimentación", "description": "Supermercado y restaurantes", "color": "#f093fb"},
        {"id": 2, "name": "Transporte", "description": null, "color": "#4facfe"},
        {"id": 3, "name": "Entretenimiento", "description": null, "color": null}
    ])
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Transacción no encontrada"})),
    )
}

fn bad_request(detail: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"detail": detail})))
}

fn same_id(record: &Value, id: &str) -> bool {
    match record.get("id") {
        Some(Value::Number(n)) => n.to_string() == id,
        Some(Value::String(s)) => s == id,
        _ => false,
    }
}

async fn handle_transactions(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(100);
    let records = state.transactions.lock().unwrap();
    Json(Value::Array(records.iter().take(limit).cloned().collect()))
}

async fn handle_update(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult {
    let mut records = state.transactions.lock().unwrap();
    let record = records
        .iter_mut()
        .find(|r| same_id(r, &id))
        .ok_or_else(not_found)?;

    if let Some(category_id) = body.get("category_id") {
        let name = fixture_categories()
            .as_array()
            .and_then(|cats| {
                cats.iter()
                    .find(|c| &c["id"] == category_id)
                    .map(|c| c["name"].clone())
            })
            .unwrap_or(Value::Null);
        record["category_id"] = category_id.clone();
        record["category_name"] = name;
    }
    for field in ["payment_method", "description"] {
        if let Some(value) = body.get(field) {
            record[field] = value.clone();
        }
    }

    Ok(Json(json!({"success": true})))
}

async fn handle_delete(State(state): State<MockState>, Path(id): Path<String>) -> ApiResult {
    let mut records = state.transactions.lock().unwrap();
    let before = records.len();
    records.retain(|r| !same_id(r, &id));
    if records.len() == before {
        return Err(not_found());
    }
    Ok(Json(json!({"success": true})))
}

async fn handle_categories() -> Json<Value> {
    Json(fixture_categories())
}

async fn handle_tags() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "café"},
        {"id": 2, "name": "recurrente"},
        {"id": 3, "name": "viaje"}
    ]))
}

/// Stats the way the backend reports them, computed from the current records
async fn handle_stats(State(state): State<MockState>) -> Json<Value> {
    let records = state.transactions.lock().unwrap().clone();
    let stats = aggregate(&transactions_from_json(&Value::Array(records)));
    Json(json!({
        "total": stats.total as f64,
        "total_transactions": stats.total_transactions,
        "credit_usage": stats.credit_usage,
        "by_payment_method": {
            "credit": stats.by_payment_method.credit as f64,
            "debit": stats.by_payment_method.debit as f64
        },
        "top_categories": stats.top_categories,
        "top_merchants": stats.top_merchants
    }))
}

async fn handle_import(State(state): State<MockState>, mut multipart: Multipart) -> ApiResult {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(bad_request("Only PDF files are allowed"));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|_| bad_request("Unreadable upload"))?;
        if bytes.is_empty() {
            return Err(bad_request("Empty file"));
        }

        let mut imports = state.imports.lock().unwrap();
        let id = imports.len() + 1;
        imports.push(json!({
            "id": id,
            "filename": filename,
            "status": "completed",
            "transactions_count": 3,
            "imported_at": "2024-03-01T10:00:00",
            "error_message": null
        }));

        return Ok(Json(json!({
            "message": "PDF imported successfully",
            "transactions_imported": 3
        })));
    }
    Err(bad_request("Missing file field"))
}

async fn handle_import_list(State(state): State<MockState>) -> Json<Value> {
    Json(Value::Array(state.imports.lock().unwrap().clone()))
}
