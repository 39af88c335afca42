//! Statements backend client
//!
//! The engine only ever sees decoded [`Transaction`]s. Where they come from is
//! behind [`DataSource`]: [`HttpBackend`] talks to the FastAPI statements
//! service, [`StaticSource`] serves an in-memory set.

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::models::{
    CategoryRecord, ImportOutcome, ImportRecord, NamedAmount, PaymentMethod, PaymentTotals,
    StatsSummary, TagRecord, Transaction, TransactionId, UNCATEGORIZED, UNKNOWN_MERCHANT,
};
use crate::records::{
    categories_from_json, coerce_amount, imports_from_json, tags_from_json, transactions_from_json,
};

/// Read access to transactions and the option lists for filters and editors
#[async_trait]
pub trait DataSource: Send + Sync {
    /// All transactions, defensively decoded
    async fn transactions(&self) -> Result<Vec<Transaction>>;

    async fn categories(&self) -> Result<Vec<CategoryRecord>>;

    async fn tags(&self) -> Result<Vec<TagRecord>>;
}

/// Write access for transaction edits and deletes
#[async_trait]
pub trait TransactionStore: DataSource {
    /// Persist an update
    ///
    /// The backend only acknowledges the write, so callers apply the
    /// change locally once this returns `Ok`.
    async fn update_transaction(&self, id: &TransactionId, update: &TransactionUpdate) -> Result<()>;

    async fn delete_transaction(&self, id: &TransactionId) -> Result<()>;
}

/// Body of `PUT /api/transactions/{id}`; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionUpdate {
    /// `Some(None)` clears the category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransactionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category_id: Option<i64>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn payment_method(mut self, method: &PaymentMethod) -> Self {
        self.payment_method = Some(method.wire_value());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.payment_method.is_none() && self.description.is_none()
    }
}

/// Look up a category id by display name
///
/// The uncategorized sentinel maps to `Some(None)` (clear the category).
/// Unknown names return `None`.
pub fn resolve_category_id(categories: &[CategoryRecord], name: &str) -> Option<Option<i64>> {
    if name == UNCATEGORIZED {
        return Some(None);
    }
    categories
        .iter()
        .find(|c| c.name == name)
        .map(|c| Some(c.id))
}

/// reqwest client for the statements backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http_client: Client,
    base_url: String,
    transaction_limit: u32,
}

impl HttpBackend {
    /// Create a client with default settings for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&BackendConfig {
            base_url: base_url.to_string(),
            ..BackendConfig::default()
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transaction_limit: config.transaction_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self.http_client.get(self.url(path)).send().await?;
        let value: Value = check_status(path, response).await?.json().await?;
        Ok(value)
    }

    /// Backend-computed statistics (`GET /api/stats`)
    pub async fn stats(&self) -> Result<StatsSummary> {
        let value = self.get_json("/api/stats").await?;
        Ok(stats_from_json(&value))
    }

    /// Upload a PDF bank statement for import
    pub async fn import_pdf(&self, path: &Path) -> Result<ImportOutcome> {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(Error::InvalidData(format!(
                "Only PDF files can be imported: {}",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("statement.pdf")
            .to_string();
        let bytes = std::fs::read(path)?;
        debug!(file = %file_name, size = bytes.len(), "Uploading statement");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let endpoint = "/api/import/pdf";
        let response = self
            .http_client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await?;
        let value: Value = check_status(endpoint, response).await?.json().await?;

        Ok(ImportOutcome {
            message: value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            transactions_imported: value
                .get("transactions_imported")
                .map(coerce_amount)
                .unwrap_or(0),
        })
    }

    /// Statement import history (`GET /api/import/list`)
    pub async fn list_imports(&self) -> Result<Vec<ImportRecord>> {
        let value = self.get_json("/api/import/list").await?;
        Ok(imports_from_json(&value))
    }
}

#[async_trait]
impl DataSource for HttpBackend {
    async fn transactions(&self) -> Result<Vec<Transaction>> {
        let path = format!("/api/transactions?limit={}", self.transaction_limit);
        let value = self.get_json(&path).await?;
        let transactions = transactions_from_json(&value);
        debug!(count = transactions.len(), "Fetched transactions");
        Ok(transactions)
    }

    async fn categories(&self) -> Result<Vec<CategoryRecord>> {
        let value = self.get_json("/api/categories").await?;
        Ok(categories_from_json(&value))
    }

    async fn tags(&self) -> Result<Vec<TagRecord>> {
        let value = self.get_json("/api/tags").await?;
        Ok(tags_from_json(&value))
    }
}

#[async_trait]
impl TransactionStore for HttpBackend {
    async fn update_transaction(
        &self,
        id: &TransactionId,
        update: &TransactionUpdate,
    ) -> Result<()> {
        let path = format!("/api/transactions/{}", id);
        let response = self
            .http_client
            .put(self.url(&path))
            .json(update)
            .send()
            .await?;
        // Body is `{"success": true}`, not the stored record
        check_status(&path, response).await?;
        debug!(id = %id, "Transaction updated");
        Ok(())
    }

    async fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        let path = format!("/api/transactions/{}", id);
        let response = self.http_client.delete(self.url(&path)).send().await?;
        check_status(&path, response).await?;
        Ok(())
    }
}

/// Turn non-2xx responses into errors carrying the backend's `detail`
async fn check_status(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<Value>(&body) {
        Ok(value) => match value.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.clone(),
        },
        Err(_) => body.clone(),
    };

    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(if detail.is_empty() {
            endpoint.to_string()
        } else {
            detail
        }));
    }

    Err(Error::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        detail,
    })
}

/// Decode the backend's `/api/stats` payload
///
/// The backend only reports the top entries, so `by_category` and
/// `by_merchant` mirror the top lists.
pub fn stats_from_json(value: &Value) -> StatsSummary {
    let named = |key: &str, placeholder: &str| -> Vec<NamedAmount> {
        value
            .get(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|item| NamedAmount {
                name: item
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(placeholder)
                    .to_string(),
                amount: item.get("amount").map(coerce_amount).unwrap_or(0),
            })
            .collect()
    };

    let top_categories = named("top_categories", UNCATEGORIZED);
    let top_merchants = named("top_merchants", UNKNOWN_MERCHANT);
    let by_method = value.get("by_payment_method");
    let method_total = |key: &str| {
        by_method
            .and_then(|m| m.get(key))
            .map(coerce_amount)
            .unwrap_or(0)
    };

    StatsSummary {
        total: value.get("total").map(coerce_amount).unwrap_or(0),
        total_transactions: value
            .get("total_transactions")
            .map(coerce_amount)
            .unwrap_or(0)
            .max(0) as usize,
        by_category: top_categories.clone(),
        by_merchant: top_merchants.clone(),
        top_categories,
        top_merchants,
        by_payment_method: PaymentTotals {
            credit: method_total("credit"),
            debit: method_total("debit"),
        },
        credit_usage: value
            .get("credit_usage")
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
    }
}

/// In-memory data source for tests and offline use
#[derive(Debug, Default)]
pub struct StaticSource {
    transactions: RwLock<Vec<Transaction>>,
    categories: Vec<CategoryRecord>,
    tags: Vec<TagRecord>,
}

impl StaticSource {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: RwLock::new(transactions),
            ..Self::default()
        }
    }

    pub fn with_categories(mut self, categories: Vec<CategoryRecord>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagRecord>) -> Self {
        self.tags = tags;
        self
    }

    fn read(&self) -> Result<Vec<Transaction>> {
        self.transactions
            .read()
            .map(|txs| txs.clone())
            .map_err(|_| Error::InvalidData("Transaction store lock poisoned".into()))
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.read()
    }

    async fn categories(&self) -> Result<Vec<CategoryRecord>> {
        Ok(self.categories.clone())
    }

    async fn tags(&self) -> Result<Vec<TagRecord>> {
        Ok(self.tags.clone())
    }
}

#[async_trait]
impl TransactionStore for StaticSource {
    async fn update_transaction(
        &self,
        id: &TransactionId,
        update: &TransactionUpdate,
    ) -> Result<()> {
        let mut txs = self
            .transactions
            .write()
            .map_err(|_| Error::InvalidData("Transaction store lock poisoned".into()))?;
        let tx = txs
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;

        if let Some(category_id) = update.category_id {
            tx.category_id = category_id;
            tx.category = category_id
                .and_then(|cid| self.categories.iter().find(|c| c.id == cid))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
        }
        if let Some(method) = &update.payment_method {
            tx.payment_method = PaymentMethod::from_wire(method);
        }
        if let Some(text) = &update.description {
            tx.description = text.clone();
        }
        Ok(())
    }

    async fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        let mut txs = self
            .transactions
            .write()
            .map_err(|_| Error::InvalidData("Transaction store lock poisoned".into()))?;
        let before = txs.len();
        txs.retain(|t| &t.id != id);
        if txs.len() == before {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockBackendServer;
    use serde_json::json;
    use std::io::Write;

    fn categories() -> Vec<CategoryRecord> {
        vec![
            CategoryRecord {
                id: 1,
                name: "Alimentación".into(),
                description: None,
                color: None,
            },
            CategoryRecord {
                id: 2,
                name: "Transporte".into(),
                description: None,
                color: Some("#4facfe".into()),
            },
        ]
    }

    #[test]
    fn test_update_body_serialization() {
        let body = TransactionUpdate::new().category(None);
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"category_id": null}));

        let body = TransactionUpdate::new()
            .payment_method(&PaymentMethod::Credit)
            .description("Bencina");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"payment_method": "credit", "description": "Bencina"})
        );
        assert!(TransactionUpdate::new().is_empty());
    }

    #[test]
    fn test_resolve_category_id() {
        let cats = categories();
        assert_eq!(resolve_category_id(&cats, "Transporte"), Some(Some(2)));
        assert_eq!(resolve_category_id(&cats, UNCATEGORIZED), Some(None));
        assert_eq!(resolve_category_id(&cats, "Viajes"), None);
    }

    #[test]
    fn test_stats_from_json_defaults() {
        let stats = stats_from_json(&json!({
            "total": 1500.0,
            "total_transactions": 3,
            "credit_usage": 66.7,
            "by_payment_method": {"credit": 1000.0, "debit": 500.0},
            "top_categories": [{"name": null, "amount": 900}, {"name": "Transporte", "amount": 600}],
            "top_merchants": [{"name": "", "amount": 1500}]
        }));
        assert_eq!(stats.total, 1500);
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.top_categories[0].name, UNCATEGORIZED);
        assert_eq!(stats.top_merchants[0].name, UNKNOWN_MERCHANT);
        assert_eq!(stats.by_payment_method.credit, 1000);
        assert!((stats.credit_usage - 66.7).abs() < 1e-9);

        assert_eq!(stats_from_json(&json!({})), StatsSummary::default());
    }

    #[tokio::test]
    async fn test_static_source_update_and_delete() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let source = StaticSource::new(vec![Transaction::new(1, date, "Copec", 100)])
            .with_categories(categories());
        let id = TransactionId::from(1);

        source
            .update_transaction(&id, &TransactionUpdate::new().category(Some(2)))
            .await
            .unwrap();
        let txs = source.transactions().await.unwrap();
        assert_eq!(txs[0].category, "Transporte");
        assert_eq!(txs[0].category_id, Some(2));

        source.delete_transaction(&id).await.unwrap();
        assert!(source.transactions().await.unwrap().is_empty());
        assert!(matches!(
            source.delete_transaction(&id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_http_fetches_transactions() {
        let server = MockBackendServer::start().await;
        let backend = HttpBackend::new(&server.url()).unwrap();

        let txs = backend.transactions().await.unwrap();
        // The fixture carries one record without a date
        assert_eq!(txs.len(), 4);
        assert_eq!(txs[0].category, "Alimentación");
        assert_eq!(txs[0].payment_method, PaymentMethod::Credit);
        assert_eq!(txs[3].category, UNCATEGORIZED);

        let cats = backend.categories().await.unwrap();
        assert_eq!(cats.len(), 3);
        let tags = backend.tags().await.unwrap();
        assert!(tags.iter().any(|t| t.name == "recurrente"));
    }

    #[tokio::test]
    async fn test_http_trailing_slash_and_limit() {
        let server = MockBackendServer::start().await;
        let backend = HttpBackend::from_config(&BackendConfig {
            base_url: format!("{}/", server.url()),
            transaction_limit: 2,
            ..BackendConfig::default()
        })
        .unwrap();
        assert!(!backend.base_url().ends_with('/'));
        assert_eq!(backend.transactions().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_http_stats() {
        let server = MockBackendServer::start().await;
        let backend = HttpBackend::new(&server.url()).unwrap();
        let stats = backend.stats().await.unwrap();
        assert!(stats.total > 0);
        assert_eq!(stats.total, stats.by_payment_method.credit + stats.by_payment_method.debit);
    }

    #[tokio::test]
    async fn test_http_update_and_delete() {
        let server = MockBackendServer::start().await;
        let backend = HttpBackend::new(&server.url()).unwrap();
        let id = TransactionId::from(2);

        backend
            .update_transaction(&id, &TransactionUpdate::new().description("Bencina Copec"))
            .await
            .unwrap();
        let txs = backend.transactions().await.unwrap();
        let tx = txs.iter().find(|t| t.id == id).unwrap();
        assert_eq!(tx.description, "Bencina Copec");

        backend.delete_transaction(&id).await.unwrap();
        let remaining = backend.transactions().await.unwrap();
        assert!(remaining.iter().all(|t| t.id != id));

        let err = backend.delete_transaction(&id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(ref d) if d == "Transacción no encontrada"));

        let err = backend
            .update_transaction(&id, &TransactionUpdate::new().description("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_http_update_accepts_bare_acknowledgement() {
        use axum::{routing::put, Json, Router};

        // Real backend answers a successful PUT with `{"success": true}` only
        let app = Router::new().route(
            "/api/transactions/:id",
            put(|| async { Json(json!({"success": true})) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let backend = HttpBackend::new(&format!("http://{}", addr)).unwrap();
        let result = backend
            .update_transaction(&TransactionId::from(7), &TransactionUpdate::new().description("x"))
            .await;
        assert!(result.is_ok(), "update failed: {:?}", result);
    }

    #[tokio::test]
    async fn test_http_import_pdf() {
        let server = MockBackendServer::start().await;
        let backend = HttpBackend::new(&server.url()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cartola.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4 fake").unwrap();

        let outcome = backend.import_pdf(&path).await.unwrap();
        assert_eq!(outcome.transactions_imported, 3);
        assert!(!outcome.message.is_empty());

        let imports = backend.list_imports().await.unwrap();
        assert_eq!(imports.last().unwrap().filename, "cartola.pdf");
    }

    #[tokio::test]
    async fn test_import_rejects_non_pdf() {
        let backend = HttpBackend::new("http://127.0.0.1:1").unwrap();
        let err = backend
            .import_pdf(Path::new("cartola.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_status_error_carries_detail() {
        let server = MockBackendServer::start().await;
        let backend = HttpBackend::new(&server.url()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::File::create(&path).unwrap();

        match backend.import_pdf(&path).await {
            Err(Error::Status { status, detail, .. }) => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Empty file");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
