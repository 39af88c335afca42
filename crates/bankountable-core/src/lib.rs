//! Bankountable Core Library
//!
//! Engine behind the Bankountable personal finance tracker:
//! - Defensive decoding of statements-backend records
//! - Spending aggregation and month bucketing
//! - Transaction filtering and click-to-sort ordering
//! - Pending-edit overlay over fetched transactions
//! - Spending alert heuristics
//! - CLP currency, percentage and date formatting
//! - Configuration and the statements-backend client

pub mod alerts;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod locale;
pub mod models;
pub mod overlay;
pub mod records;
pub mod reports;

/// Test utilities including mock statements backend
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use alerts::{compute_alerts, Alert, Severity};
pub use client::{
    resolve_category_id, DataSource, HttpBackend, StaticSource, TransactionStore,
    TransactionUpdate,
};
pub use config::{BackendConfig, Config, DisplayConfig};
pub use error::{Error, Result};
pub use filter::{filter_and_sort, Filter, FilterState, SortDirection, SortField, SortState};
pub use locale::{Locale, MonthLocale};
pub use models::{
    MonthKey, PaymentMethod, StatsSummary, Transaction, TransactionId, UNCATEGORIZED,
    UNKNOWN_MERCHANT,
};
pub use overlay::{EditOverlay, EditSession, FieldEdit};
pub use reports::{aggregate, bucket_by_month, default_month, month_summary, MonthOrder};
