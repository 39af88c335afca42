//! Data models for Bankountable

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Category name shown for transactions without an assigned category
pub const UNCATEGORIZED: &str = "Sin categoría";

/// Merchant name shown for transactions without a counterparty
pub const UNKNOWN_MERCHANT: &str = "Sin comercio";

/// Opaque transaction identifier, stable for the lifetime of a transaction
///
/// The backend hands out integers, but nothing in the engine relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for TransactionId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payment method used for a transaction
///
/// The backend only knows `credit` and `debit`; anything else is carried
/// through verbatim so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card
    Credit,
    /// Debit card / bank account
    Debit,
    /// No payment method on record
    Unspecified,
    /// Unrecognized value passed through from the backend
    Other(String),
}

impl PaymentMethod {
    /// Human-facing label
    pub fn label(&self) -> &str {
        match self {
            Self::Credit => "Crédito",
            Self::Debit => "Débito",
            Self::Unspecified => "Sin especificar",
            Self::Other(raw) => raw,
        }
    }

    /// Value sent to the backend when updating a transaction
    pub fn wire_value(&self) -> String {
        match self {
            Self::Credit => "credit".to_string(),
            Self::Debit => "debit".to_string(),
            Self::Unspecified => String::new(),
            Self::Other(raw) => raw.to_lowercase(),
        }
    }

    /// Decode a stored backend value
    ///
    /// Only the exact wire values map to known methods. Anything else is kept
    /// verbatim so it displays as the backend wrote it.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "credit" => Self::Credit,
            "debit" => Self::Debit,
            "" => Self::Unspecified,
            other => Self::Other(other.to_string()),
        }
    }

    /// Interpret user input: a wire value (`credit`) or a display label (`Crédito`)
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "credit" | "crédito" | "credito" => Self::Credit,
            "debit" | "débito" | "debito" => Self::Debit,
            "" | "sin especificar" => Self::Unspecified,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A bank transaction as imported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// When the transaction occurred
    pub date: NaiveDateTime,
    pub description: String,
    /// Counterparty name (may be empty)
    pub merchant: String,
    /// Whole Chilean pesos, never negative
    pub amount: i64,
    /// Category display name, or `UNCATEGORIZED`
    pub category: String,
    /// Backend id of the category, when one is assigned
    pub category_id: Option<i64>,
    pub payment_method: PaymentMethod,
    /// Free-text labels, unique, in insertion order
    pub tags: Vec<String>,
}

impl Transaction {
    /// Create an uncategorized transaction with no merchant or tags
    pub fn new(
        id: impl Into<TransactionId>,
        date: NaiveDateTime,
        description: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            description: description.into(),
            merchant: String::new(),
            amount: amount.max(0),
            category: UNCATEGORIZED.to_string(),
            category_id: None,
            payment_method: PaymentMethod::Unspecified,
            tags: Vec::new(),
        }
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = merchant.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    /// Set tags, dropping duplicates
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = dedupe_tags(tags.into_iter().map(Into::into));
        self
    }

    /// Calendar month the transaction falls in
    pub fn month(&self) -> MonthKey {
        MonthKey::of(&self.date)
    }

    /// Whether any tag marks this as a recurring expense
    pub fn has_tag_containing(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Remove duplicate tags, keeping the first occurrence
pub fn dedupe_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// A calendar month, rendered as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing the given date
    pub fn of(date: &impl Datelike) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar month before this one
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || format!("Invalid month: {} (expected YYYY-MM)", s);
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A named total (category or merchant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAmount {
    pub name: String,
    pub amount: i64,
}

/// Totals for the two known payment methods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTotals {
    pub credit: i64,
    pub debit: i64,
}

/// Aggregate statistics over a set of transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total: i64,
    pub total_transactions: usize,
    /// Every category, ranked by amount descending
    pub by_category: Vec<NamedAmount>,
    /// Every merchant, ranked by amount descending
    pub by_merchant: Vec<NamedAmount>,
    pub top_categories: Vec<NamedAmount>,
    pub top_merchants: Vec<NamedAmount>,
    pub by_payment_method: PaymentTotals,
    /// Credit share of the total, as a percentage (0 when total is 0)
    pub credit_usage: f64,
}

impl StatsSummary {
    /// Highest-total category, if any
    pub fn top_category(&self) -> Option<&NamedAmount> {
        self.top_categories.first()
    }
}

/// Spending within one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub key: MonthKey,
    /// Locale-formatted label, e.g. "enero de 2024"
    pub label: String,
    pub total: i64,
    pub transaction_count: usize,
}

/// Totals for a selected month, split by payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: MonthKey,
    pub total: i64,
    pub credit: i64,
    pub debit: i64,
    pub transaction_count: usize,
}

impl MonthSummary {
    /// Credit share of the month's total, as a percentage
    pub fn credit_share(&self) -> f64 {
        share(self.credit, self.total)
    }

    /// Debit share of the month's total, as a percentage
    pub fn debit_share(&self) -> f64 {
        share(self.debit, self.total)
    }
}

/// `part / total * 100`, defined as 0 when total is 0
pub fn share(part: i64, total: i64) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// A category as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// A tag as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
}

/// One entry of the statement import history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub id: i64,
    pub filename: String,
    pub status: String,
    pub transactions_count: i64,
    pub imported_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
}

/// Result of uploading a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub message: String,
    pub transactions_imported: i64,
}
