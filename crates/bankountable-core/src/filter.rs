//! Transaction filtering and sorting for the transaction table
//!
//! `FilterState` is a builder over the user-controlled selectors. Applying it
//! produces a fresh, ordered view of the input without mutating it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{MonthKey, PaymentMethod, Transaction};
use crate::overlay::EditOverlay;

/// A selector that is either "all" or pinned to one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Filter<T> {
    /// Vacuously true for `All`
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl<T> From<Option<T>> for Filter<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::All, Self::Only)
    }
}

/// Columns the table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Date,
    Description,
    Amount,
    Category,
    Payment,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Payment => "payment",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "description" => Ok(Self::Description),
            "amount" => Ok(Self::Amount),
            "category" => Ok(Self::Category),
            "payment" | "payment_method" => Ok(Self::Payment),
            _ => Err(format!(
                "Unknown sort field: {} (valid: date, description, amount, category, payment)",
                s
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortState {
    /// Column header click: same field flips direction, a new field starts ascending
    pub fn toggle(&mut self, field: SortField) {
        if self.field == Some(field) {
            self.direction = self.direction.toggled();
        } else {
            self.field = Some(field);
            self.direction = SortDirection::Asc;
        }
    }
}

/// Selectors for the transaction table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub category: Filter<String>,
    pub payment_method: Filter<PaymentMethod>,
    pub month: Filter<MonthKey>,
    /// Case-insensitive substring of description or merchant; empty matches all
    pub search: String,
    pub sort: SortState,
}

impl FilterState {
    /// Create a filter that matches everything, unsorted
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Filter<String>) -> Self {
        self.category = category;
        self
    }

    pub fn payment_method(mut self, method: Filter<PaymentMethod>) -> Self {
        self.payment_method = method;
        self
    }

    pub fn month(mut self, month: Filter<MonthKey>) -> Self {
        self.month = month;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Apply a header click (see [`SortState::toggle`])
    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort.toggle(field);
        self
    }

    /// Whether a transaction passes every predicate
    pub fn matches(&self, tx: &Transaction, overlay: &EditOverlay) -> bool {
        self.matches_category(tx, overlay)
            && self.matches_payment(tx, overlay)
            && self.matches_month(tx)
            && self.matches_search(tx)
    }

    fn matches_category(&self, tx: &Transaction, overlay: &EditOverlay) -> bool {
        match &self.category {
            Filter::All => true,
            Filter::Only(expected) => overlay.category(tx) == expected,
        }
    }

    fn matches_payment(&self, tx: &Transaction, overlay: &EditOverlay) -> bool {
        self.payment_method.matches(overlay.payment_method(tx))
    }

    fn matches_month(&self, tx: &Transaction) -> bool {
        self.month.matches(&tx.month())
    }

    fn matches_search(&self, tx: &Transaction) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        tx.description.to_lowercase().contains(&term) || tx.merchant.to_lowercase().contains(&term)
    }
}

/// Filter and sort transactions for display
///
/// Category and payment comparisons use effective (overlay) values; date,
/// description and amount use the records as fetched. With no sort field the
/// input order is kept.
pub fn filter_and_sort<'a>(
    transactions: &'a [Transaction],
    filters: &FilterState,
    overlay: &EditOverlay,
) -> Vec<&'a Transaction> {
    let mut rows: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| filters.matches(tx, overlay))
        .collect();

    if let Some(field) = filters.sort.field {
        let direction = filters.sort.direction;
        // Stable sort: ties keep their input order in both directions
        rows.sort_by(|a, b| direction.apply(compare(field, a, b, overlay)));
    }

    rows
}

fn compare(field: SortField, a: &Transaction, b: &Transaction, overlay: &EditOverlay) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Description => a
            .description
            .to_lowercase()
            .cmp(&b.description.to_lowercase()),
        SortField::Amount => a.amount.cmp(&b.amount),
        SortField::Category => overlay
            .category(a)
            .to_lowercase()
            .cmp(&overlay.category(b).to_lowercase()),
        SortField::Payment => overlay
            .payment_method(a)
            .label()
            .to_lowercase()
            .cmp(&overlay.payment_method(b).label().to_lowercase()),
    }
}
