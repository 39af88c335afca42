//! Pending edits layered over fetched transactions
//!
//! Edits made in the transaction table are shown immediately, before (or
//! without) the backend confirming them. `EditOverlay` keeps one map per
//! editable field and is the single place that decides a transaction's
//! effective value. `EditSession` ties the overlay to the working set.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::{filter_and_sort, FilterState};
use crate::models::{dedupe_tags, PaymentMethod, StatsSummary, Transaction, TransactionId};
use crate::records::known_tags;
use crate::reports::aggregate;

/// A single-field edit to a transaction
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Category {
        name: String,
        /// Backend id for the category (`None` for uncategorized)
        category_id: Option<i64>,
    },
    PaymentMethod(PaymentMethod),
    Description(String),
    Tags(Vec<String>),
}

impl FieldEdit {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Category { .. } => "category",
            Self::PaymentMethod(_) => "payment_method",
            Self::Description(_) => "description",
            Self::Tags(_) => "tags",
        }
    }
}

/// Per-field pending values keyed by transaction id
#[derive(Debug, Clone, Default)]
pub struct EditOverlay {
    categories: HashMap<TransactionId, String>,
    payment_methods: HashMap<TransactionId, PaymentMethod>,
    descriptions: HashMap<TransactionId, String>,
    tags: HashMap<TransactionId, Vec<String>>,
}

impl EditOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pending value for one field
    pub fn stage(&mut self, id: &TransactionId, edit: FieldEdit) {
        match edit {
            FieldEdit::Category { name, .. } => {
                self.categories.insert(id.clone(), name);
            }
            FieldEdit::PaymentMethod(method) => {
                self.payment_methods.insert(id.clone(), method);
            }
            FieldEdit::Description(text) => {
                self.descriptions.insert(id.clone(), text);
            }
            FieldEdit::Tags(tags) => {
                self.tags.insert(id.clone(), normalize_tags(tags));
            }
        }
    }

    /// Drop every pending value for a transaction
    pub fn forget(&mut self, id: &TransactionId) {
        self.categories.remove(id);
        self.payment_methods.remove(id);
        self.descriptions.remove(id);
        self.tags.remove(id);
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.payment_methods.is_empty()
            && self.descriptions.is_empty()
            && self.tags.is_empty()
    }

    /// Effective category; an empty pending name falls back to the record
    pub fn category<'a>(&'a self, tx: &'a Transaction) -> &'a str {
        match self.categories.get(&tx.id) {
            Some(name) if !name.is_empty() => name.as_str(),
            _ => tx.category.as_str(),
        }
    }

    pub fn payment_method<'a>(&'a self, tx: &'a Transaction) -> &'a PaymentMethod {
        self.payment_methods
            .get(&tx.id)
            .unwrap_or(&tx.payment_method)
    }

    /// Effective description; an empty pending text falls back to the record
    pub fn description<'a>(&'a self, tx: &'a Transaction) -> &'a str {
        match self.descriptions.get(&tx.id) {
            Some(text) if !text.is_empty() => text.as_str(),
            _ => tx.description.as_str(),
        }
    }

    /// Effective tags; an empty pending list is honoured
    pub fn tags<'a>(&'a self, tx: &'a Transaction) -> &'a [String] {
        self.tags.get(&tx.id).map(Vec::as_slice).unwrap_or(tx.tags.as_slice())
    }

    /// A copy of the transaction with all pending values applied
    pub fn resolve(&self, tx: &Transaction) -> Transaction {
        Transaction {
            description: self.description(tx).to_string(),
            category: self.category(tx).to_string(),
            payment_method: self.payment_method(tx).clone(),
            tags: self.tags(tx).to_vec(),
            ..tx.clone()
        }
    }
}

/// Trim, drop empty entries and remove duplicates
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dedupe_tags(
        tags.into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty()),
    )
}

/// Parse comma-separated tag input ("café, recurrente")
pub fn parse_tag_input(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

/// The working set of transactions plus pending edits
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    transactions: Vec<Transaction>,
    overlay: EditOverlay,
    known_tags: Vec<String>,
}

impl EditSession {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let known_tags = known_tags(&transactions);
        Self {
            transactions,
            overlay: EditOverlay::new(),
            known_tags,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    /// Every tag seen so far, including ones introduced by edits
    pub fn known_tags(&self) -> &[String] {
        &self.known_tags
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.id == id)
    }

    /// Show an edit locally without touching the canonical record
    pub fn stage(&mut self, id: &TransactionId, edit: FieldEdit) -> Result<()> {
        if self.get(id).is_none() {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        if let FieldEdit::Tags(ref tags) = edit {
            self.remember_tags(tags);
        }
        debug!(id = %id, field = edit.field_name(), "Staged edit");
        self.overlay.stage(id, edit);
        Ok(())
    }

    /// Apply an edit the backend has accepted
    ///
    /// The canonical record is updated and the overlay keeps the same value.
    pub fn confirm(&mut self, id: &TransactionId, edit: FieldEdit) -> Result<()> {
        let tx = self
            .transactions
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;

        match &edit {
            FieldEdit::Category { name, category_id } => {
                tx.category = name.clone();
                tx.category_id = *category_id;
            }
            FieldEdit::PaymentMethod(method) => tx.payment_method = method.clone(),
            FieldEdit::Description(text) => tx.description = text.clone(),
            FieldEdit::Tags(tags) => tx.tags = normalize_tags(tags),
        }

        if let FieldEdit::Tags(ref tags) = edit {
            self.remember_tags(tags);
        }
        debug!(id = %id, field = edit.field_name(), "Confirmed edit");
        self.overlay.stage(id, edit);
        Ok(())
    }

    /// Remove a deleted transaction and its pending edits
    pub fn remove(&mut self, id: &TransactionId) -> Option<Transaction> {
        let pos = self.transactions.iter().position(|t| &t.id == id)?;
        self.overlay.forget(id);
        Some(self.transactions.remove(pos))
    }

    /// Rows for the transaction table
    pub fn visible(&self, filters: &FilterState) -> Vec<&Transaction> {
        filter_and_sort(&self.transactions, filters, &self.overlay)
    }

    /// Statistics over the canonical records
    pub fn stats(&self) -> StatsSummary {
        aggregate(&self.transactions)
    }

    fn remember_tags(&mut self, tags: &[String]) {
        for tag in normalize_tags(tags) {
            if !self.known_tags.contains(&tag) {
                self.known_tags.push(tag);
            }
        }
    }
}
