//! Spending reports and analytics
//!
//! Everything here is a pure function over a borrowed transaction slice. The
//! source list is never mutated and every call allocates fresh output.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::locale::MonthLocale;
use crate::models::{
    share, MonthBucket, MonthKey, MonthSummary, NamedAmount, PaymentMethod, PaymentTotals,
    StatsSummary, Transaction, UNKNOWN_MERCHANT,
};

/// Number of entries kept in the top category/merchant rankings
pub const TOP_N: usize = 5;

/// Order for month buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthOrder {
    /// Oldest first, for trend charts
    Ascending,
    /// Newest first, for month selectors
    Descending,
}

/// Compute summary statistics over a set of transactions
pub fn aggregate(transactions: &[Transaction]) -> StatsSummary {
    let total = transactions
        .iter()
        .fold(0i64, |acc, t| acc.saturating_add(t.amount));

    let by_category = rank_by(transactions, |t| t.category.as_str());
    let by_merchant = rank_by(transactions, |t| {
        if t.merchant.is_empty() {
            UNKNOWN_MERCHANT
        } else {
            t.merchant.as_str()
        }
    });

    let mut by_payment_method = PaymentTotals::default();
    for tx in transactions {
        match tx.payment_method {
            PaymentMethod::Credit => {
                by_payment_method.credit = by_payment_method.credit.saturating_add(tx.amount)
            }
            PaymentMethod::Debit => {
                by_payment_method.debit = by_payment_method.debit.saturating_add(tx.amount)
            }
            // Counted in the grand total only
            PaymentMethod::Unspecified | PaymentMethod::Other(_) => {}
        }
    }

    let summary = StatsSummary {
        total,
        total_transactions: transactions.len(),
        top_categories: by_category.iter().take(TOP_N).cloned().collect(),
        top_merchants: by_merchant.iter().take(TOP_N).cloned().collect(),
        by_category,
        by_merchant,
        by_payment_method,
        credit_usage: share(by_payment_method.credit, total),
    };

    debug!(
        transactions = summary.total_transactions,
        total = summary.total,
        categories = summary.by_category.len(),
        merchants = summary.by_merchant.len(),
        "Aggregated transaction stats"
    );

    summary
}

/// Group by key, sum amounts, and rank descending
///
/// Groups keep the order their first transaction appeared in, and the sort is
/// stable, so equal totals stay in first-encountered order.
fn rank_by<'a>(
    transactions: &'a [Transaction],
    key: impl Fn(&'a Transaction) -> &'a str,
) -> Vec<NamedAmount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<NamedAmount> = Vec::new();

    for tx in transactions {
        let name = key(tx);
        match index.get(name) {
            Some(&i) => groups[i].amount = groups[i].amount.saturating_add(tx.amount),
            None => {
                index.insert(name, groups.len());
                groups.push(NamedAmount {
                    name: name.to_string(),
                    amount: tx.amount,
                });
            }
        }
    }

    groups.sort_by(|a, b| b.amount.cmp(&a.amount));
    groups
}

/// Bucket transactions by calendar month
pub fn bucket_by_month(
    transactions: &[Transaction],
    locale: &dyn MonthLocale,
    order: MonthOrder,
) -> Vec<MonthBucket> {
    let mut index: HashMap<MonthKey, usize> = HashMap::new();
    let mut buckets: Vec<MonthBucket> = Vec::new();

    for tx in transactions {
        let key = tx.month();
        let i = *index.entry(key).or_insert_with(|| {
            buckets.push(MonthBucket {
                key,
                label: locale.long_label(key),
                total: 0,
                transaction_count: 0,
            });
            buckets.len() - 1
        });
        buckets[i].total = buckets[i].total.saturating_add(tx.amount);
        buckets[i].transaction_count += 1;
    }

    match order {
        MonthOrder::Ascending => buckets.sort_by(|a, b| a.key.cmp(&b.key)),
        MonthOrder::Descending => buckets.sort_by(|a, b| b.key.cmp(&a.key)),
    }
    buckets
}

/// Totals for a single month, split by payment method
pub fn month_summary(transactions: &[Transaction], month: MonthKey) -> MonthSummary {
    let mut summary = MonthSummary {
        month,
        total: 0,
        credit: 0,
        debit: 0,
        transaction_count: 0,
    };

    for tx in transactions.iter().filter(|t| t.month() == month) {
        summary.total = summary.total.saturating_add(tx.amount);
        summary.transaction_count += 1;
        match tx.payment_method {
            PaymentMethod::Credit => summary.credit = summary.credit.saturating_add(tx.amount),
            PaymentMethod::Debit => summary.debit = summary.debit.saturating_add(tx.amount),
            PaymentMethod::Unspecified | PaymentMethod::Other(_) => {}
        }
    }

    summary
}

/// Month to preselect on the dashboard
///
/// Prefers the month before `today`; falls back to the newest month with data.
pub fn default_month(available: &[MonthBucket], today: NaiveDate) -> Option<MonthKey> {
    let previous = MonthKey::of(&today).previous();
    if available.iter().any(|b| b.key == previous) {
        return Some(previous);
    }
    available.iter().map(|b| b.key).max()
}
