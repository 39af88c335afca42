//! Spending alert heuristics
//!
//! Three independent rules, always evaluated in the same order. Each rule
//! appends at most one alert; the output order is the rule order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::{format_currency, format_percent};
use crate::models::{share, StatsSummary, Transaction};

/// Credit usage (percent of total) above which the overuse alert fires
pub const CREDIT_USAGE_THRESHOLD: f64 = 80.0;

/// Transactions below this amount count as "small"
pub const SMALL_RECURRING_MAX_AMOUNT: i64 = 10_000;

/// More than this many small recurring transactions fires the alert
pub const SMALL_RECURRING_MIN_COUNT: usize = 50;

/// Share of total (0..1) above which the top category is flagged
pub const CATEGORY_SHARE_THRESHOLD: f64 = 0.4;

/// Tag substring that marks a recurring expense
pub const RECURRING_TAG_MARKER: &str = "recurrente";

/// Severity level of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational - no action needed
    Info,
    /// Worth changing a habit over
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// A user-facing spending alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
    pub icon: String,
}

impl Alert {
    pub fn new(severity: Severity, icon: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            icon: icon.into(),
        }
    }
}

/// Evaluate all alert rules
pub fn compute_alerts(transactions: &[Transaction], stats: &StatsSummary) -> Vec<Alert> {
    let alerts: Vec<Alert> = [
        credit_overuse(stats),
        small_recurring(transactions),
        category_imbalance(stats),
    ]
    .into_iter()
    .flatten()
    .collect();

    debug!(count = alerts.len(), "Computed alerts");
    alerts
}

fn credit_overuse(stats: &StatsSummary) -> Option<Alert> {
    if stats.credit_usage <= CREDIT_USAGE_THRESHOLD {
        return None;
    }
    Some(Alert::new(
        Severity::Warning,
        "💳",
        format!(
            "Estás usando {}% de tarjeta de crédito. Considera usar más débito.",
            format_percent(stats.credit_usage)
        ),
    ))
}

fn small_recurring(transactions: &[Transaction]) -> Option<Alert> {
    let (count, sum) = transactions
        .iter()
        .filter(|t| t.amount < SMALL_RECURRING_MAX_AMOUNT)
        .filter(|t| t.has_tag_containing(RECURRING_TAG_MARKER))
        .fold((0usize, 0i64), |(count, sum), t| (count + 1, sum.saturating_add(t.amount)));

    if count <= SMALL_RECURRING_MIN_COUNT {
        return None;
    }
    Some(Alert::new(
        Severity::Info,
        "☕",
        format!(
            "Tienes {} gastos pequeños recurrentes. Estos suman {}",
            count,
            format_currency(sum)
        ),
    ))
}

fn category_imbalance(stats: &StatsSummary) -> Option<Alert> {
    let top = stats.top_category()?;
    if stats.total <= 0 {
        return None;
    }
    let ratio = top.amount as f64 / stats.total as f64;
    if ratio <= CATEGORY_SHARE_THRESHOLD {
        return None;
    }
    Some(Alert::new(
        Severity::Warning,
        "⚠️",
        format!(
            "{} representa el {}% de tus gastos.",
            top.name,
            format_percent(share(top.amount, stats.total))
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamedAmount;
    use crate::reports::aggregate;
    use chrono::NaiveDate;

    fn stats_with(total: i64, credit_usage: f64, top: Option<(&str, i64)>) -> StatsSummary {
        let top_categories: Vec<NamedAmount> = top
            .map(|(name, amount)| NamedAmount {
                name: name.to_string(),
                amount,
            })
            .into_iter()
            .collect();
        StatsSummary {
            total,
            credit_usage,
            by_category: top_categories.clone(),
            top_categories,
            ..Default::default()
        }
    }

    fn recurring(id: i64, amount: i64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Transaction::new(id, date, "Café", amount).with_tags(["Gasto Recurrente"])
    }

    #[test]
    fn test_no_alerts_for_empty_input() {
        assert!(compute_alerts(&[], &aggregate(&[])).is_empty());
    }

    #[test]
    fn test_credit_overuse_formats_one_decimal() {
        let alerts = compute_alerts(&[], &stats_with(0, 85.0, None));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].icon, "💳");
        assert!(alerts[0].message.contains("85.0"));
    }

    #[test]
    fn test_credit_threshold_is_exclusive() {
        assert!(compute_alerts(&[], &stats_with(0, 80.0, None)).is_empty());
        assert_eq!(compute_alerts(&[], &stats_with(0, 80.04, None)).len(), 1);
    }

    #[test]
    fn test_category_imbalance_message() {
        let alerts = compute_alerts(&[], &stats_with(1000, 0.0, Some(("Alimentación", 500))));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(
            alerts[0].message,
            "Alimentación representa el 50.0% de tus gastos."
        );
    }

    #[test]
    fn test_category_imbalance_threshold_is_exclusive() {
        assert!(compute_alerts(&[], &stats_with(1000, 0.0, Some(("A", 400)))).is_empty());
        assert!(compute_alerts(&[], &stats_with(0, 0.0, Some(("A", 0)))).is_empty());
    }

    #[test]
    fn test_small_recurring_over_fifty() {
        let txs: Vec<Transaction> = (0..51).map(|i| recurring(i, 2000)).collect();
        let alerts = compute_alerts(&txs, &stats_with(0, 0.0, None));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Info);
        assert_eq!(
            alerts[0].message,
            "Tienes 51 gastos pequeños recurrentes. Estos suman $102.000"
        );
    }

    #[test]
    fn test_small_recurring_exactly_fifty_is_quiet() {
        let txs: Vec<Transaction> = (0..50).map(|i| recurring(i, 2000)).collect();
        assert!(compute_alerts(&txs, &stats_with(0, 0.0, None)).is_empty());
    }

    #[test]
    fn test_small_recurring_sum_only_counts_filtered_subset() {
        let mut txs: Vec<Transaction> = (0..51).map(|i| recurring(i, 1000)).collect();
        // Too large to count as small
        txs.push(recurring(100, 10_000));
        // Not tagged as recurring
        let date = txs[0].date;
        txs.push(Transaction::new(101, date, "Pan", 500).with_tags(["panadería"]));

        let alerts = compute_alerts(&txs, &stats_with(0, 0.0, None));
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("51 gastos"));
        assert!(alerts[0].message.ends_with("$51.000"));
    }

    #[test]
    fn test_rule_order_fixed() {
        let txs: Vec<Transaction> = (0..60).map(|i| recurring(i, 100)).collect();
        let stats = stats_with(6000, 90.0, Some(("Café", 6000)));
        let alerts = compute_alerts(&txs, &stats);
        let icons: Vec<_> = alerts.iter().map(|a| a.icon.as_str()).collect();
        assert_eq!(icons, vec!["💳", "☕", "⚠️"]);
    }

    #[test]
    fn test_severity_round_trip_strings() {
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(Severity::Info.to_string(), "info");
        assert!("alert".parse::<Severity>().is_err());
    }
}
