//! Dashboard, alerts and month listing

use anyhow::Result;
use bankountable_core::format::{format_currency, format_percent};
use bankountable_core::models::{share, NamedAmount};
use bankountable_core::{
    aggregate, bucket_by_month, compute_alerts, default_month, month_summary, DataSource, Locale,
    MonthKey, MonthOrder, Severity,
};
use chrono::NaiveDate;

use super::{fetch_transactions, truncate};

pub async fn cmd_dashboard(
    source: &dyn DataSource,
    locale: Locale,
    month: Option<MonthKey>,
    today: NaiveDate,
) -> Result<()> {
    let transactions = fetch_transactions(source).await?;

    if transactions.is_empty() {
        println!("No transactions found. Import a statement with:");
        println!("  bankountable import --file cartola.pdf");
        return Ok(());
    }

    let stats = aggregate(&transactions);
    let months = locale.months();

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│        💰 Bankountable Dashboard        │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Total spent:     {}", format_currency(stats.total));
    println!("  Transactions:    {}", stats.total_transactions);
    println!(
        "  💳 Credit:       {} ({}%)",
        format_currency(stats.by_payment_method.credit),
        format_percent(stats.credit_usage)
    );
    println!(
        "  🏦 Debit:        {}",
        format_currency(stats.by_payment_method.debit)
    );
    println!();

    print_ranking("📊 Top Categories", &stats.top_categories, stats.total);
    print_ranking("🏪 Top Merchants", &stats.top_merchants, stats.total);

    let by_month = bucket_by_month(&transactions, months, MonthOrder::Ascending);
    let selected = month.or_else(|| default_month(&by_month, today));

    if let Some(key) = selected {
        let summary = month_summary(&transactions, key);
        println!("  📅 {}", months.long_label(key));
        println!("     ─────────────────────────────");
        println!("     Total:     {}", format_currency(summary.total));
        println!("     Count:     {}", summary.transaction_count);
        println!(
            "     Credit:    {} ({}%)",
            format_currency(summary.credit),
            format_percent(summary.credit_share())
        );
        println!(
            "     Debit:     {} ({}%)",
            format_currency(summary.debit),
            format_percent(summary.debit_share())
        );
        println!();
    }

    if !by_month.is_empty() {
        println!("  📈 Monthly Trend");
        println!("     ─────────────────────────────");
        let peak = by_month.iter().map(|b| b.total).max().unwrap_or(0);
        for bucket in &by_month {
            let width = if peak > 0 {
                (bucket.total as f64 / peak as f64 * 30.0).round() as usize
            } else {
                0
            };
            println!(
                "     {:>8} │ {:<30} {}",
                months.short_label(bucket.key),
                "█".repeat(width),
                format_currency(bucket.total)
            );
        }
        println!();
    }

    let alerts = compute_alerts(&transactions, &stats);
    if !alerts.is_empty() {
        println!(
            "  ⚠️  {} alert(s). Run 'bankountable alerts' to see them.",
            alerts.len()
        );
    }

    Ok(())
}

fn print_ranking(title: &str, entries: &[NamedAmount], total: i64) {
    if entries.is_empty() {
        return;
    }
    println!("  {}", title);
    println!("     ─────────────────────────────");
    for entry in entries {
        println!(
            "     {:<24} {:>14} {:>6}%",
            truncate(&entry.name, 24),
            format_currency(entry.amount),
            format_percent(share(entry.amount, total))
        );
    }
    println!();
}

pub async fn cmd_alerts(source: &dyn DataSource) -> Result<()> {
    let transactions = fetch_transactions(source).await?;
    let stats = aggregate(&transactions);
    let alerts = compute_alerts(&transactions, &stats);

    if alerts.is_empty() {
        println!("✅ No alerts. Your spending looks balanced!");
        return Ok(());
    }

    println!();
    println!("⚠️  Alerts");
    println!("   ─────────────────────────────────────────────────────────────");

    for alert in &alerts {
        let level = match alert.severity {
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[36minfo\x1b[0m",
        };
        println!("   {} [{}] {}", alert.icon, level, alert.message);
    }

    Ok(())
}

pub async fn cmd_months(source: &dyn DataSource, locale: Locale, ascending: bool) -> Result<()> {
    let transactions = fetch_transactions(source).await?;
    let order = if ascending {
        MonthOrder::Ascending
    } else {
        MonthOrder::Descending
    };
    let buckets = bucket_by_month(&transactions, locale.months(), order);

    if buckets.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!();
    println!("📅 Months");
    println!("   ─────────────────────────────────────────────");

    for bucket in buckets {
        println!(
            "   {} │ {:<20} │ {:>14} │ {} tx",
            bucket.key,
            bucket.label,
            format_currency(bucket.total),
            bucket.transaction_count
        );
    }

    Ok(())
}
