//! Display formatting for amounts, percentages and dates
//!
//! Amounts are whole Chilean pesos, rendered with `.` as the thousands
//! separator and no decimals.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Lowercase abbreviations used in row dates (date-fns `es` style, hence
/// `sept`). Month selectors use the capitalized labels in `locale`.
const DATE_MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// Format an amount as CLP (`$1.234.567`)
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Round to one decimal place, halves away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Format a percentage value with one decimal (`85.0`), without the `%` sign
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0.0".to_string();
    }
    format!("{:.1}", round1(value))
}

/// `05 ene 2024`
pub fn format_date(date: &NaiveDateTime) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        DATE_MONTHS[date.month0() as usize],
        date.year()
    )
}

/// `05 ene 2024, 14:30`
pub fn format_date_time(date: &NaiveDateTime) -> String {
    format!(
        "{}, {:02}:{:02}",
        format_date(date),
        date.hour(),
        date.minute()
    )
}
