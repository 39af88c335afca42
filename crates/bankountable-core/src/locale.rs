//! Month naming for labels and chart ticks
//!
//! Month buckets carry a human-readable label. The engine never hardcodes a
//! language: callers pass a [`MonthLocale`], and [`Locale`] picks one of the
//! built-in implementations from configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::MonthKey;

/// Renders month names for a given language
pub trait MonthLocale: Send + Sync {
    /// Full month name for a 1-based month
    fn month_name(&self, month: u32) -> &'static str;

    /// Abbreviated month name for a 1-based month
    fn short_month_name(&self, month: u32) -> &'static str;

    /// Label for selectors and headings ("enero de 2024")
    fn long_label(&self, key: MonthKey) -> String;

    /// Label for chart axes ("Ene 2024")
    fn short_label(&self, key: MonthKey) -> String {
        format!("{} {}", self.short_month_name(key.month), key.year)
    }
}

const ES_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const ES_SHORT_MONTHS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const EN_SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn pick(names: &'static [&'static str; 12], month: u32) -> &'static str {
    names[(month.clamp(1, 12) - 1) as usize]
}

/// Spanish (Chile)
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanishChile;

impl MonthLocale for SpanishChile {
    fn month_name(&self, month: u32) -> &'static str {
        pick(&ES_MONTHS, month)
    }

    fn short_month_name(&self, month: u32) -> &'static str {
        pick(&ES_SHORT_MONTHS, month)
    }

    fn long_label(&self, key: MonthKey) -> String {
        format!("{} de {}", self.month_name(key.month), key.year)
    }
}

/// English
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl MonthLocale for English {
    fn month_name(&self, month: u32) -> &'static str {
        pick(&EN_MONTHS, month)
    }

    fn short_month_name(&self, month: u32) -> &'static str {
        pick(&EN_SHORT_MONTHS, month)
    }

    fn long_label(&self, key: MonthKey) -> String {
        format!("{} {}", self.month_name(key.month), key.year)
    }
}

/// Built-in locales selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "es-CL")]
    EsCl,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EsCl => "es-CL",
            Self::En => "en",
        }
    }

    /// The month renderer for this locale
    pub fn months(&self) -> &'static dyn MonthLocale {
        match self {
            Self::EsCl => &SpanishChile,
            Self::En => &English,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es-cl" | "es" => Ok(Self::EsCl),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            _ => Err(format!("Unknown locale: {} (valid: es-CL, en)", s)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
