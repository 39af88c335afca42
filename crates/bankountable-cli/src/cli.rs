//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use bankountable_core::{MonthKey, PaymentMethod, SortField};
use clap::{Parser, Subcommand};

/// Bankountable - See where your money goes
#[derive(Parser)]
#[command(name = "bankountable")]
#[command(about = "Spending dashboard for imported bank statements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Statements backend URL (overrides config and BANKOUNTABLE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (defaults to ~/.config/bankountable/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show spending overview and the selected month
    Dashboard {
        /// Month to summarize (YYYY-MM, defaults to last month)
        #[arg(short, long)]
        month: Option<MonthKey>,
    },

    /// List transactions with filters and sorting
    Transactions {
        /// Only this category (exact name)
        #[arg(short, long)]
        category: Option<String>,

        /// Only this payment method (credit, debit, ...)
        #[arg(short, long)]
        payment: Option<PaymentMethod>,

        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<MonthKey>,

        /// Search description or merchant (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Sort column: date, description, amount, category, payment.
        /// Repeat the same column to flip the direction.
        #[arg(long)]
        sort: Vec<SortField>,

        /// Maximum rows to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show spending alerts
    Alerts,

    /// List months with spending
    Months {
        /// Oldest first
        #[arg(long)]
        asc: bool,
    },

    /// List categories
    Categories,

    /// List tags and how often they are used
    Tags,

    /// Edit a transaction's category, payment method or description
    Edit {
        /// Transaction ID
        id: String,

        /// New category name ("Sin categoría" clears it)
        #[arg(short, long)]
        category: Option<String>,

        /// New payment method (credit or debit)
        #[arg(short, long)]
        payment: Option<PaymentMethod>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Upload a PDF bank statement
    Import {
        /// PDF statement to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show statement import history
    Imports,
}
