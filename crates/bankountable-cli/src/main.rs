//! Bankountable CLI - Spending dashboard for imported bank statements
//!
//! Usage:
//!   bankountable dashboard                 Spending overview
//!   bankountable transactions --sort date  Filterable transaction table
//!   bankountable alerts                    Spending alerts
//!   bankountable import --file cartola.pdf Upload a PDF statement

mod cli;
mod commands;


use anyhow::Result;
use bankountable_core::{Filter, FilterState, TransactionId};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let (config, backend) = commands::open_backend(cli.config.as_deref(), cli.api_url.as_deref())?;
    let locale = config.display.locale;

    match cli.command {
        Commands::Dashboard { month } => {
            let today = chrono::Local::now().date_naive();
            commands::cmd_dashboard(&backend, locale, month, today).await
        }
        Commands::Transactions {
            category,
            payment,
            month,
            search,
            sort,
            limit,
        } => {
            let mut filters = FilterState::new()
                .category(Filter::from(category))
                .payment_method(Filter::from(payment))
                .month(Filter::from(month))
                .search(search.unwrap_or_default());
            for field in sort {
                filters = filters.sort_by(field);
            }
            commands::cmd_transactions_list(&backend, &filters, limit).await
        }
        Commands::Alerts => commands::cmd_alerts(&backend).await,
        Commands::Months { asc } => commands::cmd_months(&backend, locale, asc).await,
        Commands::Categories => commands::cmd_categories(&backend).await,
        Commands::Tags => commands::cmd_tags(&backend).await,
        Commands::Edit {
            id,
            category,
            payment,
            description,
        } => {
            let edits = commands::EditArgs {
                category,
                payment,
                description,
            };
            commands::cmd_edit(&backend, &TransactionId::new(id), edits).await
        }
        Commands::Delete { id } => commands::cmd_delete(&backend, &TransactionId::new(id)).await,
        Commands::Import { file } => commands::cmd_import(&backend, &file).await,
        Commands::Imports => commands::cmd_imports(&backend).await,
    }
}
