//! Statement import command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use bankountable_core::format::format_date_time;
use bankountable_core::HttpBackend;

pub async fn cmd_import(backend: &HttpBackend, file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("File not found: {}", file.display());
    }

    println!("📥 Uploading {} to {}...", file.display(), backend.base_url());

    let outcome = backend
        .import_pdf(file)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!("✅ {}", outcome.message);
    println!("   Transactions imported: {}", outcome.transactions_imported);
    println!();
    println!("Next steps:");
    println!("  bankountable dashboard");

    Ok(())
}

pub async fn cmd_imports(backend: &HttpBackend) -> Result<()> {
    let imports = backend
        .list_imports()
        .await
        .context("Failed to fetch import history")?;

    if imports.is_empty() {
        println!("No statements imported yet. Upload one with:");
        println!("  bankountable import --file cartola.pdf");
        return Ok(());
    }

    println!();
    println!("📚 Import History");
    println!("   ─────────────────────────────────────────────────────────────");

    for record in imports {
        let when = record
            .imported_at
            .as_ref()
            .map(format_date_time)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   [{:>3}] {} │ {:<30} │ {:<10} │ {} tx",
            record.id, when, record.filename, record.status, record.transactions_count
        );
        if let Some(error) = &record.error_message {
            println!("         ❌ {}", error);
        }
    }

    Ok(())
}
