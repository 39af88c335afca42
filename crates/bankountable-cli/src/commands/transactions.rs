//! Transaction command implementations

use anyhow::{bail, Context, Result};
use bankountable_core::format::{format_currency, format_date};
use bankountable_core::{
    resolve_category_id, DataSource, EditOverlay, EditSession, FieldEdit, FilterState,
    PaymentMethod, Transaction, TransactionId, TransactionStore, TransactionUpdate,
};

use super::{fetch_transactions, truncate};

/// Field changes requested by `bankountable edit`
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub category: Option<String>,
    pub payment: Option<PaymentMethod>,
    pub description: Option<String>,
}

pub async fn cmd_transactions_list(
    source: &dyn DataSource,
    filters: &FilterState,
    limit: Option<usize>,
) -> Result<()> {
    let session = EditSession::new(fetch_transactions(source).await?);

    if session.transactions().is_empty() {
        println!("No transactions found. Import a statement with:");
        println!("  bankountable import --file cartola.pdf");
        return Ok(());
    }

    let rows = session.visible(filters);
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    println!();
    println!(
        "📝 Transactions ({} of {})",
        rows.len(),
        session.transactions().len()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No transactions match the current filters.");
        return Ok(());
    }

    for tx in rows.iter().take(shown) {
        print_row(tx, session.overlay());
    }

    if shown < rows.len() {
        println!();
        println!("   ... {} more (use --limit to show more)", rows.len() - shown);
    }

    Ok(())
}

fn print_row(tx: &Transaction, overlay: &EditOverlay) {
    let tags = overlay.tags(tx);
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    };
    println!(
        "   [{:>5}] {} │ {:>12} │ {:<30} │ {:<16} │ {}{}",
        tx.id.as_str(),
        format_date(&tx.date),
        format_currency(tx.amount),
        truncate(overlay.description(tx), 30),
        truncate(overlay.category(tx), 16),
        overlay.payment_method(tx).label(),
        tags
    );
}

/// Update a transaction on the backend, then show the confirmed row
pub async fn cmd_edit(store: &dyn TransactionStore, id: &TransactionId, edits: EditArgs) -> Result<()> {
    let mut session = EditSession::new(fetch_transactions(store).await?);
    if session.get(id).is_none() {
        bail!("Transaction {} not found", id);
    }

    let mut update = TransactionUpdate::new();
    let mut confirmed: Vec<FieldEdit> = Vec::new();

    if let Some(name) = edits.category {
        let categories = store
            .categories()
            .await
            .context("Failed to fetch categories")?;
        let Some(category_id) = resolve_category_id(&categories, &name) else {
            let known: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
            bail!("Unknown category '{}'. Available: {}", name, known.join(", "));
        };
        update = update.category(category_id);
        confirmed.push(FieldEdit::Category { name, category_id });
    }

    if let Some(method) = edits.payment {
        if !matches!(method, PaymentMethod::Credit | PaymentMethod::Debit) {
            bail!("Payment method must be credit or debit, got '{}'", method);
        }
        update = update.payment_method(&method);
        confirmed.push(FieldEdit::PaymentMethod(method));
    }

    if let Some(text) = edits.description {
        update = update.description(text.clone());
        confirmed.push(FieldEdit::Description(text));
    }

    if update.is_empty() {
        bail!("Nothing to change. Pass --category, --payment or --description.");
    }

    store
        .update_transaction(id, &update)
        .await
        .with_context(|| format!("Failed to update transaction {}", id))?;

    for edit in confirmed {
        session.confirm(id, edit)?;
    }

    println!("✅ Updated transaction {}", id);
    if let Some(tx) = session.get(id) {
        print_row(tx, session.overlay());
    }

    Ok(())
}

pub async fn cmd_delete(store: &dyn TransactionStore, id: &TransactionId) -> Result<()> {
    store
        .delete_transaction(id)
        .await
        .with_context(|| format!("Failed to delete transaction {}", id))?;
    println!("🗑️  Deleted transaction {}", id);
    Ok(())
}
