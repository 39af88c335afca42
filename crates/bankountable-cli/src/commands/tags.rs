//! Category and tag listings

use std::collections::HashMap;

use anyhow::{Context, Result};
use bankountable_core::records::known_tags;
use bankountable_core::DataSource;

use super::fetch_transactions;

pub async fn cmd_categories(source: &dyn DataSource) -> Result<()> {
    let categories = source
        .categories()
        .await
        .context("Failed to fetch categories")?;

    if categories.is_empty() {
        println!("No categories defined.");
        return Ok(());
    }

    println!();
    println!("🗂️  Categories");
    println!("   ─────────────────────────────");

    for category in categories {
        match &category.description {
            Some(description) => println!(
                "   [{:>3}] {} - {}",
                category.id, category.name, description
            ),
            None => println!("   [{:>3}] {}", category.id, category.name),
        }
    }

    Ok(())
}

pub async fn cmd_tags(source: &dyn DataSource) -> Result<()> {
    let tags = source.tags().await.context("Failed to fetch tags")?;
    let transactions = fetch_transactions(source).await?;

    let mut usage: HashMap<&str, usize> = HashMap::new();
    for tx in &transactions {
        for tag in &tx.tags {
            *usage.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    // Backend tags first, then tags only seen on transactions
    let mut names: Vec<String> = tags.into_iter().map(|t| t.name).collect();
    for tag in known_tags(&transactions) {
        if !names.contains(&tag) {
            names.push(tag);
        }
    }

    if names.is_empty() {
        println!("No tags yet.");
        return Ok(());
    }

    println!();
    println!("🏷️  Tags");
    println!("   ─────────────────────────────");

    for name in &names {
        let count = usage.get(name.as_str()).copied().unwrap_or(0);
        println!("   {:<24} {:>5} tx", name, count);
    }

    Ok(())
}
