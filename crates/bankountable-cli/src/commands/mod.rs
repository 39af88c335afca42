//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared setup (config, backend client)
//! - `import` - PDF statement upload and import history
//! - `status` - Dashboard, alerts and month listing
//! - `tags` - Category and tag listings
//! - `transactions` - Transaction table, edits and deletes

pub mod core;
pub mod import;
pub mod status;
pub mod tags;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use status::*;
pub use tags::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
