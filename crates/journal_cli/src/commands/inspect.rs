//! Inspect command implementation.

use crate::session::open_cache;
use journal_core::LocalCache;
use journal_storage::StorageMedium;
use serde::Serialize;
use std::path::Path;

/// Cache inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Cache path.
    pub path: String,
    /// Number of cached entries.
    pub entry_count: usize,
    /// Number of confirmed entries.
    pub confirmed_count: usize,
    /// Number of pending entries.
    pub pending_count: usize,
    /// Number of records that failed to load.
    pub corrupt_count: usize,
    /// Creation time of the oldest pending entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_pending: Option<String>,
    /// Creation time of the newest entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_entry: Option<String>,
}

impl InspectResult {
    /// Summarizes an open cache.
    pub fn from_cache<M: StorageMedium>(path: &Path, cache: &LocalCache<M>) -> Self {
        let pending = cache.find_pending();
        Self {
            path: path.display().to_string(),
            entry_count: cache.len(),
            confirmed_count: cache.len() - pending.len(),
            pending_count: pending.len(),
            corrupt_count: cache.corrupt_keys().len(),
            oldest_pending: pending.last().map(|e| e.created_at.to_rfc3339()),
            newest_entry: cache.list_all().next().map(|e| e.created_at.to_rfc3339()),
        }
    }
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No cache found at {:?}", path).into());
    }

    let cache = open_cache(path)?;
    let result = InspectResult::from_cache(path, &cache);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => print_text(&result),
    }

    Ok(())
}

fn print_text(result: &InspectResult) {
    println!("Journal Cache: {}", result.path);
    println!();
    println!("Entries:");
    println!("  Total:     {}", result.entry_count);
    println!("  Confirmed: {}", result.confirmed_count);
    println!("  Pending:   {}", result.pending_count);
    if result.corrupt_count > 0 {
        println!("  Corrupt:   {} (run `journal verify --repair`)", result.corrupt_count);
    }
    if let Some(newest) = &result.newest_entry {
        println!();
        println!("Newest entry:   {newest}");
    }
    if let Some(oldest) = &result.oldest_pending {
        println!("Oldest pending: {oldest}");
    }
}
