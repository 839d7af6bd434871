//! Pending command implementation.

use super::entry_line;
use crate::session::open_cache;
use std::path::Path;

/// Runs the pending command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let cache = open_cache(path)?;
    let pending = cache.find_pending();

    if pending.is_empty() {
        println!("No pending entries");
        return Ok(());
    }

    println!("{} pending entries:", pending.len());
    for entry in &pending {
        println!("{}", entry_line(entry));
    }
    Ok(())
}
