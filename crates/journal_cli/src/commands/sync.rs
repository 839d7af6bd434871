//! Sync command implementation.

use crate::session::{open_session, RemoteArgs};
use journal_sync::SyncConfig;
use std::path::Path;

/// Runs the sync command.
pub fn run(
    path: &Path,
    remote: &RemoteArgs,
    batch_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if remote.principal().is_none() {
        return Err("sync requires --server, --user and --token".into());
    }

    let config = SyncConfig::new().with_reconcile_batch_size(batch_size);
    let session = open_session(path, remote, config)?;
    let pending = session.pending_count();
    if pending == 0 {
        println!("Nothing to sync");
        return Ok(());
    }

    println!("Reconciling {pending} pending entries...");
    let report = session.reconcile()?;

    for done in &report.confirmed {
        println!("  ✓ {} -> {}", done.local_id, done.server_id);
    }
    for failure in &report.failed {
        println!("  ✗ {}: {}", failure.id, failure.error);
    }
    println!();
    println!(
        "{} of {} confirmed in {:?}",
        report.confirmed.len(),
        report.attempted,
        report.duration
    );

    session.close()?;
    if report.is_complete() {
        Ok(())
    } else {
        Err(format!("{} entries still pending", report.failed.len()).into())
    }
}
