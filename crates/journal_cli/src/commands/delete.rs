//! Delete command implementation.

use crate::session::{open_session, RemoteArgs};
use journal_core::EntryId;
use journal_sync::SyncConfig;
use std::path::Path;

/// Runs the delete command.
pub fn run(path: &Path, remote: &RemoteArgs, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id: EntryId = id.parse()?;
    let session = open_session(path, remote, SyncConfig::default())?;
    session.delete(&id)?;
    println!("Deleted {id}");
    session.close()?;
    Ok(())
}
