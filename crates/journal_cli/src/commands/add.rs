//! Add command implementation.

use crate::session::{open_session, RemoteArgs};
use journal_core::NewEntry;
use journal_sync::SyncConfig;
use std::path::Path;

/// Runs the add command.
pub fn run(
    path: &Path,
    remote: &RemoteArgs,
    content: String,
    prompt: String,
    tags: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(path, remote, SyncConfig::default())?;
    let new = NewEntry::new(content).with_prompt(prompt).with_tags(tags);
    let entry = session.create(new)?;

    if entry.pending {
        println!("Saved offline as {} (run `journal sync` later)", entry.id);
    } else {
        println!("Created {}", entry.id);
    }
    session.close()?;
    Ok(())
}
