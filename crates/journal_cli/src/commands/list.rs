//! List command implementation.

use super::entry_line;
use crate::session::{open_session, RemoteArgs};
use journal_core::{Page, PageSource};
use journal_sync::SyncConfig;
use std::path::Path;

/// Runs the list command.
pub fn run(
    path: &Path,
    remote: &RemoteArgs,
    page_index: usize,
    page_size: usize,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(path, remote, SyncConfig::default())?;
    let page = session.get_page(page_index, page_size)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&page)?),
        _ => print_page(&page),
    }
    Ok(())
}

fn print_page(page: &Page) {
    let source = match page.source {
        PageSource::Remote => "server",
        PageSource::Cache => "cache",
    };
    println!(
        "Page {} of {} ({} entries, from {source})",
        page.page_index + 1,
        page.page_count().max(1),
        page.total_count,
    );
    println!();
    for entry in &page.entries {
        println!("{}", entry_line(entry));
    }
    if page.has_next() {
        println!();
        println!("More: --page {}", page.page_index + 1);
    }
}
