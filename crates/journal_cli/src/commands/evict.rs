//! Evict command implementation.

use crate::session::open_cache;
use std::path::Path;

/// Runs the evict command.
pub fn run(path: &Path, keep: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut cache = open_cache(path)?;
    let evicted = cache.evict_confirmed(keep)?;
    cache.close()?;

    println!("Evicted {} confirmed entries", evicted.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_testkit::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn evict_keeps_pending_entries() {
        let dir = TempDir::new().unwrap();
        let mut cache = open_cache(dir.path()).unwrap();
        for entry in scenarios::dated_entries(5) {
            cache.put(entry).unwrap();
        }
        cache.put(pending_entry(1, "draft")).unwrap();
        cache.close().unwrap();

        run(dir.path(), 2).unwrap();

        let cache = open_cache(dir.path()).unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.pending_count(), 1);
        let kept: Vec<_> = cache
            .list_all()
            .filter(|e| !e.pending)
            .map(|e| e.content.clone())
            .collect();
        assert_eq!(kept, vec!["entry 5", "entry 4"]);
    }
}
