//! Verify command implementation.

use crate::session::open_cache;
use journal_core::LocalCache;
use journal_storage::StorageMedium;
use std::path::Path;

/// Verification result.
#[derive(Debug)]
pub struct VerifyResult {
    /// Number of records that loaded.
    pub valid_records: usize,
    /// Keys of records that failed to load.
    pub corrupt_keys: Vec<String>,
    /// Number of corrupt records deleted.
    pub repaired: usize,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.corrupt_keys.len() == self.repaired
    }
}

/// Checks an open cache, deleting corrupt records when `repair` is set.
pub fn verify_cache<M: StorageMedium>(
    cache: &mut LocalCache<M>,
    repair: bool,
) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let corrupt_keys = cache.corrupt_keys().to_vec();
    let repaired = if repair { cache.purge_corrupt()? } else { 0 };
    Ok(VerifyResult {
        valid_records: cache.len(),
        corrupt_keys,
        repaired,
    })
}

/// Runs the verify command.
pub fn run(path: &Path, repair: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying cache at {:?}", path);
    println!();

    let mut cache = open_cache(path)?;
    let result = verify_cache(&mut cache, repair)?;
    cache.close()?;

    println!("  Valid records:   {}", result.valid_records);
    println!("  Corrupt records: {}", result.corrupt_keys.len());
    for key in &result.corrupt_keys {
        println!("    - {key}");
    }
    if result.repaired > 0 {
        println!("  Repaired:        {}", result.repaired);
    }
    println!();

    if result.is_ok() {
        println!("✓ Cache is healthy");
        Ok(())
    } else {
        println!("✗ Cache has corrupt records (rerun with --repair)");
        Err("verification failed".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::CacheConfig;
    use journal_storage::InMemoryMedium;
    use journal_testkit::prelude::*;

    fn corrupted_cache() -> LocalCache<InMemoryMedium> {
        let mut cache = scenarios::populated_cache(3);
        cache.put(pending_entry(7, "still here")).unwrap();
        let mut medium = cache.close().unwrap();
        medium.set("journal:entry:srv-9999", "{not json").unwrap();
        LocalCache::open(medium, CacheConfig::default()).unwrap()
    }

    #[test]
    fn verify_reports_corrupt_records() {
        let mut cache = corrupted_cache();
        let result = verify_cache(&mut cache, false).unwrap();

        assert_eq!(result.valid_records, 4);
        assert_eq!(result.corrupt_keys, vec!["journal:entry:srv-9999".to_string()]);
        assert_eq!(result.repaired, 0);
        assert!(!result.is_ok());
    }

    #[test]
    fn repair_removes_corrupt_records() {
        let mut cache = corrupted_cache();
        let result = verify_cache(&mut cache, true).unwrap();
        assert!(result.is_ok());

        let medium = cache.close().unwrap();
        let reopened = LocalCache::open(medium, CacheConfig::default()).unwrap();
        assert!(reopened.corrupt_keys().is_empty());
        assert_eq!(reopened.pending_count(), 1);
    }
}
