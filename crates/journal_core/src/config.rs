//! Cache configuration.

/// Default key prefix for cached entries.
pub const DEFAULT_KEY_PREFIX: &str = "journal:entry:";

/// Configuration for opening a [`crate::LocalCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Prefix of every medium key holding an entry.
    pub key_prefix: String,

    /// Maximum number of confirmed entries kept after a write (`None` = unbounded).
    ///
    /// Pending entries are never evicted and do not count towards the limit.
    pub max_confirmed: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            max_confirmed: None,
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key prefix.
    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Bounds the number of confirmed entries kept in the cache.
    #[must_use]
    pub fn max_confirmed(mut self, limit: usize) -> Self {
        self.max_confirmed = Some(limit);
        self
    }
}
