//! Configuration for the sync coordinator.

use std::time::Duration;

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Page size used by [`SyncCoordinator::page`](crate::SyncCoordinator::page).
    pub default_page_size: usize,
    /// Number of pending entries replayed per reconcile batch.
    pub reconcile_batch_size: usize,
    /// Pause between reconcile batches.
    pub reconcile_batch_delay: Duration,
    /// Whether opening a session reconciles pending entries.
    pub reconcile_on_open: bool,
}

impl SyncConfig {
    /// Creates a new sync configuration with default values.
    pub fn new() -> Self {
        Self {
            default_page_size: 10,
            reconcile_batch_size: 10,
            reconcile_batch_delay: Duration::from_millis(50),
            reconcile_on_open: false,
        }
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Sets the reconcile batch size. Zero is treated as one.
    pub fn with_reconcile_batch_size(mut self, size: usize) -> Self {
        self.reconcile_batch_size = size;
        self
    }

    /// Sets the pause between reconcile batches.
    pub fn with_reconcile_batch_delay(mut self, delay: Duration) -> Self {
        self.reconcile_batch_delay = delay;
        self
    }

    /// Enables or disables reconciliation when a session opens.
    pub fn with_reconcile_on_open(mut self, enabled: bool) -> Self {
        self.reconcile_on_open = enabled;
        self
    }

    pub(crate) fn batch_size(&self) -> usize {
        self.reconcile_batch_size.max(1)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
