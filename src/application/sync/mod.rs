//! Batch sync services: upsert, delete, recrawl, and the full-pass runner.

pub mod delete;
pub mod recrawl;
pub mod runner;
pub mod upsert;

pub use delete::DeleteSyncService;
pub use recrawl::RecrawlSyncService;
pub use runner::SyncRunner;
pub use upsert::UpsertSyncService;

use std::time::Duration;

/// Why a sync run was skipped without doing any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Product update syncing is disabled for the store.
    SyncDisabled,
}

/// What a sync run did. A skip is an expected outcome, not an error.
#[derive(Debug)]
pub enum SyncOutcome {
    Completed(SyncReport),
    Skipped(SkipReason),
}

impl SyncOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Skipped(_) => None,
        }
    }
}

/// Page-level accounting of one completed run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Pages attempted, failed ones included.
    pub pages_total: u32,
    /// Pages whose batch call failed or could not be built; their records
    /// stay dirty and the next scheduled pass retries them.
    pub pages_failed: u32,
    /// Items confirmed by the external API.
    pub items_synced: u64,
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn merge(&mut self, other: &SyncReport) {
        self.pages_total += other.pages_total;
        self.pages_failed += other.pages_failed;
        self.items_synced += other.items_synced;
        self.elapsed += other.elapsed;
    }
}
