use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Snapshot, SnapshotPayload};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Result of a conditional append.
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Appended(Snapshot),
    /// The latest snapshot moved underneath the caller; nothing was written.
    Conflict,
}

/// Append-only snapshot history, one timeline per tracker id.
///
/// The append is conditional on the latest snapshot id the caller observed
/// (`None` = caller saw an empty history). That makes read-decide-append
/// safe under concurrent runs for the same tracker: the loser of the race
/// gets `Conflict` instead of writing a duplicate.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get_latest(&self, tracker_id: &str) -> Result<Option<Snapshot>>;

    async fn append_if_latest_unchanged(
        &self,
        tracker_id: &str,
        expected_prior: Option<i64>,
        payload: SnapshotPayload,
    ) -> Result<AppendOutcome>;
}
