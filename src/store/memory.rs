use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{Snapshot, SnapshotPayload};
use crate::store::{AppendOutcome, SnapshotStore};

/// In-memory snapshot history. The single mutex makes the check-then-append
/// atomic, which is what gives the conditional append its guarantee here.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    timelines: HashMap<String, Vec<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots recorded for a tracker (test/diagnostic helper).
    pub async fn history_len(&self, tracker_id: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.timelines.get(tracker_id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get_latest(&self, tracker_id: &str) -> Result<Option<Snapshot>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .timelines
            .get(tracker_id)
            .and_then(|timeline| timeline.last())
            .cloned())
    }

    async fn append_if_latest_unchanged(
        &self,
        tracker_id: &str,
        expected_prior: Option<i64>,
        payload: SnapshotPayload,
    ) -> Result<AppendOutcome> {
        let mut inner = self.inner.lock().await;

        let latest_id = inner
            .timelines
            .get(tracker_id)
            .and_then(|timeline| timeline.last())
            .map(|snapshot| snapshot.id);
        if latest_id != expected_prior {
            return Ok(AppendOutcome::Conflict);
        }

        inner.next_id += 1;
        let snapshot = Snapshot {
            id: inner.next_id,
            tracker_id: tracker_id.to_string(),
            payload,
            created_at: Utc::now(),
        };
        inner
            .timelines
            .entry(tracker_id.to_string())
            .or_default()
            .push(snapshot.clone());

        Ok(AppendOutcome::Appended(snapshot))
    }
}
