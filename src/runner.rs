use std::sync::Arc;

use crate::classify::{classify, validate, Alert};
use crate::error::{EngineError, Result};
use crate::extract::extract;
use crate::fetch::PageFetcher;
use crate::models::TrackerConfig;
use crate::notify::Notifier;
use crate::store::{AppendOutcome, SnapshotStore};

/// What a single tracker run produced. `Failed` covers fetch and extraction
/// problems; a lost append race is reported as `NoChange` because another
/// run already recorded the same state.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    NoChange,
    Changed { snapshot_id: i64 },
    Failed { reason: String },
}

/// Executes the fetch -> extract -> classify -> persist -> notify pipeline
/// for one tracker at a time. Holds the shared infrastructure; tracker
/// definitions are passed per run so one runner serves the whole set.
pub struct TrackerRunner {
    fetcher: PageFetcher,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    alert_channel: String,
    error_channel: String,
}

impl TrackerRunner {
    pub fn new(
        fetcher: PageFetcher,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
        alert_channel: String,
        error_channel: String,
    ) -> Self {
        Self {
            fetcher,
            store,
            notifier,
            alert_channel,
            error_channel,
        }
    }

    /// Run one tracker once. Never propagates an error: failures become
    /// `RunOutcome::Failed` so one broken tracker cannot take down a tick.
    pub async fn run(&self, tracker: &TrackerConfig) -> RunOutcome {
        match self.try_run(tracker).await {
            Ok(outcome) => outcome,
            Err(EngineError::StoreConflict) => {
                tracing::warn!(
                    tracker = %tracker.name,
                    "lost append race, another run recorded this state"
                );
                RunOutcome::NoChange
            }
            Err(err) => {
                tracing::error!(tracker = %tracker.name, error = %err, "tracker run failed");
                if matches!(err, EngineError::Fetch { .. }) {
                    self.report_error(tracker, &err).await;
                }
                RunOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn try_run(&self, tracker: &TrackerConfig) -> Result<RunOutcome> {
        let html = self
            .fetcher
            .source_for(tracker.method)
            .fetch(&tracker.url)
            .await?;

        let extraction = extract(
            &html,
            &tracker.selector_sets,
            tracker.tracker_type.requested_fields(),
            tracker.tracker_type.required_fields(),
        )?;
        validate(tracker, &extraction)?;

        let latest = self.store.get_latest(&tracker.id).await?;
        let Some(decision) = classify(tracker, &self.alert_channel, &extraction, latest.as_ref())
        else {
            tracing::debug!(tracker = %tracker.name, "no change");
            return Ok(RunOutcome::NoChange);
        };

        let expected_prior = latest.as_ref().map(|s| s.id);
        let snapshot = match self
            .store
            .append_if_latest_unchanged(&tracker.id, expected_prior, decision.payload)
            .await?
        {
            AppendOutcome::Appended(snapshot) => snapshot,
            AppendOutcome::Conflict => return Err(EngineError::StoreConflict),
        };

        tracing::info!(
            tracker = %tracker.name,
            snapshot_id = snapshot.id,
            "change recorded"
        );

        // Persist first, notify second: a missed alert is recoverable from
        // history, a phantom alert is not.
        if let Some(alert) = decision.alert {
            if let Err(err) = self.notifier.notify(&alert).await {
                tracing::warn!(tracker = %tracker.name, error = %err, "alert delivery failed");
            }
        }

        Ok(RunOutcome::Changed {
            snapshot_id: snapshot.id,
        })
    }

    /// Best effort: an unreachable page is worth a heads-up in the error
    /// channel, but failing to say so must not mask the original failure.
    async fn report_error(&self, tracker: &TrackerConfig, err: &EngineError) {
        let alert = Alert {
            title: "ERROR!".to_string(),
            body: format!("{} tracker failed: {err}", tracker.name),
            channel: self.error_channel.clone(),
        };
        if let Err(notify_err) = self.notifier.notify(&alert).await {
            tracing::warn!(error = %notify_err, "error report delivery failed");
        }
    }
}
