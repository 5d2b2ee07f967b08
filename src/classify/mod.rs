use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::extract::ExtractionResult;
use crate::models::{FieldKind, Snapshot, SnapshotPayload, TrackerConfig, TrackerType};

mod content;
mod new_item;
mod price;

pub use content::line_diff;
pub use price::parse_price;

/// A rendered notification request. Transient: never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
    pub channel: String,
}

/// The classifier's verdict when a reportable change exists: the snapshot
/// payload to persist and, when the change is alert-worthy, the alert to
/// send after persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDecision {
    pub payload: SnapshotPayload,
    pub alert: Option<Alert>,
}

/// Check type-specific field syntax up front, so `classify` only ever sees
/// data it can interpret. A resolved price selector pointing at text with no
/// digits ("Call for price") is a run failure, not a quiet no-change: an
/// availability transition hiding behind it must not be dropped unseen.
pub fn validate(tracker: &TrackerConfig, extraction: &ExtractionResult) -> Result<()> {
    if tracker.tracker_type == TrackerType::PriceAvailability {
        if let Some(raw) = extraction.get(FieldKind::Price) {
            if price::parse_price(raw).is_none() {
                return Err(EngineError::PriceParse {
                    raw: raw.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Decide whether the new extraction constitutes a reportable change against
/// the latest snapshot (`None` = first run). Pure computation over data that
/// passed `validate`: this never fails and has no side effects.
pub fn classify(
    tracker: &TrackerConfig,
    alert_channel: &str,
    extraction: &ExtractionResult,
    latest: Option<&Snapshot>,
) -> Option<ChangeDecision> {
    match tracker.tracker_type {
        TrackerType::NewItem => new_item::classify(tracker, alert_channel, extraction, latest),
        TrackerType::PriceAvailability => {
            price::classify(tracker, alert_channel, extraction, latest)
        }
        TrackerType::ContentDiff => content::classify(tracker, alert_channel, extraction, latest),
    }
}
