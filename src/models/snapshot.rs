use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// State captured by the last reportable change, discriminated by tracker
/// type. Stored as JSON in the durable store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotPayload {
    NewItem {
        item_desc: String,
        item_url: String,
    },
    PriceAvailability {
        price: Decimal,
        available: bool,
    },
    Content {
        content: String,
        diff: String,
    },
}

/// One append-only history record for a tracker. The id is assigned by the
/// store and is strictly increasing per tracker, so "latest" is always the
/// highest id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub id: i64,
    pub tracker_id: String,
    pub payload: SnapshotPayload,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn item_url(&self) -> Option<&str> {
        match &self.payload {
            SnapshotPayload::NewItem { item_url, .. } => Some(item_url),
            _ => None,
        }
    }

    pub fn price_availability(&self) -> Option<(Decimal, bool)> {
        match &self.payload {
            SnapshotPayload::PriceAvailability { price, available } => Some((*price, *available)),
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.payload {
            SnapshotPayload::Content { content, .. } => Some(content),
            _ => None,
        }
    }
}
