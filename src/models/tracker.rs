use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EngineError, Result};
use crate::models::{generate_id, FetchMethod, FieldKind, TrackerType};

/// One fallback step in a tracker's extraction chain: a mapping from field
/// kind to CSS selector. An empty selector means "not applicable in this set".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectorSet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub available: String,
    #[serde(default)]
    pub content: String,
}

impl SelectorSet {
    pub fn selector_for(&self, field: FieldKind) -> &str {
        match field {
            FieldKind::Title => &self.title,
            FieldKind::Link => &self.link,
            FieldKind::Location => &self.location,
            FieldKind::Price => &self.price,
            FieldKind::Available => &self.available,
            FieldKind::Content => &self.content,
        }
    }
}

/// A configured watch over one page: what to fetch, how to extract it, and
/// which change rules apply. The id doubles as the snapshot-history key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "generate_id")]
    pub id: String,
    pub name: String,
    pub site_name: String,
    /// Base URL used to absolutize relative item links.
    pub site_url: String,
    /// Page the tracker fetches each run.
    pub url: String,
    /// Substring filter applied to extracted titles (NEW_ITEM only).
    #[serde(default)]
    pub search_key: String,
    pub tracker_type: TrackerType,
    pub method: FetchMethod,
    pub selector_sets: Vec<SelectorSet>,
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if Url::parse(&self.url).is_err() {
            return Err(EngineError::Config(config::ConfigError::Message(format!(
                "tracker {}: invalid url {}",
                self.id, self.url
            ))));
        }
        if Url::parse(&self.site_url).is_err() {
            return Err(EngineError::Config(config::ConfigError::Message(format!(
                "tracker {}: invalid site_url {}",
                self.id, self.site_url
            ))));
        }
        if self.selector_sets.is_empty() {
            return Err(EngineError::Config(config::ConfigError::Message(format!(
                "tracker {}: at least one selector set is required",
                self.id
            ))));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TrackerFile {
    #[serde(default)]
    trackers: Vec<TrackerConfig>,
}

/// Load and validate tracker definitions from a TOML file.
pub fn load_trackers(path: &str) -> Result<Vec<TrackerConfig>> {
    let raw = std::fs::read_to_string(path)?;
    let file: TrackerFile = toml::from_str(&raw)?;
    for tracker in &file.trackers {
        tracker.validate()?;
    }
    Ok(file.trackers)
}
