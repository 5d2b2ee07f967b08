use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod snapshot;
pub mod tracker;

// Re-exports for convenience
pub use snapshot::*;
pub use tracker::*;

// Common enums used across the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackerType {
    NewItem,
    PriceAvailability,
    ContentDiff,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FetchMethod {
    StaticHtml,
    ScriptedBrowser,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Title,
    Link,
    Location,
    Price,
    Available,
    Content,
}

impl TrackerType {
    /// Fields the extractor should attempt to resolve for this type.
    pub fn requested_fields(&self) -> &'static [FieldKind] {
        match self {
            TrackerType::NewItem => &[FieldKind::Title, FieldKind::Link, FieldKind::Location],
            TrackerType::PriceAvailability => &[FieldKind::Price, FieldKind::Available],
            TrackerType::ContentDiff => &[FieldKind::Content],
        }
    }

    /// Fields that must resolve or the run fails with IncompleteExtraction.
    /// Availability is presence-based: an unmatched selector means "not
    /// available", so it is requested but never required.
    pub fn required_fields(&self) -> &'static [FieldKind] {
        match self {
            TrackerType::NewItem => &[FieldKind::Title, FieldKind::Link, FieldKind::Location],
            TrackerType::PriceAvailability => &[FieldKind::Price],
            TrackerType::ContentDiff => &[FieldKind::Content],
        }
    }
}

pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TrackerType::NewItem).unwrap(),
            "\"new_item\""
        );
        assert_eq!(
            serde_json::to_string(&TrackerType::PriceAvailability).unwrap(),
            "\"price_availability\""
        );
        assert_eq!(
            serde_json::to_string(&TrackerType::ContentDiff).unwrap(),
            "\"content_diff\""
        );
    }

    #[test]
    fn test_fetch_method_deserialization() {
        assert_eq!(
            serde_json::from_str::<FetchMethod>("\"static_html\"").unwrap(),
            FetchMethod::StaticHtml
        );
        assert_eq!(
            serde_json::from_str::<FetchMethod>("\"scripted_browser\"").unwrap(),
            FetchMethod::ScriptedBrowser
        );
    }

    #[test]
    fn test_required_fields_per_type() {
        assert_eq!(
            TrackerType::NewItem.required_fields(),
            &[FieldKind::Title, FieldKind::Link, FieldKind::Location]
        );
        assert_eq!(
            TrackerType::PriceAvailability.required_fields(),
            &[FieldKind::Price]
        );
        assert_eq!(
            TrackerType::ContentDiff.required_fields(),
            &[FieldKind::Content]
        );
    }

    #[test]
    fn test_availability_is_requested_but_not_required() {
        let requested = TrackerType::PriceAvailability.requested_fields();
        let required = TrackerType::PriceAvailability.required_fields();
        assert!(requested.contains(&FieldKind::Available));
        assert!(!required.contains(&FieldKind::Available));
    }

    #[test]
    fn test_generate_id() {
        let id1 = generate_id();
        let id2 = generate_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 32); // UUID simple format is 32 chars
        assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
