use url::Url;

use crate::classify::{Alert, ChangeDecision};
use crate::extract::ExtractionResult;
use crate::models::{FieldKind, Snapshot, SnapshotPayload, TrackerConfig};

/// Phrases that mark a matched title as a request-for rather than a listing
/// (marketplaces mix both into the same result slots).
const EXCLUSION_PHRASES: &[&str] = &["wanted", "looking for", "anyone got"];

pub(super) fn classify(
    tracker: &TrackerConfig,
    alert_channel: &str,
    extraction: &ExtractionResult,
    latest: Option<&Snapshot>,
) -> Option<ChangeDecision> {
    let title = extraction.get(FieldKind::Title)?;
    let link = extraction.get(FieldKind::Link)?;
    let location = extraction.get(FieldKind::Location)?;

    let title_lower = title.to_lowercase();
    if !title_lower.contains(&tracker.search_key.to_lowercase()) {
        return None;
    }
    if EXCLUSION_PHRASES
        .iter()
        .any(|phrase| title_lower.contains(phrase))
    {
        return None;
    }

    let item_url = normalize_link(link, &tracker.site_url);

    // Change iff first run or the item link moved on.
    if latest.and_then(Snapshot::item_url) == Some(item_url.as_str()) {
        return None;
    }

    let alert = Alert {
        title: format!("New {} item!", tracker.name),
        body: format!("{} just became available in {} - {}", title, location, item_url),
        channel: alert_channel.to_string(),
    };

    Some(ChangeDecision {
        payload: SnapshotPayload::NewItem {
            item_desc: title.to_string(),
            item_url,
        },
        alert: Some(alert),
    })
}

/// Strip the query string and absolutize relative links against the site
/// base URL.
fn normalize_link(link: &str, site_url: &str) -> String {
    let absolute = match Url::parse(link) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(site_url)
            .ok()
            .and_then(|base| base.join(link).ok()),
        Err(_) => None,
    };
    match absolute {
        Some(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        // Unparseable link: best effort, drop anything after '?'.
        None => link.split('?').next().unwrap_or(link).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify;
    use crate::extract::extract;
    use crate::models::{FetchMethod, SelectorSet, TrackerType};
    use chrono::Utc;

    fn tracker() -> TrackerConfig {
        TrackerConfig {
            id: "trk1".to_string(),
            name: "Road bike".to_string(),
            site_name: "Marketplace".to_string(),
            site_url: "https://example.com".to_string(),
            url: "https://example.com/search?q=bike".to_string(),
            search_key: "widget".to_string(),
            tracker_type: TrackerType::NewItem,
            method: FetchMethod::StaticHtml,
            selector_sets: vec![SelectorSet::default()],
        }
    }

    fn extraction(title: &str, link: &str, location: &str) -> ExtractionResult {
        let html = format!(
            r#"<html><body><h1>{title}</h1><a href="{link}">x</a><span>{location}</span></body></html>"#
        );
        extract(
            &html,
            &[SelectorSet {
                title: "h1".to_string(),
                link: "a".to_string(),
                location: "span".to_string(),
                ..Default::default()
            }],
            TrackerType::NewItem.requested_fields(),
            TrackerType::NewItem.required_fields(),
        )
        .unwrap()
    }

    fn snapshot(item_url: &str) -> Snapshot {
        Snapshot {
            id: 1,
            tracker_id: "trk1".to_string(),
            payload: SnapshotPayload::NewItem {
                item_desc: "Widget".to_string(),
                item_url: item_url.to_string(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_run_is_a_change_and_alerts() {
        let extraction = extraction("Widget deluxe", "/item/42?ref=abc", "Springfield");
        let decision = classify::classify(&tracker(), "#alert", &extraction, None).unwrap();

        assert_eq!(
            decision.payload,
            SnapshotPayload::NewItem {
                item_desc: "Widget deluxe".to_string(),
                item_url: "https://example.com/item/42".to_string(),
            }
        );
        let alert = decision.alert.unwrap();
        assert_eq!(alert.title, "New Road bike item!");
        assert_eq!(
            alert.body,
            "Widget deluxe just became available in Springfield - https://example.com/item/42"
        );
        assert_eq!(alert.channel, "#alert");
    }

    #[test]
    fn test_link_normalization_strips_query_and_absolutizes() {
        assert_eq!(
            normalize_link("/item/42?ref=abc", "https://example.com"),
            "https://example.com/item/42"
        );
        assert_eq!(
            normalize_link("https://other.example/listing?x=1", "https://example.com"),
            "https://other.example/listing"
        );
    }

    #[test]
    fn test_search_key_is_case_insensitive() {
        let extraction = extraction("WIDGET deluxe", "/item/1", "Springfield");
        assert!(classify::classify(&tracker(), "#alert", &extraction, None).is_some());
    }

    #[test]
    fn test_title_without_search_key_is_rejected() {
        let extraction = extraction("Sprocket", "/item/1", "Springfield");
        assert!(classify::classify(&tracker(), "#alert", &extraction, None).is_none());
    }

    #[test]
    fn test_exclusion_phrase_rejects_even_with_search_key() {
        for title in ["Widget wanted", "Looking for a widget", "anyone got a Widget?"] {
            let extraction = extraction(title, "/item/1", "Springfield");
            assert!(
                classify::classify(&tracker(), "#alert", &extraction, None).is_none(),
                "title {title:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_same_link_is_no_change() {
        let extraction = extraction("Widget deluxe", "/item/42?ref=abc", "Springfield");
        let prior = snapshot("https://example.com/item/42");
        assert!(classify::classify(&tracker(), "#alert", &extraction, Some(&prior)).is_none());
    }

    #[test]
    fn test_different_link_is_a_change() {
        let extraction = extraction("Widget deluxe", "/item/43", "Springfield");
        let prior = snapshot("https://example.com/item/42");
        let decision =
            classify::classify(&tracker(), "#alert", &extraction, Some(&prior)).unwrap();
        assert_eq!(
            decision.payload,
            SnapshotPayload::NewItem {
                item_desc: "Widget deluxe".to_string(),
                item_url: "https://example.com/item/43".to_string(),
            }
        );
        assert!(decision.alert.is_some());
    }
}
