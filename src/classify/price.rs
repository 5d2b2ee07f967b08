use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::classify::{Alert, ChangeDecision};
use crate::extract::ExtractionResult;
use crate::models::{FieldKind, Snapshot, SnapshotPayload, TrackerConfig};

fn strip_regex() -> &'static Regex {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    STRIP.get_or_init(|| Regex::new(r"[^0-9.]").expect("literal regex"))
}

/// Parse a raw extracted price string ("$1,299.00", "EUR 50") into a decimal
/// by dropping everything that is not a digit or decimal point.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned = strip_regex().replace_all(raw, "");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

pub(super) fn classify(
    tracker: &TrackerConfig,
    alert_channel: &str,
    extraction: &ExtractionResult,
    latest: Option<&Snapshot>,
) -> Option<ChangeDecision> {
    let price = parse_price(extraction.get(FieldKind::Price)?)?;
    // Presence check: an unmatched availability selector means not available.
    let available = extraction.is_resolved(FieldKind::Available);

    let prior = latest.and_then(Snapshot::price_availability);
    let price_changed = prior.map_or(true, |(prior_price, _)| prior_price != price);
    let availability_changed = prior.map_or(true, |(_, prior_available)| prior_available != available);

    if !price_changed && !availability_changed {
        return None;
    }

    // Price establishment on the first run is not alert-worthy; availability
    // alerts only on the transition into "available".
    let mut lines = Vec::new();
    if available && availability_changed {
        lines.push(format!("{} stock available!", tracker.url));
    }
    if price_changed {
        if let Some((prior_price, _)) = prior {
            lines.push(format!("Price changed from {} to {}", prior_price, price));
        }
    }

    let alert = if lines.is_empty() {
        None
    } else {
        let title = if available && availability_changed {
            "AVAILABLE".to_string()
        } else {
            format!("{} price change", tracker.name)
        };
        Some(Alert {
            title,
            body: lines.join("\n"),
            channel: alert_channel.to_string(),
        })
    };

    Some(ChangeDecision {
        payload: SnapshotPayload::PriceAvailability { price, available },
        alert,
    })
}
