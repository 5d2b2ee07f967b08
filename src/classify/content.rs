use crate::classify::{Alert, ChangeDecision};
use crate::extract::ExtractionResult;
use crate::models::{FieldKind, Snapshot, SnapshotPayload, TrackerConfig};

pub(super) fn classify(
    tracker: &TrackerConfig,
    alert_channel: &str,
    extraction: &ExtractionResult,
    latest: Option<&Snapshot>,
) -> Option<ChangeDecision> {
    let content = extraction.get(FieldKind::Content)?;
    let prior = latest.and_then(Snapshot::content);

    // Byte-for-byte comparison; the content is an opaque blob.
    if prior == Some(content) {
        return None;
    }

    let diff = line_diff(prior.unwrap_or(""), content);
    let alert = Alert {
        title: format!("{} changed", tracker.name),
        body: diff.clone(),
        channel: alert_channel.to_string(),
    };

    Some(ChangeDecision {
        payload: SnapshotPayload::Content {
            content: content.to_string(),
            diff,
        },
        alert: Some(alert),
    })
}

/// Deterministic line-level diff: common lines pass through with a two-space
/// gutter, removals get "- ", additions "+ ". Classic LCS walk, so identical
/// inputs always produce identical output.
pub fn line_diff(old: &str, new: &str) -> String {
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();

    let mut lcs = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            out.push(format!("  {}", a[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(format!("- {}", a[i]));
            i += 1;
        } else {
            out.push(format!("+ {}", b[j]));
            j += 1;
        }
    }
    for line in &a[i..] {
        out.push(format!("- {}", line));
    }
    for line in &b[j..] {
        out.push(format!("+ {}", line));
    }
    out.join("\n")
}
