use std::collections::BTreeMap;

use scraper::{Html, Selector};
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::models::{FieldKind, SelectorSet};

/// Immutable mapping from field kind to extracted string value. Produced
/// fresh per run, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionResult {
    fields: BTreeMap<FieldKind, String>,
}

impl ExtractionResult {
    pub fn get(&self, field: FieldKind) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_resolved(&self, field: FieldKind) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn resolve(&mut self, field: FieldKind, value: String) {
        self.fields.insert(field, value);
    }
}

/// Extract the requested fields from a page, trying the selector-sets in
/// order. The first set that yields a non-empty value for a field wins that
/// field; fields resolve independently of each other, so one set may supply
/// the title while a later one supplies the link. An empty selector string
/// means the set does not apply to that field and is skipped without
/// evaluation.
///
/// Fails with `IncompleteExtraction` (carrying the partial result for
/// diagnostics) when any required field stays unresolved after all sets.
pub fn extract(
    html: &str,
    selector_sets: &[SelectorSet],
    requested: &[FieldKind],
    required: &[FieldKind],
) -> Result<ExtractionResult> {
    let document = Html::parse_document(html);
    let mut result = ExtractionResult::default();

    for &field in requested {
        for set in selector_sets {
            let raw = set.selector_for(field);
            if raw.is_empty() {
                continue;
            }
            let selector = Selector::parse(raw).map_err(|_| EngineError::Selector {
                selector: raw.to_string(),
            })?;
            let Some(element) = document.select(&selector).next() else {
                continue;
            };
            let value = match field {
                FieldKind::Link => element.value().attr("href").unwrap_or("").to_string(),
                _ => element
                    .text()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string(),
            };
            if !value.is_empty() {
                result.resolve(field, value);
                break;
            }
        }
    }

    let missing: Vec<FieldKind> = required
        .iter()
        .copied()
        .filter(|field| !result.is_resolved(*field))
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::IncompleteExtraction {
            missing,
            partial: result,
        });
    }

    Ok(result)
}
