//! Defensive field access over the untyped analysis payload.
//!
//! Each field has exactly one ordered fallback list. Lookups search the value
//! itself first and then the wrapper objects upstream services nest results
//! in. Nothing here fails: missing or malformed data yields `None` or 0.

use crate::sanitize;
use serde_json::{Map, Value};

/// Score field names, in priority order.
pub const SCORE_KEYS: &[&str] = &[
    "score",
    "credibility_score",
    "quality_score",
    "trust_score",
    "objectivity_score",
    "accuracy_score",
    "transparency_score",
    "integrity_score",
    "verification_score",
    "overall_score",
];
pub const TRUST_SCORE_KEYS: &[&str] = &["trust_score", "overall_trust_score", "credibility_score"];
pub const TITLE_KEYS: &[&str] = &["article_title", "title", "headline"];
pub const SOURCE_KEYS: &[&str] = &["source", "source_name", "domain", "publisher"];
pub const AUTHOR_KEYS: &[&str] = &["author", "author_name", "byline"];
pub const WORD_COUNT_KEYS: &[&str] = &["word_count", "words", "article_length"];
pub const SUMMARY_KEYS: &[&str] = &["conversational_summary", "summary", "article_summary"];
pub const ANALYZED_AT_KEYS: &[&str] = &["analyzed_at", "timestamp", "analysis_date"];
pub const URL_KEYS: &[&str] = &["url", "article_url", "link"];
pub const DETAILED_ANALYSIS_KEYS: &[&str] = &["detailed_analysis", "services", "service_results"];
pub const NARRATIVE_KEYS: &[&str] = &[
    "summary",
    "explanation",
    "what_we_found",
    "analysis",
    "details",
    "message",
];
pub const INTERPRETATION_KEYS: &[&str] = &["what_it_means", "interpretation", "conclusion"];
pub const FINDING_KEYS: &[&str] = &["findings", "key_findings", "issues", "claims", "red_flags"];
pub const FINDING_TEXT_KEYS: &[&str] = &[
    "text",
    "finding",
    "description",
    "phrase",
    "message",
    "claim",
];
pub const SEVERITY_KEYS: &[&str] = &["severity", "level", "verdict", "type"];
pub const SOURCE_RATING_KEYS: &[&str] = &["credibility_level", "credibility", "rating", "reputation"];
pub const AUTHOR_ROLE_KEYS: &[&str] = &["position", "role", "job_title"];
pub const AUTHOR_ORG_KEYS: &[&str] = &["organization", "outlet", "employer"];
pub const AUTHOR_BIO_KEYS: &[&str] = &["bio", "biography", "author_bio"];

/// Wrapper objects searched after the value itself.
const NESTED_SCOPES: &[&str] = &["data", "analysis", "results", "details"];
/// Keys tried when an object shows up where a string was expected.
const NAME_KEYS: &[&str] = &["name", "text", "value", "label"];

fn scopes(value: &Value) -> Vec<&Map<String, Value>> {
    let mut out = Vec::new();
    if let Some(map) = value.as_object() {
        out.push(map);
        for key in NESTED_SCOPES {
            if let Some(inner) = map.get(*key).and_then(Value::as_object) {
                out.push(inner);
            }
        }
    }
    out
}

/// Every present candidate for `keys`, in priority order.
pub fn candidates<'a>(value: &'a Value, keys: &[&str]) -> Vec<&'a Value> {
    let mut out = Vec::new();
    for scope in scopes(value) {
        for key in keys {
            if let Some(found) = scope.get(*key) {
                if !found.is_null() {
                    out.push(found);
                }
            }
        }
    }
    out
}

pub fn find_object<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    candidates(value, keys)
        .into_iter()
        .find_map(Value::as_object)
}

pub fn find_array<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    candidates(value, keys)
        .into_iter()
        .find_map(Value::as_array)
}

/// Finite number from a JSON number or a numeric string ("72", "72.5%").
pub fn number_from(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn clamp_score(number: f64) -> u8 {
    number.round().clamp(0.0, 100.0) as u8
}

/// Integer score in `0..=100` from the first recognised score field, else 0.
pub fn extract_score(service: &Value) -> u8 {
    score_from_keys(service, SCORE_KEYS).unwrap_or_else(|| {
        log::trace!("no usable score field, defaulting to 0");
        0
    })
}

pub fn score_from_keys(value: &Value, keys: &[&str]) -> Option<u8> {
    candidates(value, keys)
        .into_iter()
        .find_map(number_from)
        .map(clamp_score)
}

/// Display string for a scalar or name-bearing object, passed through the
/// placeholder gate.
pub fn text_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => sanitize::clean_text(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => NAME_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|inner| match inner {
                Value::String(s) => sanitize::clean_text(s),
                _ => None,
            }),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(_) | Value::Object(_) => text_from(item),
                    _ => None,
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Bool(_) | Value::Null => None,
    }
}

pub fn extract_text(value: &Value, keys: &[&str]) -> Option<String> {
    let found = candidates(value, keys).into_iter().find_map(text_from);
    if found.is_none() {
        log::trace!("no usable text under {:?}", keys);
    }
    found
}

pub fn text_or(value: &Value, keys: &[&str], fallback: &str) -> String {
    extract_text(value, keys).unwrap_or_else(|| fallback.to_string())
}

pub fn extract_count(value: &Value, keys: &[&str]) -> Option<u64> {
    candidates(value, keys)
        .into_iter()
        .find_map(number_from)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn score_uses_first_recognised_key() {
        assert_eq!(extract_score(&json!({"score": 72})), 72);
        assert_eq!(extract_score(&json!({"credibility_score": 64.6})), 65);
        assert_eq!(
            extract_score(&json!({"quality_score": 10, "score": 90})),
            90
        );
    }

    #[test]
    fn score_defaults_to_zero_without_recognised_field() {
        assert_eq!(extract_score(&json!({"rating": 90})), 0);
        assert_eq!(extract_score(&json!(null)), 0);
        assert_eq!(extract_score(&json!("85")), 0);
        assert_eq!(extract_score(&json!([1, 2, 3])), 0);
    }

    #[test]
    fn non_numeric_score_falls_through_to_zero() {
        assert_eq!(extract_score(&json!({"score": "N/A"})), 0);
        assert_eq!(extract_score(&json!({"score": {"value": 5}})), 0);
        assert_eq!(extract_score(&json!({"score": true})), 0);
    }

    #[test]
    fn non_numeric_score_does_not_hide_later_keys() {
        assert_eq!(
            extract_score(&json!({"score": "N/A", "quality_score": "58%"})),
            58
        );
    }

    #[test]
    fn score_is_clamped_to_range() {
        assert_eq!(extract_score(&json!({"score": 250})), 100);
        assert_eq!(extract_score(&json!({"score": -4})), 0);
        for raw in [0, 1, 39, 40, 99, 100] {
            assert_eq!(extract_score(&json!({ "score": raw })), raw as u8);
        }
    }

    #[test]
    fn score_is_found_in_nested_data() {
        assert_eq!(extract_score(&json!({"data": {"score": 44}})), 44);
        assert_eq!(
            extract_score(&json!({"score": 10, "data": {"score": 44}})),
            10
        );
    }

    #[test]
    fn text_coerces_numbers_objects_and_arrays() {
        let value = json!({
            "author": {"name": "Jane Roe"},
            "source": 42,
            "byline": ["A. One", "B. Two"],
        });
        assert_eq!(extract_text(&value, &["author"]), Some("Jane Roe".into()));
        assert_eq!(extract_text(&value, &["source"]), Some("42".into()));
        assert_eq!(
            extract_text(&value, &["byline"]),
            Some("A. One, B. Two".into())
        );
    }

    #[test]
    fn text_skips_unusable_candidates() {
        let value = json!({
            "author": {"id": 7},
            "author_name": "undefined",
            "byline": "Sam Writer",
        });
        assert_eq!(
            extract_text(&value, AUTHOR_KEYS),
            Some("Sam Writer".into())
        );
        assert_eq!(text_or(&json!({}), AUTHOR_KEYS, "Unknown Author"), "Unknown Author");
    }

    #[test]
    fn counts_reject_negative_and_non_numeric() {
        assert_eq!(extract_count(&json!({"word_count": 812}), WORD_COUNT_KEYS), Some(812));
        assert_eq!(extract_count(&json!({"word_count": "1200"}), WORD_COUNT_KEYS), Some(1200));
        assert_eq!(extract_count(&json!({"word_count": -3}), WORD_COUNT_KEYS), None);
        assert_eq!(extract_count(&json!({"word_count": "many"}), WORD_COUNT_KEYS), None);
    }
}
