// src/advisor/parser.rs — Extract structured advice from free-form model replies

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::filters::{Edit, FilterSet, FilterValue};
use crate::core::types::{Confidence, CountStatus, Recommendation, RecommendationSource, Verdict};
use crate::infra::errors::LeadLoopError;
use crate::util::truncate_str;

/// Find the first JSON object in a reply. Tried in order: a ```json fence,
/// a bare ``` fence, the whole text, the outermost `{...}` span.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
    let candidates = [
        fenced(text, "```json"),
        fenced(text, "```"),
        Some(text.trim()),
        outer_braces(text),
    ];

    for candidate in candidates.into_iter().flatten() {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => return Some(map),
            Ok(_) => continue,
            Err(e) => {
                tracing::trace!("JSON candidate rejected: {}", e);
            }
        }
    }
    None
}

/// Body of the first fence opened by `marker`, minus any language label.
fn fenced<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    let body = &rest[..end];

    // A bare fence may still carry a label ("```JSON", "```javascript")
    let body = match body.find('\n') {
        Some(nl) if !body[..nl].trim_start().starts_with(['{', '[']) => &body[nl + 1..],
        _ => body,
    };
    Some(body.trim())
}

fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[derive(Deserialize)]
struct RawReply {
    #[serde(default, alias = "verdict")]
    recommendation: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default, alias = "edits")]
    suggested_changes: Option<Value>,
    #[serde(default)]
    estimated_impact: Option<Value>,
    #[serde(default)]
    confidence: Option<String>,
}

fn parse_error(message: impl Into<String>) -> LeadLoopError {
    LeadLoopError::AdvisoryParse {
        message: message.into(),
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Parse an advisor reply. Fails only when no JSON object is present or the
/// verdict is missing or unrecognized; everything else degrades to warnings.
pub fn parse_recommendation(text: &str) -> Result<Recommendation, LeadLoopError> {
    let map = extract_json(text).ok_or_else(|| {
        parse_error(format!(
            "no JSON object in reply: {}",
            truncate_str(text.trim(), 120)
        ))
    })?;
    let raw: RawReply = serde_json::from_value(Value::Object(map))
        .map_err(|e| parse_error(format!("unexpected reply shape: {}", e)))?;

    let verdict_str = raw
        .recommendation
        .as_deref()
        .ok_or_else(|| parse_error("reply has no 'recommendation'"))?;
    let verdict = match normalize(verdict_str).as_str() {
        "proceed" => Verdict::Proceed,
        "refine" => Verdict::Refine,
        "pivot" => Verdict::Pivot,
        other => return Err(parse_error(format!("unknown recommendation '{}'", other))),
    };

    let mut warnings = Vec::new();

    let status = match raw.status.as_deref().map(normalize).as_deref() {
        None => None,
        Some("optimal") => Some(CountStatus::Optimal),
        Some("too_many") => Some(CountStatus::TooMany),
        Some("too_few") => Some(CountStatus::TooFew),
        Some(other) => {
            warnings.push(format!("ignored unknown status '{}'", other));
            None
        }
    };

    let confidence = match raw.confidence.as_deref().map(normalize).as_deref() {
        None => Confidence::Medium,
        Some("high") => Confidence::High,
        Some("medium") => Confidence::Medium,
        Some("low") => Confidence::Low,
        Some(other) => {
            warnings.push(format!("unknown confidence '{}', using medium", other));
            Confidence::Medium
        }
    };

    let edits = match raw.suggested_changes {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match serde_json::from_value::<Edit>(item) {
                Ok(edit) => Some(edit),
                Err(e) => {
                    warnings.push(format!("suggested change #{} ignored: {}", i + 1, e));
                    None
                }
            })
            .collect(),
        Some(_) => {
            warnings.push("suggested_changes is not a list; ignored".into());
            Vec::new()
        }
    };

    let estimated_impact = match raw.estimated_impact {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    };

    Ok(Recommendation {
        verdict,
        edits,
        confidence,
        reasoning: raw.reasoning.unwrap_or_default(),
        status,
        estimated_impact,
        source: RecommendationSource::Advisor,
        warnings,
    })
}

/// Parse a drafted filter set. Entries that are not valid filter values are
/// dropped with a warning.
pub fn parse_filter_set(text: &str) -> Result<FilterSet, LeadLoopError> {
    let mut map = extract_json(text).ok_or_else(|| {
        LeadLoopError::InvalidFilters(format!(
            "no JSON object in reply: {}",
            truncate_str(text.trim(), 120)
        ))
    })?;

    // Some replies wrap the filters in a single envelope key
    if map.len() == 1 {
        if let Some(Value::Object(inner)) = map
            .get("search_filters")
            .or_else(|| map.get("filters"))
            .cloned()
        {
            map = inner;
        }
    }

    let mut filters = FilterSet::new();
    for (category, value) in map {
        match FilterValue::from_json(&value) {
            Ok(v) => filters.insert(category, v),
            Err(issue) => tracing::warn!(category = %category, "Dropping drafted filter: {}", issue),
        }
    }
    Ok(filters)
}
