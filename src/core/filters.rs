// src/core/filters.rs — Filter sets and edit application

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Filter categories the lead provider documents. Edits targeting other names
/// are still applied, but produce a hint.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "locations",
    "job_titles",
    "departments",
    "management_levels",
    "industries",
    "company_size",
    "revenue_range",
    "technologies",
    "keywords",
    "funding_type",
    "funding_stage",
];

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const HINT_SIMILARITY: f64 = 0.85;

/// Named mapping of search constraints. Keys are unique and sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, FilterValue>);

/// A single filter's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    List(Vec<Value>),
    Range(RangeFilter),
    Scoped(ScopedFilter),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopedFilter {
    #[serde(default)]
    pub include: Vec<Value>,
    #[serde(default)]
    pub exclude: Vec<Value>,
}

/// One suggested change to a filter set.
///
/// The value stays raw JSON until the edit is applied, so a single malformed
/// suggestion cannot poison the batch it arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    #[serde(rename = "filter", alias = "target")]
    pub target: String,
    #[serde(rename = "action", alias = "operation")]
    pub operation: EditOp,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOp {
    Set,
    Add,
    Remove,
    Unknown,
}

impl EditOp {
    /// Case-insensitive; anything unrecognized is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "set" => EditOp::Set,
            "add" => EditOp::Add,
            "remove" => EditOp::Remove,
            _ => EditOp::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for EditOp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EditOp::parse(&s))
    }
}

impl std::fmt::Display for EditOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditOp::Set => write!(f, "set"),
            EditOp::Add => write!(f, "add"),
            EditOp::Remove => write!(f, "remove"),
            EditOp::Unknown => write!(f, "unknown"),
        }
    }
}

/// Why an edit was rejected, or a note attached to an applied edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditIssue {
    EmptyTarget,
    UnknownOperation,
    InvalidValue(String),
    TypeMismatch {
        existing: &'static str,
        incoming: &'static str,
    },
    UnknownCategory {
        suggestion: Option<String>,
    },
}

impl EditIssue {
    /// Rejections leave the filter set untouched; hints do not.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, EditIssue::UnknownCategory { .. })
    }
}

impl std::fmt::Display for EditIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditIssue::EmptyTarget => write!(f, "edit has no target filter"),
            EditIssue::UnknownOperation => {
                write!(f, "unknown operation (expected set, add, or remove)")
            }
            EditIssue::InvalidValue(detail) => write!(f, "invalid value: {}", detail),
            EditIssue::TypeMismatch { existing, incoming } => {
                write!(f, "cannot add a {} to a {} filter", incoming, existing)
            }
            EditIssue::UnknownCategory {
                suggestion: Some(s),
            } => write!(f, "unknown filter category; did you mean '{}'?", s),
            EditIssue::UnknownCategory { suggestion: None } => {
                write!(f, "unknown filter category")
            }
        }
    }
}

/// A problem found while applying one edit of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EditWarning {
    /// 1-based position of the edit within its batch.
    pub position: usize,
    pub target: String,
    pub issue: EditIssue,
}

impl std::fmt::Display for EditWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let outcome = if self.issue.is_rejection() {
            "skipped"
        } else {
            "applied"
        };
        write!(
            f,
            "edit #{} ({}): {} [{}]",
            self.position, self.target, self.issue, outcome
        )
    }
}

impl Edit {
    pub fn set(target: impl Into<String>, value: Value) -> Self {
        Self {
            target: target.into(),
            operation: EditOp::Set,
            value,
            rationale: None,
        }
    }

    pub fn add(target: impl Into<String>, value: Value) -> Self {
        Self {
            target: target.into(),
            operation: EditOp::Add,
            value,
            rationale: None,
        }
    }

    pub fn remove(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            operation: EditOp::Remove,
            value: Value::Null,
            rationale: None,
        }
    }
}

/// Compact one-line form, e.g. `set company_size {"max":150}`.
impl std::fmt::Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.operation, &self.value) {
            (EditOp::Remove, _) | (_, Value::Null) => {
                write!(f, "{} {}", self.operation, self.target)
            }
            (op, value) => write!(
                f,
                "{} {} {}",
                op,
                self.target,
                crate::util::truncate_str(&value.to_string(), 120)
            ),
        }
    }
}

impl FilterValue {
    /// Interpret raw JSON as a filter value.
    pub fn from_json(value: &Value) -> Result<Self, EditIssue> {
        serde_json::from_value(value.clone()).map_err(|_| {
            EditIssue::InvalidValue(format!(
                "{} is not a list, a {{min, max}} range, or an {{include, exclude}} pair",
                crate::util::truncate_str(&value.to_string(), 80)
            ))
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::List(_) => "list",
            FilterValue::Range(_) => "range",
            FilterValue::Scoped(_) => "include/exclude",
        }
    }

    /// Merge `incoming` into this value (the `add` operation).
    fn merge(&mut self, incoming: FilterValue) -> Result<(), EditIssue> {
        match (&mut *self, incoming) {
            (FilterValue::List(items), FilterValue::List(new)) => {
                extend_unique(items, new);
                Ok(())
            }
            (FilterValue::Scoped(scoped), FilterValue::Scoped(new)) => {
                extend_unique(&mut scoped.include, new.include);
                extend_unique(&mut scoped.exclude, new.exclude);
                Ok(())
            }
            (FilterValue::Scoped(scoped), FilterValue::List(new)) => {
                extend_unique(&mut scoped.include, new);
                Ok(())
            }
            (FilterValue::Range(range), FilterValue::Range(new)) => {
                if new.min.is_some() {
                    range.min = new.min;
                }
                if new.max.is_some() {
                    range.max = new.max;
                }
                Ok(())
            }
            (existing, incoming) => Err(EditIssue::TypeMismatch {
                existing: existing.kind(),
                incoming: incoming.kind(),
            }),
        }
    }
}

fn extend_unique(dst: &mut Vec<Value>, src: Vec<Value>) {
    for item in src {
        if !dst.contains(&item) {
            dst.push(item);
        }
    }
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter set from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, crate::infra::errors::LeadLoopError> {
        serde_json::from_str(s)
            .map_err(|e| crate::infra::errors::LeadLoopError::InvalidFilters(e.to_string()))
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }

    pub fn get(&self, category: &str) -> Option<&FilterValue> {
        self.0.get(category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    pub fn insert(&mut self, category: impl Into<String>, value: FilterValue) {
        self.0.insert(category.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Apply a single edit. On error the filter set is left unchanged.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<(), EditIssue> {
        if edit.target.trim().is_empty() {
            return Err(EditIssue::EmptyTarget);
        }

        match edit.operation {
            EditOp::Unknown => Err(EditIssue::UnknownOperation),
            EditOp::Remove => {
                self.0.remove(&edit.target);
                Ok(())
            }
            EditOp::Set => {
                let value = FilterValue::from_json(&edit.value)?;
                self.0.insert(edit.target.clone(), value);
                Ok(())
            }
            EditOp::Add => {
                let incoming = FilterValue::from_json(&edit.value)?;
                match self.0.get_mut(&edit.target) {
                    Some(existing) => existing.merge(incoming),
                    None => {
                        self.0.insert(edit.target.clone(), incoming);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Apply edits in order. Malformed edits are skipped and reported; they
    /// never abort the batch.
    pub fn apply_edits(&mut self, edits: &[Edit]) -> Vec<EditWarning> {
        let mut warnings = Vec::new();

        for (i, edit) in edits.iter().enumerate() {
            match self.apply_edit(edit) {
                Ok(()) => {
                    if edit.operation != EditOp::Remove {
                        if let Some(issue) = category_hint(&edit.target) {
                            warnings.push(EditWarning {
                                position: i + 1,
                                target: edit.target.clone(),
                                issue,
                            });
                        }
                    }
                }
                Err(issue) => {
                    tracing::warn!(
                        target_filter = %edit.target,
                        operation = %edit.operation,
                        "Skipping edit: {}",
                        issue
                    );
                    warnings.push(EditWarning {
                        position: i + 1,
                        target: edit.target.clone(),
                        issue,
                    });
                }
            }
        }

        warnings
    }
}

/// Hint for a category name the provider does not document.
pub fn category_hint(target: &str) -> Option<EditIssue> {
    if KNOWN_CATEGORIES.contains(&target) {
        return None;
    }

    let suggestion = KNOWN_CATEGORIES
        .iter()
        .map(|known| (*known, strsim::jaro_winkler(known, target)))
        .filter(|(_, score)| *score >= HINT_SIMILARITY)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(known, _)| known.to_string());

    Some(EditIssue::UnknownCategory { suggestion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> FilterSet {
        FilterSet::from_json_str(
            r#"{
                "locations": {"include": [{"country": "US", "state": "CO"}], "exclude": []},
                "job_titles": {"include": ["CEO", "Founder"], "exclude": ["Assistant"]},
                "management_levels": ["c_level"],
                "company_size": {"min": 10, "max": 500}
            }"#,
        )
        .unwrap()
    }

    // ─── Parsing ────────────────────────────────────────────────

    #[test]
    fn test_parse_value_kinds() {
        let f = sample();
        assert_eq!(f.len(), 4);
        assert_eq!(f.get("locations").unwrap().kind(), "include/exclude");
        assert_eq!(f.get("management_levels").unwrap().kind(), "list");
        assert_eq!(f.get("company_size").unwrap().kind(), "range");
    }

    #[test]
    fn test_parse_scoped_defaults_exclude() {
        let f = FilterSet::from_json_str(r#"{"job_titles": {"include": ["CEO"]}}"#).unwrap();
        assert_eq!(
            f.get("job_titles"),
            Some(&FilterValue::Scoped(ScopedFilter {
                include: vec![json!("CEO")],
                exclude: vec![],
            }))
        );
    }

    #[test]
    fn test_parse_half_open_range() {
        let f = FilterSet::from_json_str(r#"{"company_size": {"min": 20}}"#).unwrap();
        assert_eq!(
            f.get("company_size"),
            Some(&FilterValue::Range(RangeFilter {
                min: Some(20),
                max: None
            }))
        );
    }

    #[test]
    fn test_parse_rejects_scalar() {
        assert!(FilterSet::from_json_str(r#"{"keywords": "hiring"}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_mixed_object() {
        assert!(FilterSet::from_json_str(r#"{"x": {"min": 1, "include": []}}"#).is_err());
    }

    #[test]
    fn test_serialize_keeps_empty_exclude_and_skips_missing_bound() {
        let f = FilterSet::from_json_str(
            r#"{"locations": {"include": ["CO"]}, "company_size": {"max": 50}}"#,
        )
        .unwrap();
        let v: Value = serde_json::to_value(&f).unwrap();
        assert_eq!(
            v,
            json!({
                "company_size": {"max": 50},
                "locations": {"include": ["CO"], "exclude": []}
            })
        );
    }

    // ─── set ────────────────────────────────────────────────────

    #[test]
    fn test_set_replaces_only_target() {
        let before = sample();
        let mut after = before.clone();
        after
            .apply_edit(&Edit::set("company_size", json!({"min": 20, "max": 150})))
            .unwrap();

        assert_eq!(
            after.get("company_size"),
            Some(&FilterValue::Range(RangeFilter {
                min: Some(20),
                max: Some(150)
            }))
        );
        for cat in before.categories().filter(|c| *c != "company_size") {
            assert_eq!(after.get(cat), before.get(cat));
        }
        assert_eq!(after.len(), before.len());
    }

    #[test]
    fn test_set_new_category() {
        let mut f = sample();
        f.apply_edit(&Edit::set("industries", json!(["SaaS"]))).unwrap();
        assert_eq!(f.len(), 5);
        assert_eq!(
            f.get("industries"),
            Some(&FilterValue::List(vec![json!("SaaS")]))
        );
    }

    #[test]
    fn test_set_invalid_value_is_noop() {
        let before = sample();
        let mut after = before.clone();
        let err = after
            .apply_edit(&Edit::set("company_size", json!("small")))
            .unwrap_err();
        assert!(matches!(err, EditIssue::InvalidValue(_)));
        assert_eq!(after, before);
    }

    // ─── remove ─────────────────────────────────────────────────

    #[test]
    fn test_remove_deletes_category() {
        let mut f = sample();
        f.apply_edit(&Edit::remove("company_size")).unwrap();
        assert!(!f.contains("company_size"));
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut once = sample();
        once.apply_edit(&Edit::remove("industries")).unwrap();
        assert_eq!(once, sample());

        let mut twice = sample();
        twice.apply_edit(&Edit::remove("company_size")).unwrap();
        let snapshot = twice.clone();
        twice.apply_edit(&Edit::remove("company_size")).unwrap();
        assert_eq!(twice, snapshot);
    }

    #[test]
    fn test_set_then_remove_leaves_absent() {
        let mut f = FilterSet::new();
        let warnings = f.apply_edits(&[
            Edit::set("a", json!({"min": 1})),
            Edit::remove("a"),
        ]);
        assert!(!f.contains("a"));
        assert!(f.is_empty());
        // "a" is not a documented category, so the set carries a hint
        assert_eq!(warnings.len(), 1);
        assert!(!warnings[0].issue.is_rejection());
    }

    // ─── add ────────────────────────────────────────────────────

    #[test]
    fn test_add_creates_missing_category() {
        let mut f = sample();
        f.apply_edit(&Edit::add("technologies", json!(["HubSpot"])))
            .unwrap();
        assert_eq!(
            f.get("technologies"),
            Some(&FilterValue::List(vec![json!("HubSpot")]))
        );
    }

    #[test]
    fn test_add_list_union() {
        let mut f = sample();
        f.apply_edit(&Edit::add("management_levels", json!(["vp", "c_level"])))
            .unwrap();
        assert_eq!(
            f.get("management_levels"),
            Some(&FilterValue::List(vec![json!("c_level"), json!("vp")]))
        );
    }

    #[test]
    fn test_add_scoped_union() {
        let mut f = sample();
        f.apply_edit(&Edit::add(
            "job_titles",
            json!({"include": ["President"], "exclude": ["Intern", "Assistant"]}),
        ))
        .unwrap();
        assert_eq!(
            f.get("job_titles"),
            Some(&FilterValue::Scoped(ScopedFilter {
                include: vec![json!("CEO"), json!("Founder"), json!("President")],
                exclude: vec![json!("Assistant"), json!("Intern")],
            }))
        );
    }

    #[test]
    fn test_add_list_into_scoped_include() {
        let mut f = sample();
        f.apply_edit(&Edit::add("job_titles", json!(["CTO"]))).unwrap();
        match f.get("job_titles").unwrap() {
            FilterValue::Scoped(s) => assert!(s.include.contains(&json!("CTO"))),
            other => panic!("unexpected kind {}", other.kind()),
        }
    }

    #[test]
    fn test_add_range_overwrites_given_bounds() {
        let mut f = sample();
        f.apply_edit(&Edit::add("company_size", json!({"max": 150})))
            .unwrap();
        assert_eq!(
            f.get("company_size"),
            Some(&FilterValue::Range(RangeFilter {
                min: Some(10),
                max: Some(150)
            }))
        );
    }

    #[test]
    fn test_add_type_mismatch_is_noop() {
        let before = sample();
        let mut after = before.clone();
        let err = after
            .apply_edit(&Edit::add("company_size", json!(["big"])))
            .unwrap_err();
        assert_eq!(
            err,
            EditIssue::TypeMismatch {
                existing: "range",
                incoming: "list"
            }
        );
        assert_eq!(after, before);
    }

    // ─── batches ────────────────────────────────────────────────

    #[test]
    fn test_unknown_operation_skipped_rest_applied() {
        let edit: Edit =
            serde_json::from_value(json!({"filter": "industries", "action": "replace", "value": ["x"]}))
                .unwrap();
        assert_eq!(edit.operation, EditOp::Unknown);

        let mut f = sample();
        let warnings = f.apply_edits(&[edit, Edit::remove("company_size")]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].position, 1);
        assert_eq!(warnings[0].issue, EditIssue::UnknownOperation);
        assert!(!f.contains("industries"));
        assert!(!f.contains("company_size"));
    }

    #[test]
    fn test_empty_target_rejected() {
        let mut f = sample();
        let warnings = f.apply_edits(&[Edit::set("  ", json!([]))]);
        assert_eq!(warnings[0].issue, EditIssue::EmptyTarget);
        assert_eq!(f, sample());
    }

    #[test]
    fn test_edit_wire_names() {
        let edit: Edit = serde_json::from_value(json!({
            "filter": "company_size",
            "action": "set",
            "value": {"min": 20, "max": 150},
            "rationale": "growth stage"
        }))
        .unwrap();
        assert_eq!(edit.target, "company_size");
        assert_eq!(edit.operation, EditOp::Set);
        assert_eq!(edit.rationale.as_deref(), Some("growth stage"));
    }

    #[test]
    fn test_operation_case_insensitive() {
        assert_eq!(EditOp::parse(" SET "), EditOp::Set);
        assert_eq!(EditOp::parse("Remove"), EditOp::Remove);
        assert_eq!(EditOp::parse("merge"), EditOp::Unknown);
    }

    // ─── hints ──────────────────────────────────────────────────

    #[test]
    fn test_category_hint_known() {
        assert!(category_hint("job_titles").is_none());
    }

    #[test]
    fn test_category_hint_close_match() {
        assert_eq!(
            category_hint("job_title"),
            Some(EditIssue::UnknownCategory {
                suggestion: Some("job_titles".into())
            })
        );
    }

    #[test]
    fn test_category_hint_far_off() {
        assert_eq!(
            category_hint("zzz"),
            Some(EditIssue::UnknownCategory { suggestion: None })
        );
    }

    #[test]
    fn test_warning_display() {
        let w = EditWarning {
            position: 2,
            target: "company_size".into(),
            issue: EditIssue::TypeMismatch {
                existing: "range",
                incoming: "list",
            },
        };
        assert_eq!(
            w.to_string(),
            "edit #2 (company_size): cannot add a list to a range filter [skipped]"
        );
    }

    #[test]
    fn test_edit_display() {
        assert_eq!(
            Edit::set("company_size", json!({"max": 150})).to_string(),
            r#"set company_size {"max":150}"#
        );
        assert_eq!(
            Edit::add("keywords", json!(["hiring"])).to_string(),
            r#"add keywords ["hiring"]"#
        );
        assert_eq!(Edit::remove("job_titles").to_string(), "remove job_titles");
    }
}
