//! Aggregated payload validation.
//!
//! Command payloads arrive as loosely-typed JSON and are validated into
//! typed drafts before anything touches the store. Validation never stops
//! at the first problem: every violation is collected into an ordered list
//! of [`Issue`]s, one per offending field, in the order the fields are
//! declared in the payload schema. Nested descriptors are validated before
//! the scalar fields that follow them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Message used when a required field is absent.
pub const MSG_REQUIRED: &str = "field required";
/// Message used when a field is not a JSON string.
pub const MSG_NOT_STRING: &str = "value is not a valid string";
/// Message used when a field is not a non-negative JSON integer.
pub const MSG_NOT_INTEGER: &str = "value is not a valid integer";
/// Message used when a field is not a JSON object.
pub const MSG_NOT_DICT: &str = "value is not a valid dict";

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Path of the offending field, outermost segment first.
    pub loc: Vec<String>,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Issue {
    /// Creates an issue for the given field path.
    #[must_use]
    pub fn new(loc: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            loc,
            message: message.into(),
        }
    }
}

/// Path to a field inside a payload, e.g. `params.registry.type`.
#[derive(Debug, Clone, Default)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The payload root (empty path).
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the path extended by one segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    /// Returns the path segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

/// Ordered collector of validation violations.
#[derive(Debug, Default)]
pub struct Issues {
    issues: Vec<Issue>,
}

impl Issues {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation at the given field.
    pub fn push(&mut self, path: &FieldPath, message: impl Into<String>) {
        self.issues
            .push(Issue::new(path.segments().to_vec(), message));
    }

    /// Returns true if no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Converts the collected violations into a result.
    ///
    /// Returns `value` untouched when the collector is empty, otherwise an
    /// [`Error::Validation`] carrying every recorded issue in order.
    pub fn finish<T>(self, value: Option<T>) -> Result<T> {
        if self.issues.is_empty() {
            value.ok_or_else(|| Error::internal("validator produced no value without issues"))
        } else {
            Err(Error::validation(self.issues))
        }
    }
}

/// Interprets the payload root as an object, recording a violation otherwise.
pub fn as_object<'a>(
    value: &'a Value,
    path: &FieldPath,
    issues: &mut Issues,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => {
            issues.push(path, MSG_NOT_DICT);
            None
        }
    }
}

/// Extracts a required string field.
pub fn required_str(
    map: &Map<String, Value>,
    key: &str,
    path: &FieldPath,
    issues: &mut Issues,
) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => {
            issues.push(&path.child(key), MSG_REQUIRED);
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issues.push(&path.child(key), MSG_NOT_STRING);
            None
        }
    }
}

/// Extracts an optional string field; absent and null are both `None`.
pub fn optional_str(
    map: &Map<String, Value>,
    key: &str,
    path: &FieldPath,
    issues: &mut Issues,
) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issues.push(&path.child(key), MSG_NOT_STRING);
            None
        }
    }
}

/// Extracts a required non-negative integer field.
pub fn required_u64(
    map: &Map<String, Value>,
    key: &str,
    path: &FieldPath,
    issues: &mut Issues,
) -> Option<u64> {
    match map.get(key) {
        None | Some(Value::Null) => {
            issues.push(&path.child(key), MSG_REQUIRED);
            None
        }
        Some(value) => match value.as_u64() {
            Some(n) => Some(n),
            None => {
                issues.push(&path.child(key), MSG_NOT_INTEGER);
                None
            }
        },
    }
}

/// Extracts an optional non-negative integer field.
pub fn optional_u64(
    map: &Map<String, Value>,
    key: &str,
    path: &FieldPath,
    issues: &mut Issues,
) -> Option<u64> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_u64() {
            Some(n) => Some(n),
            None => {
                issues.push(&path.child(key), MSG_NOT_INTEGER);
                None
            }
        },
    }
}

/// Extracts an optional object field.
pub fn optional_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    issues: &mut Issues,
) -> Option<&'a Map<String, Value>> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Object(inner)) => Some(inner),
        Some(_) => {
            issues.push(&path.child(key), MSG_NOT_DICT);
            None
        }
    }
}

/// Extracts a required object field.
pub fn required_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    issues: &mut Issues,
) -> Option<&'a Map<String, Value>> {
    match map.get(key) {
        None | Some(Value::Null) => {
            issues.push(&path.child(key), MSG_REQUIRED);
            None
        }
        Some(Value::Object(inner)) => Some(inner),
        Some(_) => {
            issues.push(&path.child(key), MSG_NOT_DICT);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collects_every_violation_in_order() {
        let payload = json!({"name": 7, "project_id": "nope"});
        let map = payload.as_object().unwrap();
        let root = FieldPath::root();
        let mut issues = Issues::new();

        required_str(map, "name", &root, &mut issues);
        required_u64(map, "project_id", &root, &mut issues);

        let err = issues.finish::<()>(None).unwrap_err();
        match err {
            Error::Validation { issues } => {
                assert_eq!(issues.len(), 2);
                assert_eq!(issues[0].loc, vec!["name"]);
                assert_eq!(issues[0].message, MSG_NOT_STRING);
                assert_eq!(issues[1].loc, vec!["project_id"]);
                assert_eq!(issues[1].message, MSG_NOT_INTEGER);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_field_reports_field_required() {
        let payload = json!({});
        let map = payload.as_object().unwrap();
        let root = FieldPath::root();
        let mut issues = Issues::new();

        required_str(map, "name", &root, &mut issues);

        let err = issues.finish::<()>(None).unwrap_err();
        match err {
            Error::Validation { issues } => {
                assert_eq!(issues[0].message, MSG_REQUIRED);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn nested_paths_accumulate_segments() {
        let root = FieldPath::root();
        let nested = root.child("params").child("registry");
        assert_eq!(nested.segments(), ["params", "registry"]);
    }

    #[test]
    fn empty_collector_passes_value_through() {
        let issues = Issues::new();
        assert_eq!(issues.finish(Some(5)).unwrap(), 5);
    }

    #[test]
    fn optional_fields_tolerate_null() {
        let payload = json!({"author": null});
        let map = payload.as_object().unwrap();
        let root = FieldPath::root();
        let mut issues = Issues::new();

        assert!(optional_str(map, "author", &root, &mut issues).is_none());
        assert!(issues.is_empty());
    }
}
