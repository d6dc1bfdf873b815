//! Declarative required-field validation.
//!
//! Form payloads are checked against a static tree of [`FieldSpec`]s before
//! anything is written to the Schema API. Errors come back in the same shape
//! the API uses for its own validation failures (a map of dotted field path to
//! `{message, code}`), so callers can render local and remote errors alike.
//!
//! A field is only reported when it is *present and empty*. A key that is
//! missing from the payload (or explicitly `null`) is not an error: forms
//! submit every field they render, so an absent key means the field was not
//! on the page.
//!
//! ```
//! use schema_storefront_core::{FieldSpec, validate};
//! use serde_json::json;
//!
//! const SPEC: &[FieldSpec] = &[FieldSpec::Group("shipping", &[FieldSpec::Field("zip")])];
//!
//! let errors = validate(&json!({"shipping": {"zip": ""}}), SPEC);
//! assert!(errors.contains_key("shipping.zip"));
//!
//! let errors = validate(&json!({"shipping": {}}), SPEC);
//! assert!(errors.is_empty());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code for a present-but-empty required field.
pub const REQUIRED: &str = "REQUIRED";

/// Error code for a confirmation field that does not match.
pub const CONFIRM: &str = "CONFIRM";

/// Field errors keyed by dotted path (e.g. `shipping.zip`).
pub type FieldErrors = BTreeMap<String, ValidationError>;

/// A single field error, local or returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Machine-readable code (`REQUIRED`, `CONFIRM`, or an API code).
    #[serde(default)]
    pub code: String,
}

impl ValidationError {
    /// Create an error with the given message and code.
    #[must_use]
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    /// The error reported for an empty required field.
    #[must_use]
    pub fn required() -> Self {
        Self::new("Required", REQUIRED)
    }

    /// The error reported when a confirmation field does not match.
    #[must_use]
    pub fn confirm(message: impl Into<String>) -> Self {
        Self::new(message, CONFIRM)
    }
}

/// One node of a required-field spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSpec {
    /// A field that must not be empty when present.
    Field(&'static str),
    /// A nested object (or array, when the name is an index) checked against
    /// its own spec. Paths are prefixed with `name.`.
    Group(&'static str, &'static [FieldSpec]),
}

/// Validate `data` against `spec`.
///
/// Returns an empty map when every present field is non-empty.
#[must_use]
pub fn validate(data: &Value, spec: &[FieldSpec]) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for node in spec {
        match *node {
            FieldSpec::Field(name) => {
                if let Some(value) = child(data, name)
                    && !value.is_null()
                    && is_empty(value)
                {
                    errors.insert(name.to_owned(), ValidationError::required());
                }
            }
            FieldSpec::Group(name, nested) => {
                let Some(value) = child(data, name) else {
                    continue;
                };
                for (path, error) in validate(value, nested) {
                    errors.insert(format!("{name}.{path}"), error);
                }
            }
        }
    }

    errors
}

/// Look up `key` in an object, or an index in an array.
fn child<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    match data {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Whether a present value counts as empty.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ADDRESS: &[FieldSpec] = &[
        FieldSpec::Group(
            "shipping",
            &[
                FieldSpec::Field("name"),
                FieldSpec::Field("address1"),
                FieldSpec::Field("zip"),
            ],
        ),
        FieldSpec::Group("account", &[FieldSpec::Field("email")]),
    ];

    #[test]
    fn test_absent_fields_are_not_flagged() {
        let errors = validate(&json!({"shipping": {"name": "Ada"}}), ADDRESS);
        assert!(errors.is_empty());

        let errors = validate(&json!({}), ADDRESS);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_null_fields_are_not_flagged() {
        let errors = validate(&json!({"shipping": {"zip": null}}), ADDRESS);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_string_is_required_error() {
        let errors = validate(&json!({"shipping": {"name": "Ada", "zip": ""}}), ADDRESS);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("shipping.zip"), Some(&ValidationError::required()));
    }

    #[test]
    fn test_empty_collections_are_required_errors() {
        const SPEC: &[FieldSpec] = &[FieldSpec::Field("tags"), FieldSpec::Field("options")];
        let errors = validate(&json!({"tags": [], "options": {}}), SPEC);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["tags"].code, REQUIRED);
        assert_eq!(errors["options"].code, REQUIRED);
    }

    #[test]
    fn test_falsy_scalars_are_required_errors() {
        const SPEC: &[FieldSpec] = &[FieldSpec::Field("quantity"), FieldSpec::Field("agree")];
        let errors = validate(&json!({"quantity": 0, "agree": false}), SPEC);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_zero_string_is_not_empty() {
        const SPEC: &[FieldSpec] = &[FieldSpec::Field("zip")];
        assert!(validate(&json!({"zip": "0"}), SPEC).is_empty());
    }

    #[test]
    fn test_multiple_groups_are_prefixed() {
        let data = json!({
            "shipping": {"name": "", "address1": "", "zip": "94107"},
            "account": {"email": ""}
        });
        let errors = validate(&data, ADDRESS);
        let paths: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(paths, ["account.email", "shipping.address1", "shipping.name"]);
    }

    #[test]
    fn test_array_index_groups() {
        const SPEC: &[FieldSpec] = &[
            FieldSpec::Field("name"),
            FieldSpec::Group(
                "contacts",
                &[FieldSpec::Group(
                    "0",
                    &[FieldSpec::Field("first_name"), FieldSpec::Field("last_name")],
                )],
            ),
        ];
        let data = json!({
            "name": "Acme",
            "contacts": [{"first_name": "", "last_name": "Lovelace"}]
        });
        let errors = validate(&data, SPEC);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("contacts.0.first_name"));
    }

    #[test]
    fn test_scalar_group_yields_no_errors() {
        let errors = validate(&json!({"shipping": "same as billing"}), ADDRESS);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_error_serializes_like_api_errors() {
        let errors = validate(&json!({"account": {"email": ""}}), ADDRESS);
        let json = serde_json::to_value(&errors).unwrap_or_default();
        assert_eq!(
            json,
            json!({"account.email": {"message": "Required", "code": "REQUIRED"}})
        );
    }
}
