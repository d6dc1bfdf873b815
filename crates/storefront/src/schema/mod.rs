//! Schema commerce API client.
//!
//! # Architecture
//!
//! - [`ResourceApi`] is the seam every workflow talks through: GET/PUT/POST/DELETE
//!   against a path template plus a JSON data map
//! - [`SchemaClient`] implements it over HTTP with `reqwest` and caches GETs
//!   in-memory via `moka`
//! - Schema is the source of truth - sessions, carts, accounts and orders all
//!   live remotely; nothing is synced locally
//!
//! # Path templates
//!
//! Paths may contain `{name}` placeholders that are filled from the request
//! data (and removed from it), e.g. `/carts/{id}` with `{"id": "c1", "coupon_code": "X"}`
//! requests `/carts/c1` with body `{"coupon_code": "X"}`. Segments starting
//! with `:` (`/:sessions/:current`, `/accounts/:login`) are resolved by the API.
//!
//! # Example
//!
//! ```rust,ignore
//! use schema_storefront::schema::{ResourceApi, SchemaClient};
//!
//! let client = SchemaClient::new(&config.schema)?.with_session(&visitor_token);
//! let product = client
//!     .get("/products/{id}", serde_json::json!({"id": "shoes", "active": true}))
//!     .await?
//!     .into_record::<Product>()?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::SchemaClient;
pub use types::*;

use async_trait::async_trait;
use schema_storefront_core::FieldErrors;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the Schema API.
///
/// Field-level validation failures are *not* errors at this level; they come
/// back as [`ApiResponse::Errors`] and become [`Outcome::Errors`].
#[derive(Debug, Error)]
pub enum SchemaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// API returned a non-success status without field errors.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A `{name}` placeholder had no matching value in the request data.
    #[error("Missing path parameter `{0}`")]
    MissingPathParam(String),

    /// Request data was not a JSON object.
    #[error("Invalid request data: {0}")]
    InvalidData(String),

    /// A read returned field errors where a record was expected.
    #[error("Request rejected: {}", format_field_errors(.0))]
    Rejected(FieldErrors),

    /// A write returned no record.
    #[error("Empty response")]
    EmptyResponse,
}

/// A decoded API response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// A record or collection.
    Record(Value),
    /// Nothing found (`404` or a `null` body).
    Null,
    /// An error-bearing record: field path to error.
    Errors(FieldErrors),
}

impl ApiResponse {
    /// Decode a read: `Null` becomes `None`, field errors become
    /// [`SchemaError::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejected the request or the record does not
    /// deserialize into `T`.
    pub fn into_record<T: DeserializeOwned>(self) -> Result<Option<T>, SchemaError> {
        match self {
            Self::Record(value) => Ok(Some(serde_json::from_value(value)?)),
            Self::Null => Ok(None),
            Self::Errors(errors) => Err(SchemaError::Rejected(errors)),
        }
    }

    /// Decode a write: field errors are passed through untouched as
    /// [`Outcome::Errors`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API returned nothing or the record does not
    /// deserialize into `T`.
    pub fn into_outcome<T: DeserializeOwned>(self) -> Result<Outcome<T>, SchemaError> {
        match self {
            Self::Record(value) => Ok(Outcome::Ok(serde_json::from_value(value)?)),
            Self::Null => Err(SchemaError::EmptyResponse),
            Self::Errors(errors) => Ok(Outcome::Errors(errors)),
        }
    }

    /// Decode a response that must carry a record.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyResponse`] for `Null`, otherwise as
    /// [`ApiResponse::into_record`].
    pub fn into_required<T: DeserializeOwned>(self) -> Result<T, SchemaError> {
        self.into_record()?.ok_or(SchemaError::EmptyResponse)
    }

    /// Whether this is an error-bearing record.
    #[must_use]
    pub const fn is_errors(&self) -> bool {
        matches!(self, Self::Errors(_))
    }
}

/// CRUD access to Schema resources.
///
/// `data` must be a JSON object (or `null`); it supplies path placeholders,
/// query parameters for GET, and the body for writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Read a record or collection.
    async fn get(&self, path: &str, data: Value) -> Result<ApiResponse, SchemaError>;

    /// Update (merge) a record.
    async fn put(&self, path: &str, data: Value) -> Result<ApiResponse, SchemaError>;

    /// Create a record.
    async fn post(&self, path: &str, data: Value) -> Result<ApiResponse, SchemaError>;

    /// Delete a record.
    async fn delete(&self, path: &str, data: Value) -> Result<ApiResponse, SchemaError>;
}

/// Fill `{name}` placeholders in `template` from `data`, removing used keys.
///
/// # Errors
///
/// Returns [`SchemaError::MissingPathParam`] if a placeholder has no non-null
/// value in `data`.
pub fn expand_path(
    template: &str,
    data: &mut serde_json::Map<String, Value>,
) -> Result<String, SchemaError> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((before, after)) = rest.split_once('{') {
        let Some((name, tail)) = after.split_once('}') else {
            break;
        };
        let value = match data.remove(name) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => {
                return Err(SchemaError::MissingPathParam(name.to_string()));
            }
            Some(other) => other.to_string(),
        };

        path.push_str(before);
        path.push_str(&urlencoding::encode(&value));
        rest = tail;
    }

    path.push_str(rest);
    Ok(path)
}

fn format_field_errors(errors: &FieldErrors) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|(path, error)| format!("{path}: {} ({})", error.message, error.code))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use schema_storefront_core::ValidationError;
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        }
    }

    #[test]
    fn test_expand_path_consumes_placeholders() {
        let mut data = object(json!({"id": "c1", "coupon_code": "SAVE"}));
        let path = expand_path("/carts/{id}", &mut data).unwrap();
        assert_eq!(path, "/carts/c1");
        assert_eq!(Value::Object(data), json!({"coupon_code": "SAVE"}));
    }

    #[test]
    fn test_expand_path_encodes_values() {
        let mut data = object(json!({"email": "ada+shop@example.com"}));
        let path = expand_path("/accounts/{email}", &mut data).unwrap();
        assert_eq!(path, "/accounts/ada%2Bshop%40example.com");
    }

    #[test]
    fn test_expand_path_nested_resource() {
        let mut data = object(json!({"id": "a1", "limit": 5}));
        let path = expand_path("/accounts/{id}/addresses", &mut data).unwrap();
        assert_eq!(path, "/accounts/a1/addresses");
        assert_eq!(Value::Object(data), json!({"limit": 5}));
    }

    #[test]
    fn test_expand_path_leaves_api_segments() {
        let mut data = object(json!({}));
        let path = expand_path("/:sessions/:current", &mut data).unwrap();
        assert_eq!(path, "/:sessions/:current");
    }

    #[test]
    fn test_expand_path_missing_param() {
        let mut data = object(json!({"id": null}));
        let err = expand_path("/carts/{id}", &mut data).unwrap_err();
        assert!(matches!(err, SchemaError::MissingPathParam(name) if name == "id"));
    }

    #[test]
    fn test_into_outcome_passes_errors_through() {
        let mut errors = FieldErrors::new();
        errors.insert(
            "items.0.quantity".to_string(),
            ValidationError::new("Out of stock", "STOCK"),
        );
        let outcome = ApiResponse::Errors(errors.clone())
            .into_outcome::<Value>()
            .unwrap();
        assert_eq!(outcome, Outcome::Errors(errors));
    }

    #[test]
    fn test_into_record_null_is_none() {
        let record = ApiResponse::Null.into_record::<Value>().unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_rejected_error_display() {
        let mut errors = FieldErrors::new();
        errors.insert("email".to_string(), ValidationError::required());
        let err = SchemaError::Rejected(errors);
        assert_eq!(err.to_string(), "Request rejected: email: Required (REQUIRED)");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = SchemaError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
