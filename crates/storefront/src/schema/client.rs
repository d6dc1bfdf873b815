//! HTTP implementation of [`ResourceApi`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument};

use super::cache::ResponseCache;
use super::{ApiResponse, ResourceApi, SchemaError, expand_path};
use crate::config::SchemaConfig;

/// Header carrying the visitor's session token.
pub const SESSION_HEADER: &str = "X-Session";

/// Client for the Schema REST API.
///
/// Cheap to clone. [`SchemaClient::with_session`] returns a copy bound to one
/// visitor; the underlying HTTP client and GET cache stay shared.
#[derive(Clone)]
pub struct SchemaClient {
    inner: Arc<SchemaClientInner>,
    session: Option<Arc<str>>,
}

struct SchemaClientInner {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_key: SecretString,
    cache: ResponseCache,
}

impl SchemaClient {
    /// Create a new Schema API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &SchemaConfig) -> Result<Self, SchemaError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("schema-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(SchemaClientInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
                client_id: config.client_id.clone(),
                client_key: config.client_key.clone(),
                cache: ResponseCache::new(config.cache_ttl),
            }),
            session: None,
        })
    }

    /// Return a client that sends `token` as the visitor's session.
    #[must_use]
    pub fn with_session(&self, token: &str) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            session: Some(Arc::from(token)),
        }
    }

    /// Execute a request against a path template.
    #[instrument(skip(self, method, data), fields(method = %method))]
    async fn execute(
        &self,
        method: Method,
        template: &str,
        data: Value,
    ) -> Result<ApiResponse, SchemaError> {
        let mut params = match data {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(SchemaError::InvalidData(format!(
                    "request data must be an object, got {other}"
                )));
            }
        };
        let path = expand_path(template, &mut params)?;
        let url = format!("{}{path}", self.inner.base_url);

        let is_read = method == Method::GET;
        let query = if is_read { query_pairs(&params) } else { Vec::new() };
        let cache_key = (is_read && ResponseCache::is_cacheable(&path))
            .then(|| ResponseCache::key(&path, &query));

        if let Some(key) = &cache_key
            && let Some(cached) = self.inner.cache.get(key).await
        {
            debug!(path = %path, "Cache hit");
            return Ok(cached);
        }

        let mut request = self
            .inner
            .client
            .request(method, &url)
            .basic_auth(
                &self.inner.client_id,
                Some(self.inner.client_key.expose_secret()),
            );

        if let Some(session) = &self.session {
            request = request.header(SESSION_HEADER, session.as_ref());
        }

        request = if is_read {
            request.query(&query)
        } else {
            request.json(&Value::Object(params))
        };

        // Query strings may carry credentials (`/accounts/:login`); keep URLs
        // out of transport errors, which are logged and sent to Sentry.
        let response = request.send().await.map_err(reqwest::Error::without_url)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SchemaError::RateLimited(retry_after));
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        let decoded = decode_response(status, &body)?;

        if let Some(key) = cache_key {
            self.inner.cache.insert(key, &decoded).await;
        } else if !is_read && !decoded.is_errors() {
            self.inner.cache.invalidate_collection(&path);
        }

        debug!(path = %path, status = %status, "Schema request complete");
        Ok(decoded)
    }
}

#[async_trait]
impl ResourceApi for SchemaClient {
    async fn get(&self, path: &str, data: Value) -> Result<ApiResponse, SchemaError> {
        self.execute(Method::GET, path, data).await
    }

    async fn put(&self, path: &str, data: Value) -> Result<ApiResponse, SchemaError> {
        self.execute(Method::PUT, path, data).await
    }

    async fn post(&self, path: &str, data: Value) -> Result<ApiResponse, SchemaError> {
        self.execute(Method::POST, path, data).await
    }

    async fn delete(&self, path: &str, data: Value) -> Result<ApiResponse, SchemaError> {
        self.execute(Method::DELETE, path, data).await
    }
}

/// Flatten request data into query parameters.
///
/// Scalars are sent as-is, nested values (`{"$ne": "p1"}`) as JSON, nulls are dropped.
fn query_pairs(params: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
                    value.to_string()
                }
            };
            Some((key.clone(), value))
        })
        .collect()
}

/// Decode a response body into an [`ApiResponse`].
///
/// A body with an `errors` key is an error-bearing record regardless of status.
fn decode_response(status: StatusCode, body: &str) -> Result<ApiResponse, SchemaError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(ApiResponse::Null);
    }

    let trimmed = body.trim();
    let value: Value = if trimmed.is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(e) if status.is_success() => {
                tracing::error!(
                    error = %e,
                    body = %trimmed.chars().take(500).collect::<String>(),
                    "Failed to parse Schema response"
                );
                return Err(SchemaError::Parse(e));
            }
            Err(_) => return Err(api_error(status, trimmed)),
        }
    };

    if let Some(errors) = value.get("errors")
        && !errors.is_null()
    {
        return Ok(ApiResponse::Errors(serde_json::from_value(errors.clone())?));
    }

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %trimmed.chars().take(500).collect::<String>(),
            "Schema API returned non-success status"
        );
        return Err(api_error(status, trimmed));
    }

    Ok(if value.is_null() {
        ApiResponse::Null
    } else {
        ApiResponse::Record(value)
    })
}

fn api_error(status: StatusCode, body: &str) -> SchemaError {
    SchemaError::Api {
        status: status.as_u16(),
        message: body.chars().take(200).collect(),
    }
}
