//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::middleware::session::TokenSigner;
use crate::schema::SchemaClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The Schema client inside is
/// not bound to a visitor; handlers get a bound copy through
/// [`Visitor`](crate::middleware::Visitor).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    schema: SchemaClient,
    signer: TokenSigner,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Schema HTTP client cannot be built or the
    /// session secret is rejected.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let schema = SchemaClient::new(&config.schema)?;
        let signer = TokenSigner::new(&config.session_secret)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                schema,
                signer,
            }),
        })
    }

    /// Get the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the shared Schema API client.
    #[must_use]
    pub fn schema(&self) -> &SchemaClient {
        &self.inner.schema
    }

    /// Get the visitor cookie signer.
    #[must_use]
    pub fn token_signer(&self) -> &TokenSigner {
        &self.inner.signer
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl AppState {
    /// State pointed at an unreachable API.
    pub(crate) fn for_tests() -> Self {
        use std::time::Duration;

        use secrecy::SecretString;
        use url::Url;

        use crate::config::SchemaConfig;

        Self::new(StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            schema: SchemaConfig {
                api_url: Url::parse("http://127.0.0.1:9").unwrap(),
                client_id: "test-store".to_string(),
                client_key: SecretString::from("k7Qz2pX9mW4vR8tY".to_string()),
                cache_ttl: Duration::from_secs(60),
                timeout: Duration::from_secs(1),
            },
            session_secret: SecretString::from("c7Hm2vQ9xK4pT8wL1nR6zB3f".to_string()),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        })
        .unwrap()
    }
}
