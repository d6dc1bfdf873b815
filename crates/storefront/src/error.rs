//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use schema_storefront_core::FieldErrors;
use serde_json::json;
use thiserror::Error;

use crate::schema::{Outcome, SchemaError};
use crate::services::ServiceError;
use crate::services::account::LOGIN_PATH;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Schema API operation failed.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The visitor must log in first.
    #[error("Login required")]
    LoginRequired,

    /// Submitted fields failed validation, locally or remotely.
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Schema(err) => Self::Schema(err),
            ServiceError::LoginRequired => Self::LoginRequired,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::LoginRequired => return Redirect::to(LOGIN_PATH).into_response(),
            Self::Validation(errors) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"errors": errors})),
                )
                    .into_response();
            }
            Self::Schema(SchemaError::RateLimited(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Schema(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Schema(SchemaError::RateLimited(_)) => {
                "Service busy, please try again".to_string()
            }
            Self::Schema(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({"error": message}))).into_response()
    }
}

impl AppError {
    fn is_server_error(&self) -> bool {
        matches!(self, Self::Internal(_))
            || matches!(self, Self::Schema(err) if !matches!(err, SchemaError::RateLimited(_)))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unwrap a successful outcome, turning field errors into a 422 response.
///
/// # Errors
///
/// Returns [`AppError::Validation`] with the errors exactly as produced.
pub fn accept<T>(outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Ok(value) => Ok(value),
        Outcome::Errors(errors) => Err(AppError::Validation(errors)),
    }
}

/// Set the Sentry user context from an account ID.
///
/// Call this after login to associate errors with the account.
pub fn set_sentry_user(account_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(account_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the account.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for visitor actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "5f1a")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
