//! Workflow error types.

use thiserror::Error;

use crate::schema::SchemaError;

/// Errors that stop a storefront workflow.
///
/// Field errors are not in here: they are part of a normal [`Outcome`](crate::schema::Outcome).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The Schema API could not be reached or answered unexpectedly.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The visitor must log in first.
    #[error("login required")]
    LoginRequired,
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(SchemaError::Parse(err))
    }
}

/// Result alias for workflow functions.
pub type Result<T> = std::result::Result<T, ServiceError>;
