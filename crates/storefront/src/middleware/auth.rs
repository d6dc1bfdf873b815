//! Login extractors.
//!
//! Account pages require a logged-in remote session. The check costs one
//! session read, which the extractor hands on so the handler does not repeat it.

use axum::{extract::FromRequestParts, http::request::Parts};
use schema_storefront_core::AccountId;

use super::session::Visitor;
use crate::context::RequestContext;
use crate::error::AppError;
use crate::schema::{SchemaClient, Session};
use crate::services::{ServiceError, session::get_session};
use crate::state::AppState;

/// Extractor that requires the visitor to be logged in.
///
/// If the visitor is not logged in, rejects with a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(user: RequireLogin) -> Result<Json<Value>> {
///     let mut ctx = user.context();
///     ...
/// }
/// ```
pub struct RequireLogin {
    pub api: SchemaClient,
    pub session: Session,
    pub account_id: AccountId,
}

impl RequireLogin {
    /// Start a workflow context for this request, reusing the session read.
    #[must_use]
    pub fn context(&self) -> RequestContext<'_> {
        RequestContext::with_session(&self.api, self.session.clone())
    }
}

impl FromRequestParts<AppState> for RequireLogin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Visitor(api) = Visitor::from_request_parts(parts, state).await?;

        let session = {
            let mut ctx = RequestContext::new(&api);
            get_session(&mut ctx).await?
        };

        let account_id = session
            .account_id
            .clone()
            .ok_or(ServiceError::LoginRequired)?;

        Ok(Self {
            api,
            session,
            account_id,
        })
    }
}
