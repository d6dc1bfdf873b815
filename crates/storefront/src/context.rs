//! Per-request workflow context.

use crate::schema::{ResourceApi, Session};

/// State carried through one storefront request.
///
/// Holds the API handle bound to the visitor and memoizes the remote session
/// so that a workflow touching several helpers reads it at most once. Created
/// by a handler and dropped with the request.
pub struct RequestContext<'a> {
    api: &'a dyn ResourceApi,
    session: Option<Session>,
}

impl<'a> RequestContext<'a> {
    /// Create a context with no session read yet.
    #[must_use]
    pub const fn new(api: &'a dyn ResourceApi) -> Self {
        Self { api, session: None }
    }

    /// Create a context around a session already read for this request.
    #[must_use]
    pub const fn with_session(api: &'a dyn ResourceApi, session: Session) -> Self {
        Self {
            api,
            session: Some(session),
        }
    }

    /// The API handle for this request.
    #[must_use]
    pub const fn api(&self) -> &'a dyn ResourceApi {
        self.api
    }

    /// The session, if it has been read or written during this request.
    #[must_use]
    pub const fn cached_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) fn cache_session(&mut self, session: Session) {
        self.session = Some(session);
    }
}
