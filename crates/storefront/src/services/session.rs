//! The visitor's remote session.
//!
//! Schema keeps one session per `X-Session` token. It links the visitor to a
//! cart and, once logged in, an account.

use serde_json::Value;
use tracing::instrument;

use super::Result;
use crate::context::RequestContext;
use crate::schema::Session;

const SESSION_PATH: &str = "/:sessions/:current";

/// Get the current session, reading it from the API at most once per request.
///
/// A visitor without a remote session gets an empty one.
///
/// # Errors
///
/// Returns an error if the API call fails.
#[instrument(skip(ctx))]
pub async fn get_session(ctx: &mut RequestContext<'_>) -> Result<Session> {
    if let Some(session) = ctx.cached_session() {
        return Ok(session.clone());
    }

    let session = ctx
        .api()
        .get(SESSION_PATH, Value::Null)
        .await?
        .into_record::<Session>()?
        .unwrap_or_default();

    ctx.cache_session(session.clone());
    Ok(session)
}

/// Merge `data` into the current session and return the result.
///
/// # Errors
///
/// Returns an error if the API call fails or rejects the update.
#[instrument(skip(ctx, data))]
pub async fn put_session(ctx: &mut RequestContext<'_>, data: Value) -> Result<Session> {
    let session = ctx
        .api()
        .put(SESSION_PATH, data)
        .await?
        .into_required::<Session>()?;

    ctx.cache_session(session.clone());
    Ok(session)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::MockResourceApi;
    use crate::services::testing::{null, record};

    #[tokio::test]
    async fn test_get_session_reads_once() {
        let mut api = MockResourceApi::new();
        api.expect_get()
            .withf(|path, _| path == SESSION_PATH)
            .times(1)
            .returning(|_, _| record(json!({"cart_id": "c1", "account_id": null})));

        let mut ctx = RequestContext::new(&api);
        let first = get_session(&mut ctx).await.unwrap();
        let second = get_session(&mut ctx).await.unwrap();

        assert_eq!(first.cart_id.unwrap().as_str(), "c1");
        assert!(second.account_id.is_none());
    }

    #[tokio::test]
    async fn test_get_session_null_is_empty() {
        let mut api = MockResourceApi::new();
        api.expect_get().times(1).returning(|_, _| null());

        let mut ctx = RequestContext::new(&api);
        let session = get_session(&mut ctx).await.unwrap();
        assert_eq!(session, Session::default());
    }

    #[tokio::test]
    async fn test_put_session_updates_cache() {
        let mut api = MockResourceApi::new();
        api.expect_put()
            .withf(|path, data| path == SESSION_PATH && data == &json!({"account_id": "a1"}))
            .times(1)
            .returning(|_, _| record(json!({"account_id": "a1", "cart_id": "c1"})));
        api.expect_get().never();

        let mut ctx = RequestContext::new(&api);
        put_session(&mut ctx, json!({"account_id": "a1"}))
            .await
            .unwrap();
        let session = get_session(&mut ctx).await.unwrap();

        assert_eq!(session.account_id.unwrap().as_str(), "a1");
    }
}
