//! Visitor sessions.
//!
//! The storefront keeps no visitor state of its own. A signed cookie carries
//! the opaque token Schema uses to find the visitor's remote session; the cart
//! and login live there. Nothing is held server-side, so tokens survive
//! restarts and there is nothing to evict.
//!
//! A token is only issued (and the cookie only set) when a handler asks for
//! a [`Visitor`]; catalog pages and health checks never get a cookie.

use std::sync::{Arc, OnceLock};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::schema::SchemaClient;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "schema_session";

/// Session cookie lifetime in days.
const SESSION_MAX_AGE_DAYS: i64 = 30;

/// Signs visitor tokens so that clients cannot choose their own.
#[derive(Clone)]
pub struct TokenSigner {
    mac: Hmac<Sha256>,
}

impl TokenSigner {
    /// Create a signer keyed by `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the key is rejected.
    pub fn new(secret: &SecretString) -> Result<Self, AppError> {
        let mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|e| AppError::Internal(format!("Invalid session secret: {e}")))?;
        Ok(Self { mac })
    }

    /// Cookie value for `token`: `<token>.<hex hmac>`.
    #[must_use]
    pub fn sign(&self, token: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(token.as_bytes());
        format!("{token}.{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// The token in a signed cookie value, if the signature holds.
    #[must_use]
    pub fn verify(&self, value: &str) -> Option<String> {
        let (token, signature) = value.rsplit_once('.')?;
        Uuid::parse_str(token).ok()?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(token.as_bytes());
        // Constant-time comparison
        mac.verify_slice(&signature).ok()?;

        Some(token.to_string())
    }
}

/// The visitor token for the current request, filled on first use.
#[derive(Clone)]
struct VisitorSlot(Arc<OnceLock<String>>);

/// Middleware that reads the visitor token from the session cookie and sets
/// the cookie when a new token was issued during the request.
///
/// Cookies with a bad signature are ignored, as if absent.
pub async fn visitor_session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = session_cookie_value(request.headers())
        .and_then(|value| state.token_signer().verify(&value));
    let from_cookie = existing.is_some();

    let slot = Arc::new(OnceLock::new());
    if let Some(token) = existing {
        let _ = slot.set(token);
    }
    request
        .extensions_mut()
        .insert(VisitorSlot(Arc::clone(&slot)));

    let mut response = next.run(request).await;

    if !from_cookie && let Some(token) = slot.get() {
        let cookie = session_cookie(
            state.token_signer().sign(token),
            state.config().is_secure(),
        );
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
                debug!("Issued visitor session token");
            }
            Err(e) => warn!(error = %e, "Failed to encode session cookie"),
        }
    }

    response
}

fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| Cookie::split_parse(header))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}

/// Extractor for a Schema client bound to the current visitor.
///
/// Issues the visitor a token on first use. Requires
/// [`visitor_session_middleware`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Visitor(api): Visitor) -> Result<Json<Value>> {
///     let mut ctx = RequestContext::new(&api);
///     let cart = get_cart(&mut ctx, false).await?;
///     ...
/// }
/// ```
pub struct Visitor(pub SchemaClient);

impl FromRequestParts<AppState> for Visitor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let VisitorSlot(slot) = parts.extensions.get::<VisitorSlot>().cloned().ok_or_else(|| {
            AppError::Internal("Visitor session middleware not installed".to_string())
        })?;

        let token = slot.get_or_init(|| Uuid::new_v4().to_string());
        Ok(Self(state.schema().with_session(token)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router, body::Body, http::Request as HttpRequest, middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(&SecretString::from("c7Hm2vQ9xK4pT8wL1nR6zB3f".to_string())).unwrap()
    }

    #[test]
    fn test_signed_token_verifies() {
        let token = Uuid::new_v4().to_string();
        let value = signer().sign(&token);
        assert_eq!(signer().verify(&value), Some(token));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let value = signer().sign(&Uuid::new_v4().to_string());
        let (_, signature) = value.rsplit_once('.').unwrap();

        let forged = format!("{}.{signature}", Uuid::new_v4());
        assert_eq!(signer().verify(&forged), None);

        let other = TokenSigner::new(&SecretString::from("Zq8Wn3Lr5Tx1Vb7Mk2Hy6Pc4".to_string()))
            .unwrap();
        assert_eq!(other.verify(&value), None);

        assert_eq!(signer().verify("not-a-token"), None);
        assert_eq!(signer().verify(&signer().sign("admin")), None);
    }

    fn app() -> Router {
        let state = AppState::for_tests();
        Router::new()
            .route("/visit", get(|Visitor(_): Visitor| async { "ok" }))
            .route("/plain", get(|| async { "ok" }))
            .layer(from_fn_with_state(state.clone(), visitor_session_middleware))
            .with_state(state)
    }

    async fn set_cookie(uri: &str, cookie: Option<&str>) -> Option<String> {
        let mut request = HttpRequest::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_visitor_issued_signed_cookie() {
        let issued = set_cookie("/visit", None).await.unwrap();
        assert!(issued.starts_with("schema_session="));
        assert!(issued.contains("HttpOnly"));

        let pair = issued.split(';').next().unwrap();
        let value = pair.trim_start_matches("schema_session=");
        assert!(signer().verify(value).is_some());

        // A returning visitor keeps their token
        assert_eq!(set_cookie("/visit", Some(pair)).await, None);
    }

    #[tokio::test]
    async fn test_no_cookie_without_visitor() {
        assert_eq!(set_cookie("/plain", None).await, None);
    }

    #[tokio::test]
    async fn test_forged_cookie_replaced() {
        let forged = format!("schema_session={}.00ff", Uuid::new_v4());
        assert!(set_cookie("/visit", Some(&forged)).await.is_some());
    }
}
