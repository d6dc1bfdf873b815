//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Visitor session (signed cookie naming the remote Schema session)
//!
//! The [`Visitor`] and [`RequireLogin`] extractors sit on top of the visitor
//! session and bind the Schema client to the visitor's remote session.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::RequireLogin;
pub use request_id::request_id_middleware;
pub use session::{TokenSigner, Visitor, visitor_session_middleware};
