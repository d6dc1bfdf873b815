//! End-to-end tests for the Schema storefront.
//!
//! The tests drive a running storefront over HTTP, which in turn talks to a
//! real Schema store. They are `#[ignore]`d so that `cargo test` stays
//! offline.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the storefront against a test store
//! cargo run -p schema-storefront
//!
//! # Run the ignored tests
//! STOREFRONT_BASE_URL=http://localhost:3000 \
//!     cargo test -p schema-storefront-integration-tests -- --ignored
//! ```
//!
//! Tests that need catalog data read `TEST_PRODUCT_ID` and skip themselves
//! when it is unset.

use reqwest::Client;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client that keeps the storefront session cookie between requests,
/// so consecutive calls act as one visitor.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn visitor_client() -> reqwest::Result<Client> {
    Client::builder().cookie_store(true).build()
}

/// A product ID from the test store, if configured.
#[must_use]
pub fn test_product_id() -> Option<String> {
    std::env::var("TEST_PRODUCT_ID").ok().filter(|id| !id.is_empty())
}

/// An email address no other test run will use.
#[must_use]
pub fn unique_email() -> String {
    format!("storefront-test+{}@example.com", uuid::Uuid::new_v4().simple())
}
