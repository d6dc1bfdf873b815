//! HTTP route handlers for storefront.
//!
//! Every route speaks JSON. Field errors from a workflow come back as
//! `422 {"errors": {...}}`; account pages redirect to `/account-login` when
//! logged out.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//!
//! # Catalog
//! GET  /products/{id}              - Product with related products
//! GET  /categories/{id}/products   - Category listing
//!
//! # Cart
//! GET  /cart                       - Current cart (null if none)
//! POST /cart/add                   - Add item (creates cart)
//!
//! # Checkout
//! GET  /checkout                   - Cart (creates) and card gateway
//! POST /checkout/shipping          - Shipping step
//! POST /checkout/billing           - Billing step and order placement
//!
//! # Account
//! POST /account/create             - Register
//! POST /account-login              - Login
//! POST /account/logout             - Logout
//! GET  /account                    - Account (requires login)
//! POST /account                    - Update profile or password (requires login)
//! GET  /account/orders             - Order history (requires login)
//! GET  /account/addresses          - Saved addresses (requires login)
//! GET  /account/cards              - Saved cards (requires login)
//!
//! # Contact
//! POST /contact                    - Submit a lead
//! ```

pub mod account;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::services::account::LOGIN_PATH;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/shipping", post(checkout::shipping))
        .route("/billing", post(checkout::billing))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index).post(account::update))
        .route("/create", post(account::create))
        .route("/logout", post(account::logout))
        .route("/orders", get(account::orders))
        .route("/addresses", get(account::addresses))
        .route("/cards", get(account::cards))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/products/{id}", get(products::show))
        .route("/categories/{id}/products", get(products::category))
        // Cart and checkout
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        // Account
        .route(LOGIN_PATH, post(account::login))
        .nest("/account", account_routes())
        // Contact
        .route("/contact", post(contact::submit))
}
