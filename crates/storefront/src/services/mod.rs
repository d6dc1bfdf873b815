//! Storefront workflows over the Schema API.
//!
//! # Services
//!
//! - `session` - Read and update the visitor's remote session
//! - `cart` - Resolve the visitor's cart, add items, price shipping services
//! - `checkout` - Shipping and billing steps, ending in order conversion
//! - `order` - Convert a cart into an order
//! - `account` - Registration, profile updates, login/logout, account history
//! - `catalog` - Products, related products and category listings
//! - `payments` - Card gateway settings for the checkout page
//! - `leads` - Contact form submissions
//!
//! Workflows that depend on the visitor take a [`RequestContext`](crate::context::RequestContext);
//! catalog-style reads take the API handle directly. Field errors, local or
//! remote, come back as [`Outcome::Errors`](crate::schema::Outcome::Errors) and
//! never as [`ServiceError`].

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
mod error;
pub mod leads;
pub mod order;
pub mod payments;
pub mod session;

pub use error::{Result, ServiceError};

use serde::Serialize;
use serde_json::Value;

use crate::schema::SchemaError;

/// Serialize `body` into request data and set `key` (usually a path
/// placeholder) to `value`.
pub(crate) fn request_data(body: &impl Serialize, key: &str, value: &str) -> Result<Value> {
    let mut data = match serde_json::to_value(body)? {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(SchemaError::InvalidData(format!(
                "request body must be an object, got {other}"
            ))
            .into());
        }
    };
    data.insert(key.to_owned(), Value::String(value.to_owned()));
    Ok(Value::Object(data))
}
