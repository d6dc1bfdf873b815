//! Cart route handlers.
//!
//! The cart ID lives in the visitor's remote session, so every handler here
//! goes through the [`Visitor`] client.

use axum::Json;
use tracing::instrument;

use crate::context::RequestContext;
use crate::error::{AppError, Result, accept, add_breadcrumb};
use crate::middleware::Visitor;
use crate::schema::{Cart, Record};
use crate::services::cart::{CartItemInput, add_item, get_cart};

/// Show the current cart, or `null` when the visitor has none.
///
/// GET /cart
#[instrument(skip_all)]
pub async fn show(Visitor(api): Visitor) -> Result<Json<Option<Cart>>> {
    let mut ctx = RequestContext::new(&api);
    Ok(Json(get_cart(&mut ctx, false).await?))
}

/// Add an item, creating the cart if needed.
///
/// POST /cart/add
#[instrument(skip_all)]
pub async fn add(Visitor(api): Visitor, Json(item): Json<CartItemInput>) -> Result<Json<Record>> {
    let mut ctx = RequestContext::new(&api);

    let cart = get_cart(&mut ctx, true)
        .await?
        .ok_or_else(|| AppError::Internal("Cart was not created".to_string()))?;

    let product_id = item
        .product_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));

    let line = accept(add_item(&ctx, &cart, &item).await?)?;
    Ok(Json(line))
}
