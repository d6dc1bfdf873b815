//! Cart to order conversion.

use serde_json::json;
use tracing::{info, instrument};

use super::Result;
use super::session::put_session;
use crate::context::RequestContext;
use crate::schema::{Cart, Order, Outcome};

/// Convert `cart` into an order.
///
/// On success the session drops the cart and is logged in as the order's
/// account, so a guest who just checked out can see their receipt. On failure
/// neither the session nor the cart is touched and the conversion can be
/// retried with the same cart.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip(ctx, cart), fields(cart_id = %cart.id))]
pub async fn convert_cart(ctx: &mut RequestContext<'_>, cart: &Cart) -> Result<Outcome<Order>> {
    let outcome = ctx
        .api()
        .post("/orders", json!({"cart_id": cart.id}))
        .await?
        .into_outcome::<Order>()?;

    if let Outcome::Ok(order) = &outcome {
        info!(order_id = %order.id, number = %order.number, "Cart converted to order");
        put_session(
            ctx,
            json!({"cart_id": null, "account_id": order.account_id}),
        )
        .await?;
    }

    Ok(outcome)
}
