//! Cart resolution and line items.

use schema_storefront_core::{AccountId, ProductId, VariantId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::session::{get_session, put_session};
use super::{Result, request_data};
use crate::context::RequestContext;
use crate::schema::{Cart, Outcome, Record, ShippingService};

/// An item submitted to the cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartItemInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    /// Product option values keyed by option name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Get the visitor's cart.
///
/// With `create_if_none_found`, a cart is created (and linked to the session)
/// when the session has none or its cart no longer exists. Without it nothing
/// is written and `None` is returned instead. A cart without an account is
/// attached to the session's account, if logged in.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip(ctx))]
pub async fn get_cart(
    ctx: &mut RequestContext<'_>,
    create_if_none_found: bool,
) -> Result<Option<Cart>> {
    let session = get_session(ctx).await?;
    let account_id = session.account_id;

    let existing = match &session.cart_id {
        Some(cart_id) => {
            ctx.api()
                .get("/carts/{id}", json!({"id": cart_id}))
                .await?
                .into_record::<Cart>()?
        }
        None => None,
    };

    let cart = match existing {
        Some(cart) => cart,
        None if create_if_none_found => create_cart(ctx, account_id.as_ref()).await?,
        None => return Ok(None),
    };

    match account_id {
        Some(account_id) if cart.account_id.is_none() => {
            debug!(cart_id = %cart.id, account_id = %account_id, "Attaching account to cart");
            let cart = ctx
                .api()
                .put(
                    "/carts/{id}",
                    json!({"id": cart.id, "account_id": account_id}),
                )
                .await?
                .into_required::<Cart>()?;
            Ok(Some(cart))
        }
        _ => Ok(Some(cart)),
    }
}

async fn create_cart(ctx: &mut RequestContext<'_>, account_id: Option<&AccountId>) -> Result<Cart> {
    let cart = ctx
        .api()
        .post("/carts", json!({"account_id": account_id}))
        .await?
        .into_required::<Cart>()?;

    debug!(cart_id = %cart.id, "Created cart");
    put_session(ctx, json!({"cart_id": cart.id})).await?;
    Ok(cart)
}

/// Add an item to `cart`.
///
/// Remote errors (out of stock, unknown variant) are returned untouched.
///
/// # Errors
///
/// Returns an error if the API call fails.
#[instrument(skip(ctx, cart), fields(cart_id = %cart.id))]
pub async fn add_item(
    ctx: &RequestContext<'_>,
    cart: &Cart,
    item: &CartItemInput,
) -> Result<Outcome<Record>> {
    let data = request_data(item, "id", cart.id.as_str())?;
    Ok(ctx
        .api()
        .post("/carts/{id}/items", data)
        .await?
        .into_outcome::<Record>()?)
}

/// Look up a shipping service in the cart's shipment rating.
///
/// An unknown service keeps its ID as the name and has no price, whatever
/// the cart currently stores.
#[must_use]
pub fn resolve_shipping_service(cart: &Cart, service_id: &str) -> ShippingService {
    cart.shipment_rating
        .as_ref()
        .and_then(|rating| rating.services.iter().find(|s| s.id == service_id))
        .cloned()
        .unwrap_or_else(|| ShippingService {
            id: service_id.to_owned(),
            name: service_id.to_owned(),
            price: None,
        })
}
