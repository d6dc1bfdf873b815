//! Checkout route handlers.

use axum::Json;
use serde::Serialize;
use tracing::instrument;

use crate::context::RequestContext;
use crate::error::{AppError, Result, accept, add_breadcrumb};
use crate::middleware::Visitor;
use crate::schema::{Cart, SchemaClient};
use crate::services::cart::get_cart;
use crate::services::checkout::{
    BillingForm, CheckoutRedirect, CheckoutStep, ShippingForm, checkout,
};
use crate::services::payments::{CardGateway, get_card_gateway};

/// Checkout page data.
#[derive(Debug, Serialize)]
pub struct CheckoutPage {
    pub cart: Cart,
    /// Gateway for client-side card tokenization, when cards are accepted.
    pub card_gateway: Option<CardGateway>,
}

/// Start checkout, creating the cart if needed.
///
/// GET /checkout
#[instrument(skip_all)]
pub async fn show(Visitor(api): Visitor) -> Result<Json<CheckoutPage>> {
    let mut ctx = RequestContext::new(&api);

    let cart = get_cart(&mut ctx, true)
        .await?
        .ok_or_else(|| AppError::Internal("Cart was not created".to_string()))?;
    let card_gateway = get_card_gateway(ctx.api()).await?;

    Ok(Json(CheckoutPage { cart, card_gateway }))
}

/// Submit the shipping step.
///
/// POST /checkout/shipping
#[instrument(skip_all)]
pub async fn shipping(
    Visitor(api): Visitor,
    Json(form): Json<ShippingForm>,
) -> Result<Json<CheckoutRedirect>> {
    run_step(&api, CheckoutStep::Shipping(form)).await
}

/// Submit the billing step and place the order.
///
/// POST /checkout/billing
#[instrument(skip_all)]
pub async fn billing(
    Visitor(api): Visitor,
    Json(form): Json<BillingForm>,
) -> Result<Json<CheckoutRedirect>> {
    let redirect = run_step(&api, CheckoutStep::Billing(form)).await?;
    add_breadcrumb("checkout", "Order placed", None);
    Ok(redirect)
}

async fn run_step(
    api: &SchemaClient,
    step: CheckoutStep,
) -> Result<Json<CheckoutRedirect>> {
    let mut ctx = RequestContext::new(api);

    let cart = get_cart(&mut ctx, false)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart".to_string()))?;

    Ok(Json(accept(checkout(&mut ctx, &cart, &step).await?)?))
}
