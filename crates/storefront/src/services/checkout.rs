//! Two-step checkout: shipping, then billing and conversion.
//!
//! Each step validates its form locally, writes an allow-listed update to the
//! cart, and stops at the first set of field errors, local or remote. Saved
//! address and card selections are pushed to the account as its defaults on
//! a best-effort basis.

use rust_decimal::Decimal;
use schema_storefront_core::{AccountId, AddressId, CardId, FieldSpec, validate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::cart::resolve_shipping_service;
use super::order::convert_cart;
use super::{Result, request_data};
use crate::context::RequestContext;
use crate::schema::{Account, ApiResponse, Cart, Outcome, Record};

/// Where the shipping step sends the visitor next.
pub const BILLING_STEP_PATH: &str = "/checkout/billing";

const SHIPPING_REQUIRED: &[FieldSpec] = &[
    FieldSpec::Group(
        "shipping",
        &[
            FieldSpec::Field("name"),
            FieldSpec::Field("address1"),
            FieldSpec::Field("city"),
            FieldSpec::Field("zip"),
            FieldSpec::Field("country"),
        ],
    ),
    FieldSpec::Group("account", &[FieldSpec::Field("email")]),
];

const BILLING_REQUIRED: &[FieldSpec] = &[FieldSpec::Group(
    "billing",
    &[
        FieldSpec::Field("name"),
        FieldSpec::Field("address1"),
        FieldSpec::Field("city"),
        FieldSpec::Field("zip"),
        FieldSpec::Field("country"),
        FieldSpec::Field("method"),
    ],
)];

// =============================================================================
// Forms
// =============================================================================

/// The checkout step being submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutStep {
    Shipping(ShippingForm),
    Billing(BillingForm),
}

/// Shipping step form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<CheckoutAccountInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Shipping address fields, plus the chosen shipping service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Saved address the visitor picked, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_address_id: Option<AddressId>,
    /// Shipping service ID from the cart's shipment rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Contact details collected during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutAccountInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Billing step form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<BillingInput>,
}

/// Billing address and payment fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Payment method, e.g. `card`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Card token from the payment gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Value>,
}

/// A completed step and where to go next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRedirect {
    pub ok: bool,
    pub redirect: String,
}

impl CheckoutRedirect {
    fn to(path: impl Into<String>) -> Self {
        Self {
            ok: true,
            redirect: path.into(),
        }
    }
}

// =============================================================================
// Steps
// =============================================================================

/// Run one checkout step against `cart`.
///
/// Shipping redirects to the billing step. Billing converts the cart and
/// redirects to the receipt for the new order.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip_all, fields(cart_id = %cart.id))]
pub async fn checkout(
    ctx: &mut RequestContext<'_>,
    cart: &Cart,
    step: &CheckoutStep,
) -> Result<Outcome<CheckoutRedirect>> {
    match step {
        CheckoutStep::Shipping(form) => Ok(update_cart_shipping(ctx, cart, form)
            .await?
            .map(|_| CheckoutRedirect::to(BILLING_STEP_PATH))),
        CheckoutStep::Billing(form) => {
            let updated = match update_cart_billing(ctx, cart, form).await? {
                Outcome::Ok(updated) => updated,
                Outcome::Errors(errors) => return Ok(Outcome::Errors(errors)),
            };
            Ok(convert_cart(ctx, &updated)
                .await?
                .map(|order| CheckoutRedirect::to(format!("/receipt/{}", order.number))))
        }
    }
}

/// Apply the shipping step to `cart`.
///
/// The email in `account` is matched to an existing account, or a new one is
/// created for it. Moving the cart to a different account clears the
/// previous account's shipping and billing details first.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip_all, fields(cart_id = %cart.id))]
pub async fn update_cart_shipping(
    ctx: &RequestContext<'_>,
    cart: &Cart,
    form: &ShippingForm,
) -> Result<Outcome<Cart>> {
    let errors = validate(&serde_json::to_value(form)?, SHIPPING_REQUIRED);
    if !errors.is_empty() {
        return Ok(Outcome::Errors(errors));
    }

    let api = ctx.api();
    let mut update = Record::new();

    if let Some(shipping) = &form.shipping {
        let fields = shipping_update(cart, shipping)?;
        if !fields.is_empty() {
            update.insert("shipping".to_owned(), Value::Object(fields));
        }
    }

    if let Some(email) = form.account.as_ref().and_then(|a| a.email.as_deref()) {
        let existing = api
            .get("/accounts/:first", json!({"email": email}))
            .await?
            .into_record::<Account>()?;

        let account_id = if let Some(existing) = existing {
            if cart.account_id.as_ref().is_some_and(|id| *id != existing.id) {
                debug!(account_id = %existing.id, "Switching cart account, clearing addresses");
                let cleared = api
                    .put(
                        "/carts/{id}",
                        json!({"id": cart.id, "shipping": null, "billing": null}),
                    )
                    .await?;
                if let ApiResponse::Errors(errors) = cleared {
                    return Ok(Outcome::Errors(errors));
                }
            }
            existing.id
        } else {
            let phone = form.shipping.as_ref().and_then(|s| s.phone.as_deref());
            match api
                .post("/accounts", json!({"email": email, "phone": phone}))
                .await?
                .into_outcome::<Account>()?
            {
                Outcome::Ok(account) => account.id,
                Outcome::Errors(errors) => return Ok(Outcome::Errors(errors)),
            }
        };
        update.insert("account_id".to_owned(), json!(account_id));
    }

    if let Some(coupon_code) = &form.coupon_code {
        update.insert("coupon_code".to_owned(), json!(coupon_code));
    }
    if let Some(comments) = &form.comments {
        update.insert("comments".to_owned(), json!(comments));
    }

    let updated = match api
        .put("/carts/{id}", request_data(&update, "id", cart.id.as_str())?)
        .await?
        .into_outcome::<Cart>()?
    {
        Outcome::Ok(updated) => updated,
        errors @ Outcome::Errors(_) => return Ok(errors),
    };

    let address_id = updated
        .shipping
        .as_ref()
        .and_then(|s| s.account_address_id.clone());
    if let (Some(address_id), Some(account_id)) = (address_id, &updated.account_id) {
        sync_account_default(ctx, account_id, &AccountDefault::Address(address_id)).await;
    }

    Ok(Outcome::Ok(updated))
}

/// Apply the billing step to `cart`.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip_all, fields(cart_id = %cart.id))]
pub async fn update_cart_billing(
    ctx: &RequestContext<'_>,
    cart: &Cart,
    form: &BillingForm,
) -> Result<Outcome<Cart>> {
    let errors = validate(&serde_json::to_value(form)?, BILLING_REQUIRED);
    if !errors.is_empty() {
        return Ok(Outcome::Errors(errors));
    }

    let mut update = Record::new();
    if let Some(billing) = &form.billing {
        let fields = serde_json::to_value(billing)?;
        if fields.as_object().is_some_and(|f| !f.is_empty()) {
            update.insert("billing".to_owned(), fields);
        }
    }

    let updated = match ctx
        .api()
        .put("/carts/{id}", request_data(&update, "id", cart.id.as_str())?)
        .await?
        .into_outcome::<Cart>()?
    {
        Outcome::Ok(updated) => updated,
        errors @ Outcome::Errors(_) => return Ok(errors),
    };

    let card_id = updated
        .billing
        .as_ref()
        .and_then(|b| b.account_card_id.clone());
    if let (Some(card_id), Some(account_id)) = (card_id, &updated.account_id) {
        sync_account_default(ctx, account_id, &AccountDefault::Card(card_id)).await;
    }

    Ok(Outcome::Ok(updated))
}

/// Build the cart `shipping` update from the allow-listed form fields.
fn shipping_update(cart: &Cart, shipping: &ShippingInput) -> Result<Record> {
    let mut fields = match serde_json::to_value(shipping)? {
        Value::Object(fields) => fields,
        _ => Record::new(),
    };
    fields.remove("service");

    if let Some(service_id) = &shipping.service {
        let service = resolve_shipping_service(cart, service_id);
        if let Some(price) = service.price {
            fields.insert("service".to_owned(), json!(service.id));
            fields.insert("price".to_owned(), decimal_value(price));
        } else {
            fields.insert("service".to_owned(), Value::Null);
            fields.insert("price".to_owned(), Value::Null);
        }
    }

    Ok(fields)
}

/// A JSON number for `value`, keeping its exact digits.
fn decimal_value(value: Decimal) -> Value {
    value
        .normalize()
        .to_string()
        .parse::<serde_json::Number>()
        .map_or_else(|_| Value::String(value.to_string()), Value::Number)
}

// =============================================================================
// Account defaults
// =============================================================================

/// A saved selection to make the account's default.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AccountDefault {
    Address(AddressId),
    Card(CardId),
}

impl AccountDefault {
    fn is_current(&self, account: &Account) -> bool {
        match self {
            Self::Address(id) => account
                .shipping
                .as_ref()
                .and_then(|s| s.account_address_id.as_ref())
                == Some(id),
            Self::Card(id) => account
                .billing
                .as_ref()
                .and_then(|b| b.account_card_id.as_ref())
                == Some(id),
        }
    }

    fn update(&self) -> Value {
        match self {
            Self::Address(id) => json!({"shipping": {"account_address_id": id}}),
            Self::Card(id) => json!({"billing": {"account_card_id": id}}),
        }
    }
}

/// Make `default` the account's default address or card.
///
/// Failures are logged and otherwise ignored; the checkout step has already
/// succeeded.
async fn sync_account_default(
    ctx: &RequestContext<'_>,
    account_id: &AccountId,
    default: &AccountDefault,
) {
    let api = ctx.api();

    let account = match api
        .get("/accounts/{id}", json!({"id": account_id}))
        .await
        .and_then(ApiResponse::into_record::<Account>)
    {
        Ok(Some(account)) => account,
        Ok(None) => {
            warn!(account_id = %account_id, "Account not found while saving checkout defaults");
            return;
        }
        Err(e) => {
            warn!(account_id = %account_id, error = %e, "Failed to load account defaults");
            return;
        }
    };

    if default.is_current(&account) {
        return;
    }

    let data = match request_data(&default.update(), "id", account_id.as_str()) {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "Failed to build account defaults update");
            return;
        }
    };

    match api.put("/accounts/{id}", data).await {
        Ok(ApiResponse::Errors(errors)) => {
            warn!(account_id = %account_id, ?errors, "Account rejected checkout defaults");
        }
        Ok(_) => debug!(account_id = %account_id, ?default, "Saved checkout defaults"),
        Err(e) => warn!(account_id = %account_id, error = %e, "Failed to save checkout defaults"),
    }
}
