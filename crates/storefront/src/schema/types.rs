//! Domain types for Schema records.
//!
//! Each struct names the fields the storefront acts on and keeps everything
//! else the API returns in a flattened `extra` map, so a record can be handed
//! to a view without losing data.

use rust_decimal::Decimal;
use schema_storefront_core::{
    AccountId, AddressId, CardId, CartId, CategoryId, FieldErrors, OrderId, ProductId, VariantId,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An untyped remote record.
pub type Record = serde_json::Map<String, Value>;

// =============================================================================
// Outcome
// =============================================================================

/// Result of a step that can fail field validation, locally or remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The step succeeded.
    Ok(T),
    /// Field path to error, exactly as produced.
    Errors(FieldErrors),
}

impl<T> Outcome<T> {
    /// Map the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Ok(value) => Outcome::Ok(f(value)),
            Self::Errors(errors) => Outcome::Errors(errors),
        }
    }

    /// Whether the step succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// The success value, if any.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Errors(_) => None,
        }
    }
}

impl<T> From<FieldErrors> for Outcome<T> {
    fn from(errors: FieldErrors) -> Self {
        Self::Errors(errors)
    }
}

// =============================================================================
// Session
// =============================================================================

/// The current visitor's remote session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Logged-in account, if any.
    pub account_id: Option<AccountId>,
    /// Active cart, if any.
    pub cart_id: Option<CartId>,
    #[serde(flatten)]
    pub extra: Record,
}

// =============================================================================
// Cart
// =============================================================================

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub account_id: Option<AccountId>,
    pub shipping: Option<CartShipping>,
    pub billing: Option<CartBilling>,
    pub shipment_rating: Option<ShipmentRating>,
    pub coupon_code: Option<String>,
    pub comments: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub extra: Record,
}

/// A line item in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Option<String>,
    pub product_id: Option<ProductId>,
    pub variant_id: Option<VariantId>,
    pub quantity: Option<i64>,
    #[serde(flatten)]
    pub extra: Record,
}

/// Shipping details stored on a cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartShipping {
    pub name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    /// Saved account address this shipping info was taken from.
    pub account_address_id: Option<AddressId>,
    /// Selected shipping service ID.
    pub service: Option<String>,
    pub price: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Record,
}

/// Billing details stored on a cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartBilling {
    pub name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    /// Payment method (e.g. `card`).
    pub method: Option<String>,
    /// Saved account card this billing info was taken from.
    pub account_card_id: Option<CardId>,
    /// Tokenized card details.
    pub card: Option<Value>,
    #[serde(flatten)]
    pub extra: Record,
}

/// Shipping options computed by the API for a cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRating {
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<ShippingService>,
    #[serde(flatten)]
    pub extra: Record,
}

/// A shipping service and its price.
///
/// A `None` price means the service is no longer offered for this cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingService {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub price: Option<Decimal>,
}

// =============================================================================
// Account
// =============================================================================

/// Account type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Individual,
    Business,
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(rename = "type")]
    pub kind: Option<AccountType>,
    pub group: Option<String>,
    pub email: Option<String>,
    /// Present only when the account has a password set.
    #[serde(default, skip_serializing)]
    pub password: Option<Value>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Business name.
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contacts: Vec<Contact>,
    pub shipping: Option<AccountShipping>,
    pub billing: Option<AccountBilling>,
    #[serde(flatten)]
    pub extra: Record,
}

impl Account {
    /// Whether the account has a password.
    ///
    /// Accounts without one were created during a guest checkout and may be
    /// claimed by registering with the same email.
    #[must_use]
    pub const fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

/// A business account contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Default shipping stored on an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountShipping {
    pub account_address_id: Option<AddressId>,
    #[serde(flatten)]
    pub extra: Record,
}

/// Default billing stored on an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountBilling {
    pub account_card_id: Option<CardId>,
    #[serde(flatten)]
    pub extra: Record,
}

// =============================================================================
// Order
// =============================================================================

/// An order converted from a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Customer-facing order number.
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    pub account_id: Option<AccountId>,
    pub date_created: Option<String>,
    #[serde(flatten)]
    pub extra: Record,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Record,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Record,
}

/// A product's membership in a category, with the product expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProduct {
    pub product_id: Option<ProductId>,
    pub product: Option<Product>,
    #[serde(flatten)]
    pub extra: Record,
}

/// A page of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<T> {
    /// Total number of matching records.
    #[serde(default)]
    pub count: u64,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    pub page: Option<u64>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
            page: None,
        }
    }
}

// =============================================================================
// Payment settings
// =============================================================================

/// Store payment settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub methods: Vec<PaymentMethod>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gateways: Vec<PaymentGateway>,
}

/// An enabled payment method (e.g. `card`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    /// Gateway ID processing this method.
    pub gateway: Option<String>,
    #[serde(flatten)]
    pub extra: Record,
}

/// A configured payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentGateway {
    pub id: String,
    /// `live` or `test`.
    pub mode: Option<String>,
    pub live_publishable_key: Option<String>,
    pub test_publishable_key: Option<String>,
    #[serde(flatten)]
    pub extra: Record,
}

// =============================================================================
// Deserialize helpers
// =============================================================================

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept order numbers sent as either strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
