//! Payment gateway settings for client-side card tokenization.

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::Result;
use crate::schema::{PaymentGateway, PaymentSettings, ResourceApi};

const CARD_METHOD: &str = "card";
const STRIPE_GATEWAY: &str = "stripe";
const LIVE_MODE: &str = "live";

/// The gateway that processes card payments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardGateway {
    #[serde(flatten)]
    pub gateway: PaymentGateway,
    /// Key for the browser-side SDK, for gateways that use one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishable_key: Option<String>,
}

/// Get the card payment gateway, if card payments are enabled.
///
/// # Errors
///
/// Returns an error if the API call fails.
#[instrument(skip(api))]
pub async fn get_card_gateway(api: &dyn ResourceApi) -> Result<Option<CardGateway>> {
    let settings = api
        .get("/settings/payments", Value::Null)
        .await?
        .into_record::<PaymentSettings>()?
        .unwrap_or_default();

    Ok(card_gateway(settings))
}

fn card_gateway(settings: PaymentSettings) -> Option<CardGateway> {
    let gateway_id = settings
        .methods
        .into_iter()
        .find(|method| method.id == CARD_METHOD)?
        .gateway?;

    let gateway = settings
        .gateways
        .into_iter()
        .find(|gateway| gateway.id == gateway_id)?;

    let publishable_key = if gateway.id == STRIPE_GATEWAY {
        if gateway.mode.as_deref() == Some(LIVE_MODE) {
            gateway.live_publishable_key.clone()
        } else {
            gateway.test_publishable_key.clone()
        }
    } else {
        None
    };

    Some(CardGateway {
        gateway,
        publishable_key,
    })
}
