//! End-to-end tests for storefront visitor flows.
//!
//! These tests require:
//! - The storefront running (cargo run -p schema-storefront)
//! - Valid Schema credentials in its environment
//!
//! Run with: cargo test -p schema-storefront-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{StatusCode, redirect::Policy};
use schema_storefront_integration_tests::{
    storefront_base_url, test_product_id, unique_email, visitor_client,
};
use serde_json::{Value, json};

// ============================================================================
// Health and cart
// ============================================================================

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_health() {
    let client = visitor_client().unwrap();
    let resp = client
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_new_visitor_has_no_cart() {
    let client = visitor_client().unwrap();
    let resp = client
        .get(format!("{}/cart", storefront_base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), Value::Null);
}

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_checkout_creates_one_cart_per_visitor() {
    let client = visitor_client().unwrap();
    let base_url = storefront_base_url();

    let first: Value = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(first["cart"]["id"].is_string());
    assert_eq!(first["cart"]["id"], second["cart"]["id"]);
}

#[tokio::test]
#[ignore = "requires running storefront and TEST_PRODUCT_ID"]
async fn test_add_item_then_view_cart() {
    let Some(product_id) = test_product_id() else {
        return;
    };
    let client = visitor_client().unwrap();
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&json!({"product_id": product_id, "quantity": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = cart["items"].as_array().unwrap();
    assert!(items.iter().any(|item| item["product_id"] == product_id.as_str()));
}

// ============================================================================
// Checkout validation
// ============================================================================

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_shipping_step_reports_missing_fields() {
    let client = visitor_client().unwrap();
    let base_url = storefront_base_url();

    client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{base_url}/checkout/shipping"))
        .json(&json!({"shipping": {"name": "Ada Lovelace"}}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert!(body["errors"]["shipping.address1"].is_object());
    assert!(body["errors"]["account.email"].is_object());
    assert!(body["errors"].get("shipping.name").is_none());
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_account_page_redirects_when_logged_out() {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap();

    let resp = client
        .get(format!("{}/account", storefront_base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/account-login")
    );
}

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_register_login_logout() {
    let client = visitor_client().unwrap();
    let base_url = storefront_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/account/create"))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": email,
            "password": "analytical-engine-1843"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let account: Value = client
        .get(format!("{base_url}/account"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(account["email"], email.as_str());

    let resp = client
        .post(format!("{base_url}/account/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .post(format!("{base_url}/account-login"))
        .json(&json!({"email": email, "password": "wrong password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json::<Value>().await.unwrap()["result"], "failed");

    let resp = client
        .post(format!("{base_url}/account-login"))
        .json(&json!({"email": email, "password": "analytical-engine-1843"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap()["result"], "success");
}

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_login_without_password_is_unknown() {
    let client = visitor_client().unwrap();
    let resp = client
        .post(format!("{}/account-login", storefront_base_url()))
        .json(&json!({"email": unique_email()}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>().await.unwrap()["result"], "unknown");
}
