//! Account route handlers.
//!
//! Registration, login and logout work for any visitor. Everything else
//! takes [`RequireLogin`] and redirects to the login page when logged out.

use axum::{
    Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::context::RequestContext;
use crate::error::{AppError, Result, accept, clear_sentry_user, set_sentry_user};
use crate::format;
use crate::middleware::{RequireLogin, Visitor};
use crate::schema::{Account, Collection, Order, Record};
use crate::services::account::{
    AccountUpdateForm, LoginForm, LoginResult, NewAccountForm, OrderPage, create_account,
    get_account, get_account_addresses, get_account_cards, get_account_orders, login as log_in,
    logout as log_out, update_current_account,
};

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub result: LoginResult,
}

/// An order with its date and total formatted for display.
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub display_date: String,
    pub display_total: String,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        let display_date = order
            .date_created
            .as_deref()
            .map(format::date)
            .unwrap_or_default();
        let display_total = format::currency(&Value::Object(order.extra.clone()), "grand_total");

        Self {
            order,
            display_date,
            display_total,
        }
    }
}

// =============================================================================
// Registration and login
// =============================================================================

/// Register an account and log in.
///
/// POST /account/create
#[instrument(skip_all)]
pub async fn create(
    Visitor(api): Visitor,
    Json(form): Json<NewAccountForm>,
) -> Result<(StatusCode, Json<Account>)> {
    let mut ctx = RequestContext::new(&api);
    let account = accept(create_account(&mut ctx, &form).await?)?;

    set_sentry_user(&account.id);
    Ok((StatusCode::CREATED, Json(account)))
}

/// Log in with email and password.
///
/// POST /account-login
#[instrument(skip_all)]
pub async fn login(Visitor(api): Visitor, Json(form): Json<LoginForm>) -> Result<Response> {
    let mut ctx = RequestContext::new(&api);
    let result = log_in(&mut ctx, &form).await?;

    let status = match result {
        LoginResult::Success => {
            if let Some(account_id) = ctx.cached_session().and_then(|s| s.account_id.as_ref()) {
                set_sentry_user(account_id);
            }
            StatusCode::OK
        }
        LoginResult::Failed => StatusCode::UNAUTHORIZED,
        LoginResult::Unknown => StatusCode::BAD_REQUEST,
    };

    Ok((status, Json(LoginResponse { result })).into_response())
}

/// Log out.
///
/// POST /account/logout
#[instrument(skip_all)]
pub async fn logout(Visitor(api): Visitor) -> Result<StatusCode> {
    let mut ctx = RequestContext::new(&api);
    log_out(&mut ctx).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Logged-in pages
// =============================================================================

/// Show the current account.
///
/// GET /account
#[instrument(skip_all, fields(account_id = %user.account_id))]
pub async fn index(user: RequireLogin) -> Result<Json<Account>> {
    let mut ctx = user.context();
    get_account(&mut ctx)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Account".to_string()))
}

/// Update the current account's profile or password.
///
/// POST /account
#[instrument(skip_all, fields(account_id = %user.account_id))]
pub async fn update(
    user: RequireLogin,
    Json(form): Json<AccountUpdateForm>,
) -> Result<Json<Account>> {
    let mut ctx = user.context();
    Ok(Json(accept(update_current_account(&mut ctx, &form).await?)?))
}

/// Show order history.
///
/// GET /account/orders
#[instrument(skip_all, fields(account_id = %user.account_id))]
pub async fn orders(
    user: RequireLogin,
    Query(page): Query<OrderPage>,
) -> Result<Json<Collection<OrderSummary>>> {
    let mut ctx = user.context();
    let orders = get_account_orders(&mut ctx, page).await?.unwrap_or_default();

    Ok(Json(Collection {
        count: orders.count,
        results: orders.results.into_iter().map(OrderSummary::from).collect(),
        page: orders.page,
    }))
}

/// Show saved addresses.
///
/// GET /account/addresses
#[instrument(skip_all, fields(account_id = %user.account_id))]
pub async fn addresses(user: RequireLogin) -> Result<Json<Collection<Record>>> {
    let mut ctx = user.context();
    Ok(Json(get_account_addresses(&mut ctx).await?.unwrap_or_default()))
}

/// Show saved cards.
///
/// GET /account/cards
#[instrument(skip_all, fields(account_id = %user.account_id))]
pub async fn cards(user: RequireLogin) -> Result<Json<Collection<Record>>> {
    let mut ctx = user.context();
    Ok(Json(get_account_cards(&mut ctx).await?.unwrap_or_default()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_summary_formats_date_and_total() {
        let order: Order = serde_json::from_value(json!({
            "id": "ord1",
            "number": 100042,
            "date_created": "2024-03-09T17:45:00.000Z",
            "grand_total": 1234.5
        }))
        .unwrap();

        let summary = serde_json::to_value(OrderSummary::from(order)).unwrap();
        assert_eq!(summary["number"], "100042");
        assert_eq!(summary["display_date"], "2024-03-09");
        assert_eq!(summary["display_total"], "$1,234.50");
    }

    #[test]
    fn test_order_summary_without_date() {
        let order: Order = serde_json::from_value(json!({"id": "ord2", "number": "7"})).unwrap();

        let summary = OrderSummary::from(order);
        assert_eq!(summary.display_date, "");
        assert_eq!(summary.display_total, "$0.00");
    }
}
