//! Customer accounts: registration, profile, login and history.

use schema_storefront_core::{AccountId, FieldErrors, FieldSpec, ValidationError, validate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use super::session::{get_session, put_session};
use super::{Result, ServiceError, request_data};
use crate::context::RequestContext;
use crate::schema::{
    Account, AccountType, Collection, Contact, Order, Outcome, Record, SchemaError,
};

/// Where visitors are sent when a page requires login.
pub const LOGIN_PATH: &str = "/account-login";

const DEFAULT_ORDERS_PAGE: u64 = 1;
const DEFAULT_ORDERS_LIMIT: u64 = 25;

const INDIVIDUAL_GROUP: &str = "customers";
const BUSINESS_GROUP: &str = "wholesale";

const NEW_INDIVIDUAL_REQUIRED: &[FieldSpec] = &[
    FieldSpec::Field("first_name"),
    FieldSpec::Field("last_name"),
    FieldSpec::Field("email"),
    FieldSpec::Field("password"),
];

const NEW_BUSINESS_REQUIRED: &[FieldSpec] = &[
    FieldSpec::Field("first_name"),
    FieldSpec::Field("last_name"),
    FieldSpec::Field("email"),
    FieldSpec::Field("password"),
    FieldSpec::Field("name"),
    FieldSpec::Field("phone"),
];

const PASSWORD_REQUIRED: &[FieldSpec] = &[
    FieldSpec::Field("new_password"),
    FieldSpec::Field("confirm_password"),
];

const INDIVIDUAL_PROFILE_REQUIRED: &[FieldSpec] = &[
    FieldSpec::Field("first_name"),
    FieldSpec::Field("last_name"),
    FieldSpec::Field("email"),
];

const BUSINESS_PROFILE_REQUIRED: &[FieldSpec] = &[
    FieldSpec::Field("name"),
    FieldSpec::Field("phone"),
    FieldSpec::Group(
        "contacts",
        &[FieldSpec::Group(
            "0",
            &[FieldSpec::Field("first_name"), FieldSpec::Field("last_name")],
        )],
    ),
];

// =============================================================================
// Forms
// =============================================================================

/// Registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewAccountForm {
    #[serde(rename = "type", default)]
    pub kind: Option<AccountType>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Business name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Account profile or password change.
///
/// A present `new_password` makes this a password change; every other field
/// is then ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdateForm {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

/// Login form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Paging for the order history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginResult {
    /// Email or password was not submitted.
    Unknown,
    /// The credentials did not match an account.
    Failed,
    /// The session is now logged in.
    Success,
}

/// Fields written when creating or claiming an account.
#[derive(Debug, Serialize)]
struct AccountPayload<'a> {
    #[serde(rename = "type")]
    kind: AccountType,
    group: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contacts: Option<Vec<Contact>>,
}

impl<'a> AccountPayload<'a> {
    fn from_form(form: &'a NewAccountForm) -> Self {
        let kind = form.kind.unwrap_or_default();
        let (group, contacts) = match kind {
            AccountType::Business => (
                BUSINESS_GROUP,
                Some(vec![Contact {
                    first_name: form.first_name.clone(),
                    last_name: form.last_name.clone(),
                    email: form.email.clone(),
                }]),
            ),
            AccountType::Individual => (INDIVIDUAL_GROUP, None),
        };

        Self {
            kind,
            group,
            first_name: form.first_name.as_deref(),
            last_name: form.last_name.as_deref(),
            name: form.name.as_deref(),
            email: form.email.as_deref(),
            password: form.password.as_deref(),
            phone: form.phone.as_deref(),
            contacts,
        }
    }

    const fn required(&self) -> &'static [FieldSpec] {
        match self.kind {
            AccountType::Business => NEW_BUSINESS_REQUIRED,
            AccountType::Individual => NEW_INDIVIDUAL_REQUIRED,
        }
    }
}

/// Profile fields written by [`update_current_account`].
#[derive(Debug, Serialize)]
struct ProfileUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contacts: Option<&'a [Contact]>,
}

// =============================================================================
// Registration and profile
// =============================================================================

/// Register an account and log the session into it.
///
/// Business accounts join the wholesale group with the registrant as their
/// first contact; everyone else is an individual customer. An existing
/// account with the same email but no password (left behind by a guest
/// checkout) is claimed in place instead of creating a duplicate.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip_all)]
pub async fn create_account(
    ctx: &mut RequestContext<'_>,
    form: &NewAccountForm,
) -> Result<Outcome<Account>> {
    let payload = AccountPayload::from_form(form);

    let errors = validate(&serde_json::to_value(&payload)?, payload.required());
    if !errors.is_empty() {
        return Ok(Outcome::Errors(errors));
    }

    let api = ctx.api();
    let existing = match payload.email {
        Some(email) => api
            .get("/accounts/{email}", json!({"email": email}))
            .await?
            .into_record::<Account>()?,
        None => None,
    };

    let response = match existing {
        Some(guest) if !guest.has_password() => {
            debug!(account_id = %guest.id, "Claiming guest account");
            api.put(
                "/accounts/{id}",
                request_data(&payload, "id", guest.id.as_str())?,
            )
            .await?
        }
        _ => api.post("/accounts", serde_json::to_value(&payload)?).await?,
    };

    let outcome = response.into_outcome::<Account>()?;
    if let Outcome::Ok(account) = &outcome {
        info!(account_id = %account.id, "Account registered");
        put_session(ctx, json!({"account_id": account.id})).await?;
    }

    Ok(outcome)
}

/// Update the logged-in account's profile or password.
///
/// # Errors
///
/// Returns [`ServiceError::LoginRequired`] if the session is not logged in,
/// or an error if an API call fails.
#[instrument(skip_all)]
pub async fn update_current_account(
    ctx: &mut RequestContext<'_>,
    form: &AccountUpdateForm,
) -> Result<Outcome<Account>> {
    let account_id = require_login(ctx).await?;
    let data = serde_json::to_value(form)?;

    let update = if let Some(new_password) = &form.new_password {
        let errors = validate(&data, PASSWORD_REQUIRED);
        if !errors.is_empty() {
            return Ok(Outcome::Errors(errors));
        }
        if form.confirm_password.as_ref() != Some(new_password) {
            let mut errors = FieldErrors::new();
            errors.insert(
                "confirm_password".to_owned(),
                ValidationError::confirm("Must match password"),
            );
            return Ok(Outcome::Errors(errors));
        }
        json!({"password": new_password})
    } else {
        let business = form.kind == Some(AccountType::Business);
        let required = if business {
            BUSINESS_PROFILE_REQUIRED
        } else {
            INDIVIDUAL_PROFILE_REQUIRED
        };
        let errors = validate(&data, required);
        if !errors.is_empty() {
            return Ok(Outcome::Errors(errors));
        }
        serde_json::to_value(ProfileUpdate {
            first_name: form.first_name.as_deref(),
            last_name: form.last_name.as_deref(),
            name: form.name.as_deref(),
            email: form.email.as_deref(),
            phone: form.phone.as_deref(),
            contacts: form.contacts.as_deref().filter(|_| business),
        })?
    };

    Ok(ctx
        .api()
        .put(
            "/accounts/{id}",
            request_data(&update, "id", account_id.as_str())?,
        )
        .await?
        .into_outcome::<Account>()?)
}

// =============================================================================
// Login
// =============================================================================

/// Log the session into the account matching `form`.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip_all)]
pub async fn login(ctx: &mut RequestContext<'_>, form: &LoginForm) -> Result<LoginResult> {
    let (Some(email), Some(password)) = (&form.email, &form.password) else {
        return Ok(LoginResult::Unknown);
    };

    let response = ctx
        .api()
        .get(
            "/accounts/:login",
            json!({"email": email, "password": password}),
        )
        .await?;

    let account_id = match response.into_record::<Value>() {
        Ok(Some(account)) => account
            .get("id")
            .and_then(Value::as_str)
            .map(AccountId::from),
        Ok(None) | Err(SchemaError::Rejected(_)) => None,
        Err(e) => return Err(e.into()),
    };

    let Some(account_id) = account_id else {
        debug!("Login failed");
        return Ok(LoginResult::Failed);
    };

    put_session(ctx, json!({"account_id": account_id})).await?;
    info!(account_id = %account_id, "Logged in");
    Ok(LoginResult::Success)
}

/// Log the session out. Does nothing when not logged in.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip_all)]
pub async fn logout(ctx: &mut RequestContext<'_>) -> Result<()> {
    let session = get_session(ctx).await?;
    if session.account_id.is_some() {
        put_session(ctx, json!({"account_id": null})).await?;
    }
    Ok(())
}

/// The logged-in account ID.
///
/// # Errors
///
/// Returns [`ServiceError::LoginRequired`] when the session is not logged
/// in; handlers turn it into a redirect to [`LOGIN_PATH`].
pub async fn require_login(ctx: &mut RequestContext<'_>) -> Result<AccountId> {
    get_session(ctx)
        .await?
        .account_id
        .ok_or(ServiceError::LoginRequired)
}

// =============================================================================
// Account reads
// =============================================================================

/// The logged-in account, or `None` when logged out.
///
/// # Errors
///
/// Returns an error if an API call fails.
pub async fn get_account(ctx: &mut RequestContext<'_>) -> Result<Option<Account>> {
    let Some(account_id) = get_session(ctx).await?.account_id else {
        return Ok(None);
    };
    Ok(ctx
        .api()
        .get("/accounts/{id}", json!({"id": account_id}))
        .await?
        .into_record()?)
}

/// Orders placed by the logged-in account, newest page first.
///
/// # Errors
///
/// Returns an error if an API call fails.
pub async fn get_account_orders(
    ctx: &mut RequestContext<'_>,
    page: OrderPage,
) -> Result<Option<Collection<Order>>> {
    let Some(account_id) = get_session(ctx).await?.account_id else {
        return Ok(None);
    };
    Ok(ctx
        .api()
        .get(
            "/orders",
            json!({
                "account_id": account_id,
                "page": page.page.unwrap_or(DEFAULT_ORDERS_PAGE),
                "limit": page.limit.unwrap_or(DEFAULT_ORDERS_LIMIT),
            }),
        )
        .await?
        .into_record()?)
}

/// Saved addresses of the logged-in account.
///
/// # Errors
///
/// Returns an error if an API call fails.
pub async fn get_account_addresses(
    ctx: &mut RequestContext<'_>,
) -> Result<Option<Collection<Record>>> {
    account_collection(ctx, "/accounts/{id}/addresses").await
}

/// Saved cards of the logged-in account.
///
/// # Errors
///
/// Returns an error if an API call fails.
pub async fn get_account_cards(ctx: &mut RequestContext<'_>) -> Result<Option<Collection<Record>>> {
    account_collection(ctx, "/accounts/{id}/cards").await
}

async fn account_collection(
    ctx: &mut RequestContext<'_>,
    path: &str,
) -> Result<Option<Collection<Record>>> {
    let Some(account_id) = get_session(ctx).await?.account_id else {
        return Ok(None);
    };
    Ok(ctx
        .api()
        .get(path, json!({"id": account_id}))
        .await?
        .into_record()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use schema_storefront_core::CONFIRM;

    use super::*;
    use crate::schema::MockResourceApi;
    use crate::services::testing::{null, record, rejected};

    const SESSION_PATH: &str = "/:sessions/:current";

    fn logged_in(api: &mut MockResourceApi, account_id: &'static str) {
        api.expect_get()
            .withf(|path, _| path == SESSION_PATH)
            .returning(move |_, _| record(json!({"account_id": account_id})));
    }

    fn new_individual() -> NewAccountForm {
        NewAccountForm {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            password: Some("difference-engine".to_string()),
            ..NewAccountForm::default()
        }
    }

    #[tokio::test]
    async fn test_create_account_validation() {
        let api = MockResourceApi::new();
        let mut ctx = RequestContext::new(&api);

        let form = NewAccountForm {
            kind: Some(AccountType::Business),
            name: Some(String::new()),
            phone: Some(String::new()),
            ..new_individual()
        };
        let Outcome::Errors(errors) = create_account(&mut ctx, &form).await.unwrap() else {
            panic!("expected errors");
        };
        let paths: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(paths, ["name", "phone"]);
    }

    #[tokio::test]
    async fn test_create_account_claims_guest_in_place() {
        let mut api = MockResourceApi::new();
        api.expect_get()
            .withf(|path, data| path == "/accounts/{email}" && data["email"] == "ada@example.com")
            .times(1)
            .returning(|_, _| record(json!({"id": "guest1", "email": "ada@example.com"})));
        api.expect_put()
            .withf(|path, data| {
                path == "/accounts/{id}"
                    && data["id"] == "guest1"
                    && data["type"] == "individual"
                    && data["group"] == "customers"
                    && data["password"] == "difference-engine"
            })
            .times(1)
            .returning(|_, _| record(json!({"id": "guest1"})));
        api.expect_post().never();
        api.expect_put()
            .withf(|path, data| path == SESSION_PATH && data["account_id"] == "guest1")
            .times(1)
            .returning(|_, _| record(json!({"account_id": "guest1"})));

        let mut ctx = RequestContext::new(&api);
        let account = create_account(&mut ctx, &new_individual())
            .await
            .unwrap()
            .ok()
            .unwrap();
        assert_eq!(account.id.as_str(), "guest1");
    }

    #[tokio::test]
    async fn test_create_account_with_passworded_match_posts_new() {
        let mut api = MockResourceApi::new();
        api.expect_get()
            .withf(|path, _| path == "/accounts/{email}")
            .returning(|_, _| record(json!({"id": "member1", "password": "hash"})));
        api.expect_post()
            .withf(|path, data| path == "/accounts" && data.get("id").is_none())
            .times(1)
            .returning(|_, _| rejected("email", "Already exists", "UNIQUE"));
        api.expect_put().never();

        let mut ctx = RequestContext::new(&api);
        let outcome = create_account(&mut ctx, &new_individual()).await.unwrap();

        let Outcome::Errors(errors) = outcome else {
            panic!("expected errors");
        };
        assert_eq!(errors["email"].code, "UNIQUE");
    }

    #[tokio::test]
    async fn test_create_business_account() {
        let mut api = MockResourceApi::new();
        api.expect_get().returning(|_, _| null());
        api.expect_post()
            .withf(|path, data| {
                path == "/accounts"
                    && data["type"] == "business"
                    && data["group"] == "wholesale"
                    && data["contacts"]
                        == json!([{
                            "first_name": "Ada",
                            "last_name": "Lovelace",
                            "email": "ada@example.com"
                        }])
            })
            .times(1)
            .returning(|_, _| record(json!({"id": "biz1", "type": "business"})));
        api.expect_put()
            .withf(|path, _| path == SESSION_PATH)
            .times(1)
            .returning(|_, _| record(json!({"account_id": "biz1"})));

        let mut ctx = RequestContext::new(&api);
        let form = NewAccountForm {
            kind: Some(AccountType::Business),
            name: Some("Analytical Engines Ltd".to_string()),
            phone: Some("555-0100".to_string()),
            ..new_individual()
        };
        let outcome = create_account(&mut ctx, &form).await.unwrap();
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_update_requires_login() {
        let mut api = MockResourceApi::new();
        api.expect_get().returning(|_, _| record(json!({})));
        api.expect_put().never();

        let mut ctx = RequestContext::new(&api);
        let err = update_current_account(&mut ctx, &AccountUpdateForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::LoginRequired));
    }

    #[tokio::test]
    async fn test_update_password_mismatch() {
        let mut api = MockResourceApi::new();
        logged_in(&mut api, "a1");
        api.expect_put().never();

        let mut ctx = RequestContext::new(&api);
        let form = AccountUpdateForm {
            new_password: Some("one".to_string()),
            confirm_password: Some("two".to_string()),
            ..AccountUpdateForm::default()
        };
        let Outcome::Errors(errors) = update_current_account(&mut ctx, &form).await.unwrap()
        else {
            panic!("expected errors");
        };
        assert_eq!(errors["confirm_password"].code, CONFIRM);
        assert_eq!(errors["confirm_password"].message, "Must match password");
    }

    #[tokio::test]
    async fn test_update_password_only() {
        let mut api = MockResourceApi::new();
        logged_in(&mut api, "a1");
        api.expect_put()
            .withf(|path, data| {
                path == "/accounts/{id}" && data == &json!({"id": "a1", "password": "s3cret"})
            })
            .times(1)
            .returning(|_, _| record(json!({"id": "a1"})));

        let mut ctx = RequestContext::new(&api);
        let form = AccountUpdateForm {
            first_name: Some("Ignored".to_string()),
            new_password: Some("s3cret".to_string()),
            confirm_password: Some("s3cret".to_string()),
            ..AccountUpdateForm::default()
        };
        assert!(
            update_current_account(&mut ctx, &form)
                .await
                .unwrap()
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_update_business_profile_requires_contact() {
        let mut api = MockResourceApi::new();
        logged_in(&mut api, "a1");

        let mut ctx = RequestContext::new(&api);
        let form = AccountUpdateForm {
            kind: Some(AccountType::Business),
            name: Some("Analytical Engines Ltd".to_string()),
            phone: Some("555-0100".to_string()),
            contacts: Some(vec![Contact {
                first_name: Some(String::new()),
                last_name: Some("Lovelace".to_string()),
                email: None,
            }]),
            ..AccountUpdateForm::default()
        };
        let Outcome::Errors(errors) = update_current_account(&mut ctx, &form).await.unwrap()
        else {
            panic!("expected errors");
        };
        assert!(errors.contains_key("contacts.0.first_name"));
    }

    #[tokio::test]
    async fn test_update_individual_profile_sends_present_fields() {
        let mut api = MockResourceApi::new();
        logged_in(&mut api, "a1");
        api.expect_put()
            .withf(|path, data| {
                path == "/accounts/{id}"
                    && data
                        == &json!({
                            "id": "a1",
                            "first_name": "Ada",
                            "last_name": "King",
                            "email": "ada@example.com"
                        })
            })
            .times(1)
            .returning(|_, _| record(json!({"id": "a1", "last_name": "King"})));

        let mut ctx = RequestContext::new(&api);
        let form = AccountUpdateForm {
            first_name: Some("Ada".to_string()),
            last_name: Some("King".to_string()),
            email: Some("ada@example.com".to_string()),
            contacts: Some(Vec::new()),
            ..AccountUpdateForm::default()
        };
        let account = update_current_account(&mut ctx, &form)
            .await
            .unwrap()
            .ok()
            .unwrap();
        assert_eq!(account.last_name.as_deref(), Some("King"));
    }

    #[tokio::test]
    async fn test_login_missing_fields_is_unknown() {
        let api = MockResourceApi::new();
        let mut ctx = RequestContext::new(&api);

        let form = LoginForm {
            email: Some("ada@example.com".to_string()),
            password: None,
        };
        assert_eq!(login(&mut ctx, &form).await.unwrap(), LoginResult::Unknown);
    }

    #[tokio::test]
    async fn test_login_success_sets_session() {
        let mut api = MockResourceApi::new();
        api.expect_get()
            .withf(|path, data| path == "/accounts/:login" && data["password"] == "pw")
            .times(1)
            .returning(|_, _| record(json!({"id": "a1"})));
        api.expect_put()
            .withf(|path, data| path == SESSION_PATH && data["account_id"] == "a1")
            .times(1)
            .returning(|_, _| record(json!({"account_id": "a1"})));

        let mut ctx = RequestContext::new(&api);
        let form = LoginForm {
            email: Some("ada@example.com".to_string()),
            password: Some("pw".to_string()),
        };
        assert_eq!(login(&mut ctx, &form).await.unwrap(), LoginResult::Success);
    }

    #[tokio::test]
    async fn test_login_wrong_password_fails() {
        let mut api = MockResourceApi::new();
        api.expect_get().returning(|_, _| null());
        api.expect_put().never();

        let mut ctx = RequestContext::new(&api);
        let form = LoginForm {
            email: Some("ada@example.com".to_string()),
            password: Some("wrong".to_string()),
        };
        assert_eq!(login(&mut ctx, &form).await.unwrap(), LoginResult::Failed);
    }

    #[tokio::test]
    async fn test_logout_when_logged_out_is_noop() {
        let mut api = MockResourceApi::new();
        api.expect_get().returning(|_, _| record(json!({"account_id": null})));
        api.expect_put().never();

        let mut ctx = RequestContext::new(&api);
        logout(&mut ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_clears_account() {
        let mut api = MockResourceApi::new();
        logged_in(&mut api, "a1");
        api.expect_put()
            .withf(|path, data| path == SESSION_PATH && data == &json!({"account_id": null}))
            .times(1)
            .returning(|_, _| record(json!({"account_id": null})));

        let mut ctx = RequestContext::new(&api);
        logout(&mut ctx).await.unwrap();
        assert!(require_login(&mut ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_account_reads_when_logged_out() {
        let mut api = MockResourceApi::new();
        api.expect_get()
            .withf(|path, _| path == SESSION_PATH)
            .times(1)
            .returning(|_, _| record(json!({})));

        let mut ctx = RequestContext::new(&api);
        assert!(get_account(&mut ctx).await.unwrap().is_none());
        assert!(get_account_orders(&mut ctx, OrderPage::default()).await.unwrap().is_none());
        assert!(get_account_addresses(&mut ctx).await.unwrap().is_none());
        assert!(get_account_cards(&mut ctx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_account_orders_default_paging() {
        let mut api = MockResourceApi::new();
        logged_in(&mut api, "a1");
        api.expect_get()
            .withf(|path, data| {
                path == "/orders" && data == &json!({"account_id": "a1", "page": 1, "limit": 25})
            })
            .times(1)
            .returning(|_, _| {
                record(json!({"count": 1, "page": 1, "results": [{"id": "o1", "number": 1001}]}))
            });

        let mut ctx = RequestContext::new(&api);
        let orders = get_account_orders(&mut ctx, OrderPage::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(orders.count, 1);
        assert_eq!(orders.results[0].number, "1001");
    }

    #[tokio::test]
    async fn test_account_cards() {
        let mut api = MockResourceApi::new();
        logged_in(&mut api, "a1");
        api.expect_get()
            .withf(|path, data| path == "/accounts/{id}/cards" && data["id"] == "a1")
            .times(1)
            .returning(|_, _| record(json!({"count": 1, "results": [{"id": "card1", "last4": "4242"}]})));

        let mut ctx = RequestContext::new(&api);
        let cards = get_account_cards(&mut ctx).await.unwrap().unwrap();
        assert_eq!(cards.results[0]["last4"], "4242");
    }
}
