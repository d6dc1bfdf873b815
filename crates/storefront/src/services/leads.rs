//! Contact form leads.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::Result;
use crate::schema::{Outcome, Record, ResourceApi};

/// A contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
struct NewLead<'a> {
    #[serde(flatten)]
    form: &'a LeadForm,
    status: &'static str,
}

/// Record a new lead.
///
/// # Errors
///
/// Returns an error if the API call fails.
#[instrument(skip_all)]
pub async fn post_lead(api: &dyn ResourceApi, form: &LeadForm) -> Result<Outcome<Record>> {
    let outcome = api
        .post(
            "/leads",
            serde_json::to_value(NewLead { form, status: "new" })?,
        )
        .await?
        .into_outcome::<Record>()?;

    if outcome.is_ok() {
        info!("Lead submitted");
    }
    Ok(outcome)
}
