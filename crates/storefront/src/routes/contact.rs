//! Contact form route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::{Result, accept};
use crate::schema::Record;
use crate::services::leads::{LeadForm, post_lead};
use crate::state::AppState;

/// Submit a contact form message as a lead.
///
/// POST /contact
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<LeadForm>,
) -> Result<(StatusCode, Json<Record>)> {
    let lead = accept(post_lead(state.schema(), &form).await?)?;
    Ok((StatusCode::CREATED, Json(lead)))
}
