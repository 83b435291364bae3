use axum::{extract::State, response::Redirect, routing::post, Form, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::app::{
    domain::OrganizationId,
    error::AppError,
    session::{self, AuthenticatedSession},
    tenant, views, AppState,
};

#[derive(Debug, Deserialize)]
pub struct SelectOrganizationForm {
    pub organization_id: String,
}

/// POST /dashboard/organizations/select — Switch the active organization.
///
/// Membership is checked before the preference cookie is written; selecting an
/// organization the caller does not belong to is `NotFound`.
pub async fn submit(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SelectOrganizationForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    // Canonical form, so the cookie compares equal to stored ids.
    let organization_id = OrganizationId::from_string(&form.organization_id)
        .map_err(|_| AppError::NotFound)?
        .as_str();
    let role = tenant::require_org_member(&state, &session.user_id, &organization_id).await?;

    tracing::debug!(user_id = %session.user_id, %organization_id, %role, "active organization selected");
    state.views.revalidate_path(views::DASHBOARD);

    Ok((
        jar.add(session::active_organization_cookie(organization_id)),
        Redirect::to(views::DASHBOARD),
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard/organizations/select", post(submit))
}
