use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db,
    domain::{Branding, OrganizationName, OrganizationRole, Permission},
    error::AppError,
    features::layout::{self, Flash},
    session::AuthenticatedSession,
    tenant::{self, TenantContext},
    views::{self, ViewKey},
    AppState,
};

/// One row for the members table on the org settings page.
pub struct MemberRow {
    pub email: String,
    pub role_label: &'static str,
}

/// Organization settings body fragment.
#[derive(Template)]
#[template(path = "organization_settings.html")]
pub struct OrganizationSettingsTemplate {
    pub name: String,
    pub slug: String,
    pub plan: String,
    pub primary_color: String,
    pub logo_url: String,
    pub members: Vec<MemberRow>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrganizationSettingsForm {
    #[validate(length(min = 1, max = 400))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 16))]
    pub primary_color: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub logo_url: String,
}

async fn render_body(state: &AppState, context: &TenantContext) -> Result<String, AppError> {
    let organization = &context.current.organization;
    let members = db::organizations::list_members_with_email(&state.db, &context.organization_id).await?;
    let branding = organization.branding();

    let template = OrganizationSettingsTemplate {
        name: organization.name.clone(),
        slug: organization.slug.clone(),
        plan: organization.plan.clone(),
        primary_color: branding.primary_color.unwrap_or_default(),
        logo_url: branding.logo_url.unwrap_or_default(),
        members: members
            .into_iter()
            .map(|m| MemberRow {
                email: m.email,
                role_label: m
                    .role
                    .parse::<OrganizationRole>()
                    .map(|r| r.label())
                    .unwrap_or("不明"),
            })
            .collect(),
    };
    layout::render(&template)
}

/// GET /dashboard/settings/organization — Name, branding and members (owners/admins).
pub async fn show(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> Response {
    let context = match layout::page_context(&state, &session, Permission::ManageOrganization).await {
        Ok(context) => context,
        Err(response) => return response,
    };

    let key = ViewKey::new(views::ORGANIZATION_SETTINGS, context.organization_id.as_str(), context.role());
    let body = state
        .views
        .get_or_render(key, || render_body(&state, &context))
        .await
        .unwrap_or_else(|err| layout::degraded_body(views::ORGANIZATION_SETTINGS, &err));

    layout::render_page(&context, "組織設定", flash, body).into_response()
}

/// POST /dashboard/settings/organization — Update name and branding.
pub async fn update(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<OrganizationSettingsForm>,
) -> Result<Redirect, AppError> {
    if form.validate().is_err() {
        return Ok(layout::redirect_with_error(views::ORGANIZATION_SETTINGS, "入力内容を確認してください。"));
    }
    let name = match OrganizationName::new(&form.name) {
        Ok(name) => name,
        Err(_) => {
            return Ok(layout::redirect_with_error(
                views::ORGANIZATION_SETTINGS,
                "組織名は1〜100文字で入力してください。",
            ))
        }
    };
    let branding = match Branding::new(&form.primary_color, &form.logo_url) {
        Ok(branding) => branding,
        Err(msg) => return Ok(layout::redirect_with_error(views::ORGANIZATION_SETTINGS, msg)),
    };

    let context = tenant::authorize(&state, &session, Permission::ManageOrganization).await?;

    let updated =
        db::organizations::update_settings(&state.db, &context.organization_id, &name, &branding).await?;
    if !updated {
        return Err(AppError::NotFound);
    }

    tracing::info!(
        organization_id = %context.organization_id,
        user_id = %context.user_id,
        "organization settings updated"
    );
    state.views.revalidate_path(views::ORGANIZATION_SETTINGS);
    state.views.revalidate_path(views::DASHBOARD);

    Ok(layout::redirect_with_success(views::ORGANIZATION_SETTINGS, "組織設定を保存しました。"))
}

pub fn routes() -> Router<AppState> {
    Router::new().route(views::ORGANIZATION_SETTINGS, get(show).post(update))
}
