use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::app::{
    db,
    domain::Permission,
    error::AppError,
    features::{
        layout::{self, Flash},
        organization::create::OrganizationNewTemplate,
    },
    session::AuthenticatedSession,
    tenant::{self, TenantContext},
    views::{self, ViewKey},
    AppState,
};

/// Overview body fragment. Shows only data whose mutations revalidate
/// `/dashboard`: organization settings and the number of stores.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub organization_name: String,
    pub plan: String,
    pub role_label: &'static str,
    pub store_count: usize,
    pub can_create_store: bool,
    pub can_manage_store_settings: bool,
    pub can_manage_organization: bool,
}

async fn render_body(state: &AppState, context: &TenantContext) -> Result<String, AppError> {
    let stores = db::stores::list_for_organization(&state.db, &context.organization_id).await?;

    let template = DashboardTemplate {
        organization_name: context.current.organization.name.clone(),
        plan: context.current.organization.plan.clone(),
        role_label: context.role().label(),
        store_count: stores.len(),
        can_create_store: context.can(Permission::CreateStore),
        can_manage_store_settings: context.can(Permission::ManageStoreSettings),
        can_manage_organization: context.can(Permission::ManageOrganization),
    };
    layout::render(&template)
}

/// GET /dashboard — Overview of the current organization, or a prompt to
/// create the first one.
pub async fn show(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> Response {
    let Some(context) = tenant::resolve_or_none(&state, &session).await else {
        return match layout::render(&OrganizationNewTemplate::new(true, flash)) {
            Ok(html) => Html(html).into_response(),
            Err(err) => err.into_response(),
        };
    };

    if let Err(err) = context.require(Permission::ViewDashboard) {
        return err.into_response();
    }

    let key = ViewKey::new(views::DASHBOARD, context.organization_id.as_str(), context.role());
    let body = state
        .views
        .get_or_render(key, || render_body(&state, &context))
        .await
        .unwrap_or_else(|err| layout::degraded_body(views::DASHBOARD, &err));

    layout::render_page(&context, "ダッシュボード", flash, body).into_response()
}

/// Dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(views::DASHBOARD, get(show))
}
