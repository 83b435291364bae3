//! Dashboard page frame shared by every tenant page.
//!
//! The frame (organization switcher, flash messages) is per user and is never
//! cached. Only the body fragment goes through `ViewCache`.

use askama::Template;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::app::{
    domain::Permission,
    error::AppError,
    session::SessionContext,
    tenant::{self, TenantContext},
    views, AppState, APP_NAME,
};

/// `?error=` / `?success=` feedback after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub error: Option<String>,
    pub success: Option<String>,
}

pub struct OrganizationOption {
    pub id: String,
    pub name: String,
    pub role_label: &'static str,
    pub selected: bool,
}

pub struct Chrome {
    pub organization_name: String,
    pub role_label: &'static str,
    pub brand_color: String,
    pub logo_url: String,
    pub organizations: Vec<OrganizationOption>,
}

impl Chrome {
    pub fn for_context(context: &TenantContext) -> Self {
        let branding = context.current.organization.branding();
        Self {
            organization_name: context.current.organization.name.clone(),
            role_label: context.role().label(),
            brand_color: branding.primary_color.unwrap_or_else(|| "#7a4bd1".to_string()),
            logo_url: branding.logo_url.unwrap_or_default(),
            organizations: context
                .memberships
                .iter()
                .map(|m| OrganizationOption {
                    id: m.organization.id.clone(),
                    name: m.organization.name.clone(),
                    role_label: m.role.label(),
                    selected: m.organization.id == context.current.organization.id,
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard_page.html")]
pub struct DashboardPage {
    pub app_name: &'static str,
    pub title: &'static str,
    pub chrome: Chrome,
    pub error: String,
    pub success: String,
    pub body: String,
}

/// Wrap a rendered body fragment in the dashboard frame.
pub fn render_page(
    context: &TenantContext,
    title: &'static str,
    flash: Flash,
    body: String,
) -> Result<Html<String>, AppError> {
    let page = DashboardPage {
        app_name: APP_NAME,
        title,
        chrome: Chrome::for_context(context),
        error: flash.error.unwrap_or_default(),
        success: flash.success.unwrap_or_default(),
        body,
    };
    Ok(Html(render(&page)?))
}

/// Resolve the tenant for a page view and require `permission` in it.
/// No organization sends the user to the dashboard, which offers to create one.
pub async fn page_context(
    state: &AppState,
    session: &SessionContext,
    permission: Permission,
) -> Result<TenantContext, Response> {
    let Some(context) = tenant::resolve_or_none(state, session).await else {
        return Err(Redirect::to(views::DASHBOARD).into_response());
    };
    context.require(permission).map_err(IntoResponse::into_response)?;
    Ok(context)
}

/// Body shown when a page's data could not be loaded. Never cached.
pub fn degraded_body(path: &str, err: &AppError) -> String {
    tracing::error!(path, %err, "page data unavailable");
    "<p class=\"notice\">データを読み込めませんでした。しばらくしてから再度お試しください。</p>".to_string()
}

/// Render any template, logging failures.
pub fn render<T: Template>(template: &T) -> Result<String, AppError> {
    template.render().map_err(|err| {
        tracing::error!(%err, "template render failed");
        AppError::Internal
    })
}

/// Redirect carrying an error flash. `path` may already have a query string.
pub fn redirect_with_error(path: &str, msg: &str) -> Redirect {
    with_flash(path, "error", msg)
}

pub fn redirect_with_success(path: &str, msg: &str) -> Redirect {
    with_flash(path, "success", msg)
}

fn with_flash(path: &str, kind: &str, msg: &str) -> Redirect {
    let sep = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{path}{sep}{kind}={}", urlencoding::encode(msg)))
}

/// First human-readable message of a validator failure.
pub fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "入力内容を確認してください。".to_string())
}

/// Form checkbox/select value to an optional trimmed string.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn non_blank_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirects_encode_messages() {
        let r = redirect_with_error("/dashboard/stores", "名前を入力 & retry");
        let location = r.into_response_location();
        assert!(location.starts_with("/dashboard/stores?error="));
        assert!(!location.contains(' '));
        assert!(!location.contains('&'));
    }

    #[test]
    fn flash_appends_to_existing_query() {
        let location = redirect_with_success("/dashboard/shifts?store_id=abc", "ok").into_response_location();
        assert_eq!(location, "/dashboard/shifts?store_id=abc&success=ok");
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank("  a "), Some("a".to_string()));
        assert_eq!(non_blank("   "), None);
    }

    trait Location {
        fn into_response_location(self) -> String;
    }

    impl Location for Redirect {
        fn into_response_location(self) -> String {
            use axum::response::IntoResponse;
            self.into_response()
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        }
    }
}
