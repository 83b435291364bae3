use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    config::Config,
    db,
    domain::{Email, UserId},
    error::AppError,
    features::layout::{self, Flash},
    mail::{self, EmailMessage},
    session::{self, AuthenticatedSession},
    views, AppState, APP_NAME,
};

use super::service;

pub const NEW_PATH: &str = "/dashboard/organizations/new";

/// Create-organization page. Also shown at `/dashboard` to users without an organization.
#[derive(Template)]
#[template(path = "organization_new.html")]
pub struct OrganizationNewTemplate {
    pub app_name: &'static str,
    pub first_organization: bool,
    pub error: String,
    pub success: String,
}

impl OrganizationNewTemplate {
    pub fn new(first_organization: bool, flash: Flash) -> Self {
        Self {
            app_name: APP_NAME,
            first_organization,
            error: flash.error.unwrap_or_default(),
            success: flash.success.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationForm {
    #[validate(length(min = 1, max = 400))]
    pub name: String,
}

/// GET /dashboard/organizations/new
pub async fn show(
    AuthenticatedSession(_session): AuthenticatedSession,
    Query(flash): Query<Flash>,
) -> Response {
    match layout::render(&OrganizationNewTemplate::new(false, flash)) {
        Ok(html) => Html(html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// POST /dashboard/organizations — Create an organization owned by the caller
/// and make it the active one.
pub async fn submit(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CreateOrganizationForm>,
) -> Result<Response, AppError> {
    if form.validate().is_err() || form.name.trim().is_empty() {
        return Ok(layout::redirect_with_error(NEW_PATH, "組織名を入力してください。").into_response());
    }

    let organization = match service::create_organization(&state.db, Some(&session.user_id), &form.name).await {
        Ok(organization) => organization,
        Err(AppError::Validation(msg)) => {
            tracing::debug!(user_id = %session.user_id, %msg, "organization name rejected");
            return Ok(
                layout::redirect_with_error(NEW_PATH, "組織名は100文字以内で入力してください。").into_response(),
            );
        }
        Err(err) => return Err(err),
    };

    state.views.revalidate_path(views::DASHBOARD);
    tokio::spawn(send_welcome_email(
        state.clone(),
        session.user_id.clone(),
        organization.name.clone(),
    ));

    let jar = jar.add(session::active_organization_cookie(organization.id.clone()));
    Ok((
        jar,
        layout::redirect_with_success(views::DASHBOARD, "組織を作成しました。"),
    )
        .into_response())
}

/// Body of the welcome mail sent to an organization's creator.
#[derive(Template)]
#[template(path = "welcome_email.html")]
pub struct WelcomeEmailTemplate<'a> {
    pub app_name: &'static str,
    pub organization_name: &'a str,
    pub dashboard_url: String,
}

pub fn welcome_email(config: &Config, to: Email, organization_name: &str) -> Result<EmailMessage, AppError> {
    let body = layout::render(&WelcomeEmailTemplate {
        app_name: APP_NAME,
        organization_name,
        dashboard_url: format!("{}{}", config.app_url_base(), views::DASHBOARD),
    })?;
    Ok(EmailMessage::new(
        to,
        format!("{APP_NAME}: 組織「{organization_name}」を作成しました"),
        body,
        config.mail_from.clone(),
    ))
}

/// Welcome mail to the creator. Failures are logged only.
async fn send_welcome_email(state: AppState, user_id: UserId, organization_name: String) {
    let user = match db::users::find_by_id(&state.db, &user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(%user_id, %err, "could not load user for welcome email");
            return;
        }
    };
    let Ok(to) = Email::new(user.email) else {
        return;
    };

    match welcome_email(&state.config, to, &organization_name) {
        Ok(message) => {
            mail::send_best_effort(state.mail.as_ref(), &message).await;
        }
        Err(err) => tracing::warn!(%user_id, %err, "welcome email not rendered"),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(NEW_PATH, get(show))
        .route("/dashboard/organizations", post(submit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_email_escapes_organization_name() {
        let to = Email::new("owner@example.com".to_string()).unwrap();
        let message = welcome_email(&Config::for_tests(), to, "<b>Tom's & Co</b>").unwrap();

        assert!(!message.html_body.contains("<b>"), "got: {}", message.html_body);
        assert!(message.html_body.contains("&lt;b&gt;"));
        assert!(!message.html_body.contains("Tom's"));
        assert!(message.html_body.contains("localhost:3000"));
        assert_eq!(message.subject, "SalonBook: 組織「<b>Tom's & Co</b>」を作成しました");
    }
}
