use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::app::{
    domain::{Email, Password},
    error::AppError,
    features::layout,
    gate, session, AppState, APP_NAME,
};

use super::{service, translate_auth_error};

/// Signup form data from HTTP request.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Signup page template.
#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub app_name: &'static str,
    pub error: String,
    pub email: String,
}

fn page(error: String, email: String) -> Response {
    let template = SignupTemplate {
        app_name: APP_NAME,
        error,
        email,
    };
    match layout::render(&template) {
        Ok(html) => Html(html).into_response(),
        Err(err) => err.into_response(),
    }
}

fn message_of(err: validator::ValidationError) -> String {
    err.message.map(|m| m.to_string()).unwrap_or_default()
}

/// GET /signup — Show signup form.
pub async fn show() -> Response {
    page(String::new(), String::new())
}

/// POST /signup — Create the account and log straight in.
/// The new user has no organization yet; the dashboard asks them to create one.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Response {
    let email = match Email::new(form.email.clone()) {
        Ok(email) => email,
        Err(err) => return page(translate_auth_error(&message_of(err)), form.email),
    };

    let password = match Password::new(form.password.clone()) {
        Ok(password) => password,
        Err(err) => return page(translate_auth_error(&message_of(err)), form.email),
    };

    if form.password != form.confirm_password {
        return page(translate_auth_error("Passwords do not match"), form.email);
    }

    match service::signup(&state.db, &email, &password).await {
        Ok(session_id) => (
            jar.add(session::session_cookie(session_id))
                .add(session::clear_active_organization_cookie()),
            Redirect::to(gate::LANDING_PATH),
        )
            .into_response(),
        Err(AppError::Auth(raw)) => page(translate_auth_error(&raw), form.email),
        Err(err) => {
            tracing::error!(%err, "signup failed");
            page(
                "サーバーエラーが発生しました。しばらくしてから再度お試しください。".to_string(),
                form.email,
            )
        }
    }
}

/// Signup routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/signup", get(show).post(submit))
}
