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

/// Login form data from HTTP request.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub app_name: &'static str,
    pub error: String,
    pub email: String,
}

fn page(error: String, email: String) -> Response {
    let template = LoginTemplate {
        app_name: APP_NAME,
        error,
        email,
    };
    match layout::render(&template) {
        Ok(html) => Html(html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// GET /login — Show login form.
pub async fn show() -> Response {
    page(String::new(), String::new())
}

/// POST /login — Process login form.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return page(
            "メールアドレスとパスワードを入力してください。".to_string(),
            form.email,
        );
    }

    let email = match Email::new(form.email.clone()) {
        Ok(email) => email,
        Err(err) => {
            let raw = err.message.map(|m| m.to_string()).unwrap_or_default();
            return page(translate_auth_error(&raw), form.email);
        }
    };

    // No strength check on login; rules apply at signup.
    let password = Password::for_verification(form.password);

    match service::login(&state.db, &email, &password).await {
        Ok(session_id) => (
            jar.add(session::session_cookie(session_id)),
            Redirect::to(gate::LANDING_PATH),
        )
            .into_response(),
        Err(AppError::Auth(raw)) => page(translate_auth_error(&raw), form.email),
        Err(err) => {
            tracing::error!(%err, "login failed");
            page(
                "サーバーエラーが発生しました。しばらくしてから再度お試しください。".to_string(),
                form.email,
            )
        }
    }
}

/// Login routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", get(show).post(submit))
}
