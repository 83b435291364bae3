//! Route-level auth gate.
//!
//! It only knows whether a session is valid. Organization
//! membership and role are re-checked by every action.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::{domain::validation_helpers, session::SessionContext, AppState};

pub const PROTECTED_PREFIX: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";
pub const LANDING_PATH: &str = "/dashboard";
pub const ENTRY_PATHS: &[&str] = &["/login", "/signup"];

/// Path prefixes served without consulting the gate.
pub const EXCLUDED_PREFIXES: &[&str] = &["/static/", "/image/"];
pub const EXCLUDED_PATHS: &[&str] = &["/favicon.ico"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    PassThrough,
    Redirect(&'static str),
}

/// Requests the gate never looks at: static assets, image endpoints, favicon.
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PATHS.contains(&path)
        || EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
        || validation_helpers::has_image_extension(path)
}

/// `/dashboard` and everything below it, but not `/dashboards`.
pub fn is_protected(path: &str) -> bool {
    path == PROTECTED_PREFIX
        || path
            .strip_prefix(PROTECTED_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn is_entry_page(path: &str) -> bool {
    let trimmed = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    ENTRY_PATHS.contains(&trimmed)
}

pub fn decide(status: AuthStatus, path: &str) -> GateDecision {
    match status {
        AuthStatus::Unauthenticated if is_protected(path) => GateDecision::Redirect(LOGIN_PATH),
        AuthStatus::Authenticated if is_entry_page(path) => GateDecision::Redirect(LANDING_PATH),
        _ => GateDecision::PassThrough,
    }
}

/// Middleware: run `decide` for every non-excluded request.
/// A failed session lookup counts as unauthenticated. A valid session is
/// handed to handlers through request extensions.
pub async fn auth_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_excluded(&path) {
        return next.run(request).await;
    }

    let status = match SessionContext::from_jar(&state, &jar).await {
        Ok(Some(context)) => {
            request.extensions_mut().insert(context);
            AuthStatus::Authenticated
        }
        Ok(None) => AuthStatus::Unauthenticated,
        Err(err) => {
            tracing::error!(%err, path = %path, "session lookup failed in auth gate");
            AuthStatus::Unauthenticated
        }
    };

    match decide(status, &path) {
        GateDecision::PassThrough => next.run(request).await,
        GateDecision::Redirect(to) => {
            tracing::debug!(path = %path, ?status, to, "auth gate redirect");
            Redirect::to(to).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_protected_redirects_to_login() {
        for path in ["/dashboard", "/dashboard/customers", "/dashboard/settings/organization"] {
            assert_eq!(
                decide(AuthStatus::Unauthenticated, path),
                GateDecision::Redirect("/login"),
                "{path}"
            );
        }
    }

    #[test]
    fn authenticated_entry_page_redirects_to_dashboard() {
        for path in ["/login", "/signup", "/login/"] {
            assert_eq!(
                decide(AuthStatus::Authenticated, path),
                GateDecision::Redirect("/dashboard"),
                "{path}"
            );
        }
    }

    #[test]
    fn other_combinations_pass_through() {
        let cases = [
            (AuthStatus::Unauthenticated, "/"),
            (AuthStatus::Unauthenticated, "/login"),
            (AuthStatus::Unauthenticated, "/signup"),
            (AuthStatus::Unauthenticated, "/dashboards"),
            (AuthStatus::Authenticated, "/dashboard"),
            (AuthStatus::Authenticated, "/dashboard/stores"),
            (AuthStatus::Authenticated, "/"),
            (AuthStatus::Authenticated, "/logout"),
            (AuthStatus::Authenticated, "/login-help"),
        ];
        for (status, path) in cases {
            assert_eq!(decide(status, path), GateDecision::PassThrough, "{status:?} {path}");
        }
    }

    #[test]
    fn exclusion_list() {
        assert!(is_excluded("/favicon.ico"));
        assert!(is_excluded("/static/app.css"));
        assert!(is_excluded("/image/resize"));
        assert!(is_excluded("/dashboard/logo.png"));
        assert!(is_excluded("/hero.WEBP"));
        assert!(!is_excluded("/dashboard"));
        assert!(!is_excluded("/static"));
        assert!(!is_excluded("/login"));
    }
}
