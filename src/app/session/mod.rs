//! Session and active-organization cookies, and the per-request session context.
//!
//! Nothing here reads ambient state: handlers receive a `SessionContext` and
//! pass it down explicitly.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::app::{backend, db, domain::UserId, error::AppError, AppState};

pub const SESSION_COOKIE: &str = "session_id";
pub const ACTIVE_ORGANIZATION_COOKIE: &str = "active_organization_id";

/// Lifetime of a login session and of the active-organization preference.
pub const RETENTION: Duration = Duration::days(30);

pub fn session_cookie(session_id: impl Into<String>) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.into()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(RETENTION)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .removal()
        .into()
}

/// Persist the organization the user last selected. Not authoritative:
/// it is re-validated against membership on every resolution.
pub fn active_organization_cookie(organization_id: impl Into<String>) -> Cookie<'static> {
    Cookie::build((ACTIVE_ORGANIZATION_COOKIE, organization_id.into()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(RETENTION)
        .build()
}

pub fn clear_active_organization_cookie() -> Cookie<'static> {
    Cookie::build((ACTIVE_ORGANIZATION_COOKIE, ""))
        .path("/")
        .removal()
        .into()
}

/// What one request knows about its caller.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub user_id: UserId,
    /// Raw value of the active-organization cookie, unvalidated.
    pub organization_preference: Option<String>,
}

impl SessionContext {
    /// Look up the session named by the jar's session cookie.
    /// `Ok(None)` when there is no cookie or the session is unknown or expired.
    pub async fn from_jar(state: &AppState, jar: &CookieJar) -> Result<Option<Self>, AppError> {
        let Some(session_id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Ok(None);
        };
        if session_id.is_empty() {
            return Ok(None);
        }

        let session = backend::bounded(
            state.config.backend_timeout,
            db::sessions::find_valid(&state.db, &session_id),
        )
        .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        let user_id = UserId::from_string(&session.user_id).map_err(|_| {
            tracing::error!(session_user_id = %session.user_id, "session row holds an invalid user id");
            AppError::Internal
        })?;

        let organization_preference = jar
            .get(ACTIVE_ORGANIZATION_COOKIE)
            .map(|c| c.value().trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Some(Self {
            session_id,
            user_id,
            organization_preference,
        }))
    }
}

/// Extractor for dashboard handlers. Redirects to `/login` without a valid session.
pub struct AuthenticatedSession(pub SessionContext);

impl FromRequestParts<AppState> for AuthenticatedSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<SessionContext>() {
            return Ok(AuthenticatedSession(context.clone()));
        }
        let jar = CookieJar::from_headers(&parts.headers);
        match SessionContext::from_jar(state, &jar).await {
            Ok(Some(context)) => Ok(AuthenticatedSession(context)),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(err) => Err(err.into_response()),
        }
    }
}
