#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use http_body_util::BodyExt;
use salonbook::app::{
    config::Config,
    db,
    domain::{Email, HashedPassword, OrganizationId, OrganizationRole, Password, UserId},
    mail::ConsoleMailer,
    AppState,
};
use salonbook::create_router;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const PASSWORD: &str = "Password123";

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn test_state(pool: SqlitePool) -> AppState {
    AppState::new(pool, Arc::new(ConsoleMailer), Config::for_tests())
}

pub fn test_router(pool: SqlitePool) -> axum::Router {
    create_router(test_state(pool))
}

pub fn signup_form_body(email: &str, password: &str, confirm_password: &str) -> String {
    format!(
        "email={}&password={}&confirm_password={}",
        urlencoding::encode(email),
        urlencoding::encode(password),
        urlencoding::encode(confirm_password)
    )
}

pub fn login_form_body(email: &str, password: &str) -> String {
    format!(
        "email={}&password={}",
        urlencoding::encode(email),
        urlencoding::encode(password)
    )
}

/// `a=1&b=2` from pairs, values URL-encoded.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn extract_session_id_from_cookie(set_cookie_header: &str) -> Option<&str> {
    set_cookie_header.split(';').next()?.strip_prefix("session_id=")
}

/// All `Set-Cookie` headers of a response.
pub fn set_cookies(response: &http::Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub fn location(response: &http::Response<Body>) -> Option<String> {
    response
        .headers()
        .get("location")
        .map(|v| v.to_str().unwrap().to_string())
}

pub async fn body_string(response: http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

pub async fn get(app: &axum::Router, uri: &str, cookie: &str) -> http::Response<Body> {
    let mut builder = http::Request::builder().method("GET").uri(uri);
    if !cookie.is_empty() {
        builder = builder.header("cookie", cookie);
    }
    app.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn post_form(app: &axum::Router, uri: &str, cookie: &str, body: String) -> http::Response<Body> {
    let mut builder = http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded");
    if !cookie.is_empty() {
        builder = builder.header("cookie", cookie);
    }
    app.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap()
}

/// Create a user directly in the database (bypasses signup flow).
pub async fn create_user(pool: &SqlitePool, email: &str) -> UserId {
    let email = Email::new(email.to_string()).unwrap();
    let password = Password::new(PASSWORD.to_string()).unwrap();
    let user_id = UserId::new();
    db::users::insert(
        pool,
        &db::NewUser {
            id: user_id.clone(),
            email,
            password_hash: HashedPassword::from_password(&password).unwrap(),
        },
    )
    .await
    .unwrap();
    user_id
}

/// Log in through `/login` and return a `Cookie` header value.
pub async fn login_cookie(app: &axum::Router, email: &str) -> String {
    let response = post_form(app, "/login", "", login_form_body(email, PASSWORD)).await;
    assert_eq!(response.status(), http::StatusCode::SEE_OTHER);
    let cookies = set_cookies(&response);
    let session_id = cookies
        .iter()
        .find_map(|c| extract_session_id_from_cookie(c))
        .expect("login sets a session cookie");
    format!("session_id={}", session_id)
}

/// Create a user, log in, return the user id and cookie header.
pub async fn authenticated_user(pool: &SqlitePool, app: &axum::Router, email: &str) -> (UserId, String) {
    let user_id = create_user(pool, email).await;
    let cookie = login_cookie(app, email).await;
    (user_id, cookie)
}

/// Cookie header with an active-organization preference added.
pub fn with_organization(cookie: &str, organization_id: &str) -> String {
    format!("{cookie}; active_organization_id={organization_id}")
}

/// Insert an organization with an explicit `created_at`, bypassing the service.
pub async fn insert_organization(pool: &SqlitePool, name: &str, created_at: i64) -> OrganizationId {
    let id = OrganizationId::new();
    sqlx::query(
        "INSERT INTO organizations (id, name, slug, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.as_str())
    .bind(name)
    .bind(id.as_str().to_lowercase())
    .bind(created_at)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();
    id
}

pub async fn add_member(pool: &SqlitePool, organization_id: &OrganizationId, user_id: &UserId, role: OrganizationRole) {
    db::organizations::add_member(pool, organization_id, user_id, role)
        .await
        .unwrap();
}

/// Organization with `user_id` as a member in `role`.
pub async fn organization_with_member(
    pool: &SqlitePool,
    name: &str,
    user_id: &UserId,
    role: OrganizationRole,
) -> OrganizationId {
    let id = insert_organization(pool, name, time::OffsetDateTime::now_utc().unix_timestamp()).await;
    add_member(pool, &id, user_id, role).await;
    id
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT count(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}
