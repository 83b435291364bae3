use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::app::{
    db,
    domain::{Email, HashedPassword, Password, UserId},
    error::AppError,
    session::RETENTION,
};

pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";
pub const ALREADY_REGISTERED: &str = "User already registered";

/// Sign up a new user. Returns the session ID on success.
pub async fn signup(
    pool: &SqlitePool,
    email: &Email,
    password: &Password,
) -> Result<String, AppError> {
    if db::find_by_email(pool, email).await?.is_some() {
        return Err(AppError::Auth(ALREADY_REGISTERED.to_string()));
    }

    let password_hash = HashedPassword::from_password(password).map_err(|err| {
        tracing::error!(%err, "password hashing failed");
        AppError::Internal
    })?;

    let new_user = db::NewUser {
        id: UserId::new(),
        email: email.clone(),
        password_hash,
    };

    let mut tx = pool.begin().await?;

    db::users::insert(&mut *tx, &new_user).await?;

    let expires_at = OffsetDateTime::now_utc() + RETENTION;
    let session_id = db::sessions::create(&mut *tx, &new_user.id, expires_at).await?;

    tx.commit().await?;

    tracing::info!(user_id = %new_user.id, "user signed up");
    Ok(session_id)
}

/// Log in a user. Returns the session ID on success.
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    pool: &SqlitePool,
    email: &Email,
    password: &Password,
) -> Result<String, AppError> {
    let user = db::find_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    HashedPassword::from_string(user.password_hash)
        .verify(password)
        .map_err(|_| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    let user_id = UserId::from_string(&user.id).map_err(|_| AppError::Internal)?;

    let expires_at = OffsetDateTime::now_utc() + RETENTION;
    let session_id = db::sessions::create(pool, &user_id, expires_at).await?;

    tracing::info!(user_id = %user_id, "user logged in");
    Ok(session_id)
}
