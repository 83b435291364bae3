pub mod login;
pub mod logout;
pub mod messages;
pub mod service;
pub mod signup;

use axum::Router;

use crate::app::AppState;

pub use messages::translate_auth_error;

/// Authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(signup::routes())
        .merge(login::routes())
        .merge(logout::routes())
}
