pub mod create;
pub mod select;
pub mod service;
pub mod settings;

use axum::Router;

use crate::app::AppState;

pub use service::create_organization;

/// Organization creation, switching and settings routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(create::routes())
        .merge(select::routes())
        .merge(settings::routes())
}
