use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

/// Human-readable application name, used in templates and UI.
pub const APP_NAME: &str = "SalonBook";

/// Shared state available to all handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub mail: Arc<dyn mail::EmailSender>,
    pub config: config::Config,
    pub views: views::ViewCache,
}

impl AppState {
    pub fn new(db: SqlitePool, mail: Arc<dyn mail::EmailSender>, config: config::Config) -> Self {
        Self {
            db,
            mail,
            config,
            views: views::ViewCache::new(),
        }
    }
}

/// App routes (auth, dashboard, tenant actions). Merged with site routes in lib.rs.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(features::auth::routes())
        .merge(features::dashboard::routes())
        .merge(features::organization::routes())
        .merge(features::stores::routes())
        .merge(features::customers::routes())
        .merge(features::coupons::routes())
        .merge(features::shifts::routes())
        .merge(features::visits::routes())
}

pub mod backend;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod features;
pub mod gate;
pub mod mail;
pub mod rbac;
pub mod session;
pub mod tenant;
pub mod views;
