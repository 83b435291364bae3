use askama::Template;
use axum::{
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::app::{features::layout, AppState, APP_NAME};

/// The public landing page.
#[derive(Template)]
#[template(path = "site/home.html")]
pub struct HomeTemplate {
    pub app_name: &'static str,
}

/// GET /
pub async fn index() -> Response {
    match layout::render(&HomeTemplate { app_name: APP_NAME }) {
        Ok(html) => Html(html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Routes for the home feature slice.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}
