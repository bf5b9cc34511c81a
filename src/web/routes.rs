use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - the widget page and the form posts it makes
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/submit", post(handlers::widget::submit))
        .route("/follow-up", post(handlers::widget::follow_up))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - the session as JSON for scripted clients
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new().route("/session", get(handlers::widget::session)),
    )
}
