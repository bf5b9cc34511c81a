use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

use crate::web::state::AppState;
use crate::web::templates::render_widget;

// Main UI entry point
pub async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.view().await;
    Html(render_widget(
        &state.template_env,
        &view,
        &state.config.service.endpoint,
    ))
}
