use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub question: String,
    // Checkbox: present when ticked, absent otherwise
    #[serde(default)]
    pub include_analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FollowUpForm {
    pub question: String,
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubmitForm>,
) -> impl IntoResponse {
    let include_analysis = form.include_analysis.is_some();
    match state.submit(form.question, include_analysis).await {
        Ok(outcome) => info!("Submit finished: {:?}", outcome),
        Err(rejected) => debug!("Submit rejected: {}", rejected),
    }

    // Query failures are part of the session and show up on the page
    Redirect::to("/")
}

pub async fn follow_up(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FollowUpForm>,
) -> impl IntoResponse {
    match state.follow_up(form.question).await {
        Ok(outcome) => info!("Follow-up finished: {:?}", outcome),
        Err(rejected) => debug!("Follow-up rejected: {}", rejected),
    }

    Redirect::to("/")
}

pub async fn session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.view().await)
}
