//! Token setup handlers
//!
//! First-run page and token submission

use crate::handlers::AppState;
use crate::utils::error::AppError;
use crate::views;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Token submitted from the setup form
#[derive(Debug, Deserialize)]
pub struct TokenSubmission {
    #[serde(default)]
    pub token: String,
}

/// Successful submission answer
#[derive(Debug, Serialize, Deserialize)]
pub struct SetupResponse {
    pub success: bool,
    pub message: String,
}

/// GET /setup
pub async fn setup_page(State(state): State<Arc<AppState>>) -> Response {
    if state.tokens.is_configured() {
        info!("Token is configured, redirecting to /");
        return Redirect::temporary("/").into_response();
    }

    Html(views::setup_page()).into_response()
}

/// POST /setup/submit
///
/// Checks the token against the upstream before saving it
pub async fn submit_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenSubmission>, JsonRejection>,
) -> Response {
    let token = match payload {
        Ok(Json(submission)) => submission.token.trim().to_string(),
        Err(_) => return AppError::Validation("Invalid JSON data".to_string()).into_json_response(),
    };

    if token.is_empty() {
        return AppError::Validation("Token cannot be empty".to_string()).into_json_response();
    }

    if let Err(e) = state.client.check_token(&token).await {
        return AppError::Validation(format!("Invalid token: {}", e)).into_json_response();
    }

    let store = state.clone();
    let saved = tokio::task::spawn_blocking(move || store.tokens.replace(token)).await;
    match saved {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return AppError::Persist(format!("{:#}", e)).into_json_response(),
        Err(e) => {
            error!("Token save task failed: {}", e);
            return AppError::Internal("token save task failed".to_string()).into_json_response();
        }
    }

    info!("Token configured via setup page");
    Json(SetupResponse {
        success: true,
        message: "Token saved successfully".to_string(),
    })
    .into_response()
}
