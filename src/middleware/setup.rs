//! Setup guard middleware
//!
//! Sends every guarded request to the setup page until a token is configured

use crate::handlers::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Redirect to `/setup` while no usable token is configured
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.tokens.is_configured() {
        debug!("No token configured, redirecting {} to /setup", request.uri().path());
        return Redirect::temporary("/setup").into_response();
    }

    next.run(request).await
}
