//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod api;
pub mod pages;
pub mod setup;

use crate::config::{Settings, TokenStore};
use crate::middleware::{logging::request_logging_middleware, setup::require_token};
use crate::services::{CallHistory, UpstreamClient};
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub client: UpstreamClient,
    pub history: Arc<CallHistory>,
    pub tokens: TokenStore,
}

impl AppState {
    /// Build the state with an empty call history
    pub fn new(settings: Settings, tokens: TokenStore) -> Result<Self> {
        let history = Arc::new(CallHistory::new(settings.history.capacity));
        let client = UpstreamClient::new(&settings.upstream, history.clone())?;

        Ok(Self {
            settings,
            client,
            history,
            tokens,
        })
    }
}

/// Create application router
pub async fn create_router(settings: Settings, tokens: TokenStore) -> Result<Router> {
    let state = Arc::new(AppState::new(settings, tokens)?);
    Ok(router_with_state(state))
}

/// Create the router around existing state
pub fn router_with_state(state: Arc<AppState>) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_logging_middleware));

    // Everything here needs a configured token
    let guarded = Router::new()
        .route("/", get(pages::index))
        .route("/licenses/:index", get(pages::licenses))
        .route("/sales/:index", get(pages::sales))
        .route("/api-log", get(pages::api_log))
        .route("/api/api-calls", get(api::api_calls))
        .route("/validate-license", post(api::validate_license))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    info!(
        "Router initialized (upstream: {}, history capacity: {})",
        state.settings.upstream.base_url,
        state.history.capacity()
    );

    Router::new()
        .route("/setup", get(setup::setup_page))
        .route("/setup/submit", post(setup::submit_token))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .merge(guarded)
        .nest_service("/static", ServeDir::new(&state.settings.storage.static_dir))
        .layer(DefaultBodyLimit::max(state.settings.request.max_request_size))
        .with_state(state)
        .layer(middleware_stack)
}
