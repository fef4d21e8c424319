//! JSON endpoints
//!
//! Call history feed and license validation

use crate::handlers::AppState;
use crate::models::{CallRecord, LicenseValidation, ValidateLicenseRequest};
use crate::utils::error::{AppError, AppResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// GET /api/api-calls
///
/// Recorded calls, newest first
pub async fn api_calls(State(state): State<Arc<AppState>>) -> Json<Vec<CallRecord>> {
    Json(state.history.snapshot())
}

/// POST /validate-license
pub async fn validate_license(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidateLicenseRequest>, JsonRejection>,
) -> AppResult<Json<LicenseValidation>> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected license validation body: {}", e);
        AppError::Validation("Invalid JSON".to_string())
    })?;

    if request.product_id.is_empty() || request.license_key.is_empty() {
        return Err(AppError::Validation(
            "Missing product_id or license_key".to_string(),
        ));
    }

    let validation = state
        .client
        .verify_license(&state.tokens.token(), &request.product_id, &request.license_key)
        .await
        .map_err(|e| AppError::upstream("Failed to validate license", e))?;

    debug!(
        "License validation for product {}: success={}",
        request.product_id, validation.success
    );
    Ok(Json(validation))
}
