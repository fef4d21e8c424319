//! HTML page handlers
//!
//! Products, per-product licenses and sales, and the call log

use crate::handlers::AppState;
use crate::models::Product;
use crate::utils::error::{AppError, AppResult};
use crate::views;
use axum::{
    extract::{Path, State},
    http::{header::REFERER, HeaderMap},
    response::Html,
};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info};

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    debug!("Index handler called");

    let products = state
        .client
        .list_products(&state.tokens.token())
        .await
        .map_err(|e| AppError::upstream("Failed to fetch products", e))?;

    info!("Fetched {} products successfully", products.len());
    Ok(Html(views::products_page(&products)))
}

/// GET /licenses/:index
pub async fn licenses(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
) -> AppResult<Html<String>> {
    let product = product_at(&state, &index).await?;

    let licenses = state
        .client
        .list_licenses(&state.tokens.token(), &product.id)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch licenses", e))?;

    Ok(Html(views::licenses_page(&product, &licenses)))
}

/// GET /sales/:index
pub async fn sales(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
) -> AppResult<Html<String>> {
    let product = product_at(&state, &index).await?;

    let sales = state
        .client
        .list_sales(&state.tokens.token(), &product.id)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch sales", e))?;

    Ok(Html(views::sales_page(&product, &sales)))
}

/// GET /api-log
pub async fn api_log(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    let calls = state.history.snapshot();
    let referer = headers.get(REFERER).and_then(|v| v.to_str().ok());
    Html(views::api_log_page(&calls, &back_link_from_referer(referer)))
}

/// Resolve a product by its position in the product list
///
/// The list is fetched fresh, so the lookup costs one upstream call.
async fn product_at(state: &AppState, index: &str) -> AppResult<Product> {
    let index: usize = index
        .parse()
        .map_err(|_| AppError::Validation("Invalid product index".to_string()))?;

    let products = state
        .client
        .list_products(&state.tokens.token())
        .await
        .map_err(|e| AppError::upstream("Failed to fetch products", e))?;

    products
        .into_iter()
        .nth(index)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Pick the back link for the log page from the `Referer` header
///
/// Only the dashboard's own product, license and sales pages qualify.
pub fn back_link_from_referer(referer: Option<&str>) -> String {
    let Some(url) = referer.and_then(|r| Url::parse(r).ok()) else {
        return "/".to_string();
    };

    let path = url.path();
    if path != "/api-log"
        && (path == "/" || path.starts_with("/licenses/") || path.starts_with("/sales/"))
    {
        path.to_string()
    } else {
        "/".to_string()
    }
}
