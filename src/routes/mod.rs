use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod admin;
pub mod blog;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod profile;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", products::categories_router())
        .nest("/cart", cart::router())
        .nest("/wishlist", wishlist::router())
        .nest("/checkout", checkout::router())
        .nest("/orders", orders::router())
        .nest("/profile", profile::router())
        .nest("/dashboard", dashboard::router())
        .nest("/blog", blog::router())
        .nest("/admin", admin::router())
}

/// Health check, `/api`, docs and the JSON 404 fallback, with state bound.
/// Transport layers (tracing, limits, request ids) are added by the binary.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
