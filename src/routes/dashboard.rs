use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::{RetailStats, WholesaleStats},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/retail", get(retail_dashboard))
        .route("/wholesale", get(wholesale_dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/retail",
    responses(
        (status = 200, description = "Retail member stats", body = ApiResponse<RetailStats>),
        (status = 403, description = "Not a retail member")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn retail_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RetailStats>>> {
    let resp = dashboard_service::retail_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/wholesale",
    responses(
        (status = 200, description = "Wholesale member stats", body = ApiResponse<WholesaleStats>),
        (status = 403, description = "Not a wholesale member")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn wholesale_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<WholesaleStats>>> {
    let resp = dashboard_service::wholesale_stats(&state, &user).await?;
    Ok(Json(resp))
}
