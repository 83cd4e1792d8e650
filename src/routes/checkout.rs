use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    routing::post,
};

use crate::{
    dto::checkout::{CheckoutRequest, CheckoutResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body(content = CheckoutRequest, description = "Shipping details, all optional. The body may be omitted."),
    responses(
        (status = 200, description = "Order created and payment session opened", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Cart is empty"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Payment provider error")
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    payload: Option<Json<CheckoutRequest>>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let resp = checkout_service::checkout(&state, &user, origin, payload).await?;
    Ok(Json(resp))
}
