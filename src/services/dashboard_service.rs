use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::dashboard::{RetailStats, WholesaleStats},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::MemberType,
    response::{ApiResponse, Meta},
    services::profile_service::member_type,
    state::AppState,
};

/// `(order count, total spent)` for one customer.
pub(crate) async fn order_totals(pool: &DbPool, customer_id: Uuid) -> AppResult<(i64, i64)> {
    let totals: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*)::BIGINT, COALESCE(SUM(total_amount), 0)::BIGINT
        FROM orders
        WHERE customer_id = $1
        "#,
    )
    .bind(customer_id)
    .fetch_one(pool)
    .await?;
    Ok(totals)
}

async fn require_member(state: &AppState, user: &AuthUser, expected: MemberType) -> AppResult<()> {
    match member_type(state, user).await? {
        Some(actual) if actual == expected => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}

pub async fn retail_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<RetailStats>> {
    require_member(state, user, MemberType::Retail).await?;

    let (total_orders, total_spent) = order_totals(&state.pool, user.user_id).await?;
    let cart_items: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Retail dashboard",
        RetailStats {
            total_orders,
            total_spent,
            cart_items: cart_items.0,
        },
        Some(Meta::empty()),
    ))
}

pub async fn wholesale_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<WholesaleStats>> {
    require_member(state, user, MemberType::Wholesale).await?;

    let (total_orders, total_spent) = order_totals(&state.pool, user.user_id).await?;
    let active_products: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE is_active = TRUE")
            .fetch_one(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "Wholesale dashboard",
        WholesaleStats {
            total_orders,
            total_spent,
            active_products: active_products.0,
        },
        Some(Meta::empty()),
    ))
}
