use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::{
    dto::{
        dashboard::{AdminStats, RecentUser, RecentUserList},
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
    },
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::{order_from_entity, parse_status, status_filter, with_items},
    state::AppState,
};

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AdminStats>> {
    ensure_admin(state, user).await?;

    let (total_users, total_products, total_orders, total_revenue): (i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM profiles)::BIGINT,
                (SELECT COUNT(*) FROM products)::BIGINT,
                (SELECT COUNT(*) FROM orders)::BIGINT,
                (SELECT COALESCE(SUM(total_amount), 0) FROM orders)::BIGINT
            "#,
        )
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Admin dashboard",
        AdminStats {
            total_users,
            total_products,
            total_orders,
            total_revenue,
        },
        Some(Meta::empty()),
    ))
}

pub async fn recent_users(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RecentUserList>> {
    ensure_admin(state, user).await?;

    let items = sqlx::query_as::<_, RecentUser>(
        r#"
        SELECT id, full_name, member_type, created_at
        FROM profiles
        ORDER BY created_at DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Users", RecentUserList { items }, Some(meta)))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(state, user).await?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = status_filter(query.status.as_deref())? {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(state, user).await?;
    let order = match Orders::find_by_id(id).one(&state.orm).await? {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let data = with_items(state, order).await?;
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(state, user).await?;
    let status = parse_status(&payload.status)?;

    let existing = match Orders::find_by_id(id).one(&state.orm).await? {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = existing.into();
    active.status = Set(status.to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;

    #[test]
    fn accepts_only_known_statuses() {
        assert_eq!(parse_status("shipped").unwrap(), OrderStatus::Shipped);
        assert!(matches!(
            parse_status("paid"),
            Err(AppError::BadRequest(_))
        ));
    }
}
