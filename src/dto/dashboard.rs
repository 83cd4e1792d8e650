use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct RetailStats {
    pub total_orders: i64,
    pub total_spent: i64,
    pub cart_items: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WholesaleStats {
    pub total_orders: i64,
    pub total_spent: i64,
    pub active_products: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: i64,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct RecentUser {
    pub id: Uuid,
    pub full_name: String,
    pub member_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentUserList {
    pub items: Vec<RecentUser>,
}
