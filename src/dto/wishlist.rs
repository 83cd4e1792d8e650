use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductSummary;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddToWishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistEntry {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product: ProductSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistList {
    pub items: Vec<WishlistEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistState {
    pub product_id: Uuid,
    pub in_wishlist: bool,
}
