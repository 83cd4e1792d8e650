use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::ProductSummary,
    pricing::{self, PricedLine},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    /// Zero or below removes the item.
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartVariant {
    pub color: Option<String>,
    pub size: Option<String>,
    pub price_modifier: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
    pub product: ProductSummary,
    pub variant: Option<CartVariant>,
    pub unit_price: i64,
    pub line_total: i64,
}

impl PricedLine for CartLine {
    fn base_price(&self) -> i64 {
        self.product.price
    }

    fn price_modifier(&self) -> i64 {
        self.variant.as_ref().map_or(0, |v| v.price_modifier)
    }

    fn quantity(&self) -> i32 {
        self.quantity
    }
}

impl CartLine {
    pub fn new(
        id: Uuid,
        product_id: Uuid,
        variant_id: Option<Uuid>,
        quantity: i32,
        product: ProductSummary,
        variant: Option<CartVariant>,
    ) -> Self {
        let modifier = variant.as_ref().map_or(0, |v| v.price_modifier);
        let unit_price = pricing::unit_price(product.price, modifier);
        Self {
            id,
            product_id,
            variant_id,
            quantity,
            product,
            variant,
            unit_price,
            line_total: pricing::line_total(unit_price, quantity),
        }
    }
}

/// The reloaded cart with totals derived from its lines.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub item_count: i64,
    pub total: i64,
}

impl CartSnapshot {
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let item_count = pricing::item_count(&items);
        let total = pricing::cart_total(&items);
        Self {
            items,
            item_count,
            total,
        }
    }

    pub fn empty() -> Self {
        Self::from_lines(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
