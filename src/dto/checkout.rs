use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const SHIPPING_PLACEHOLDER: &str = "To be defined";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub shipping_address: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_country: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Payment page the client should be redirected to.
    pub url: String,
    pub order_id: Uuid,
    pub order_number: String,
}
