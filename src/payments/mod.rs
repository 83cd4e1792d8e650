//! Payment provider seam used by checkout.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

pub mod stripe;

pub use stripe::StripeGateway;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("payment session has no redirect url")]
    MissingUrl,
}

/// One priced entry of a checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLineItem {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub unit_amount: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub currency: String,
    /// Existing provider customer; when absent `customer_email` is sent instead.
    pub customer: Option<String>,
    pub customer_email: Option<String>,
    pub line_items: Vec<PaymentLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn find_customer(&self, email: &str) -> Result<Option<String>, PaymentError>;

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError>;
}
