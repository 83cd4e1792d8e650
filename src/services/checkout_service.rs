use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::{
        cart::CartSnapshot,
        checkout::{CheckoutRequest, CheckoutResponse, SHIPPING_PLACEHOLDER},
    },
    entity::{
        order_items::ActiveModel as OrderItemActive,
        orders::ActiveModel as OrderActive,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::OrderStatus,
    payments::{CheckoutSessionRequest, PaymentLineItem},
    pricing,
    response::{ApiResponse, Meta},
    services::cart_service::load_cart,
    state::AppState,
};

/// One cart line priced for both the order record and the payment session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub payment: PaymentLineItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    pub lines: Vec<PlannedLine>,
    pub total_amount: i64,
}

/// Price every cart line; an empty cart is rejected here, before anything is written.
pub fn plan_checkout(cart: &CartSnapshot) -> AppResult<CheckoutPlan> {
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let mut lines = Vec::with_capacity(cart.items.len());
    let mut total_amount: i64 = 0;
    for line in &cart.items {
        let modifier = line.variant.as_ref().map_or(0, |v| v.price_modifier);
        let (unit_price, total_price) =
            pricing::checked_line(line.product.price, modifier, line.quantity).ok_or_else(|| {
                AppError::BadRequest(format!("{} cannot be priced", line.product.name))
            })?;
        total_amount = total_amount
            .checked_add(total_price)
            .ok_or_else(|| AppError::BadRequest("Cart total is out of range".into()))?;

        let description = line.variant.as_ref().and_then(|v| {
            pricing::variant_label(v.color.as_deref(), v.size.as_deref())
        });
        let image = line
            .product
            .images
            .first()
            .filter(|url| pricing::is_absolute_http_url(url))
            .cloned();

        lines.push(PlannedLine {
            product_id: line.product_id,
            variant_id: line.variant_id,
            quantity: line.quantity,
            unit_price,
            total_price,
            payment: PaymentLineItem {
                name: line.product.name.clone(),
                description,
                image,
                unit_amount: unit_price,
                quantity: line.quantity,
            },
        });
    }

    Ok(CheckoutPlan {
        lines,
        total_amount,
    })
}

pub fn order_number(now: DateTime<Utc>) -> String {
    format!("ORD-{}", now.timestamp_millis())
}

/// `(success_url, cancel_url)`; the provider substitutes `{CHECKOUT_SESSION_ID}`.
pub fn redirect_urls(origin: &str) -> (String, String) {
    let origin = origin.trim_end_matches('/');
    (
        format!("{origin}/payment-success?session_id={{CHECKOUT_SESSION_ID}}"),
        format!("{origin}/cart"),
    )
}

fn shipping_field(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| SHIPPING_PLACEHOLDER.to_string())
}

/// Persist the order for the caller's cart and open a payment session for it.
///
/// The order and its items are written before the provider is called, so a
/// failed session leaves a `pending` order behind rather than losing it.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    origin: Option<String>,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let cart = load_cart(&state.pool, user.user_id).await?;
    let plan = plan_checkout(&cart)?;

    let customer = match user.email.as_deref() {
        Some(email) => state.payments.find_customer(email).await?,
        None => None,
    };

    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let order_number = order_number(now);

    let txn = state.orm.begin().await?;
    OrderActive {
        id: Set(order_id),
        order_number: Set(order_number.clone()),
        customer_id: Set(user.user_id),
        total_amount: Set(plan.total_amount),
        status: Set(OrderStatus::Pending.to_string()),
        shipping_address: Set(shipping_field(payload.shipping_address)),
        shipping_city: Set(shipping_field(payload.shipping_city)),
        shipping_country: Set(shipping_field(payload.shipping_country)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in &plan.lines {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id),
            variant_id: Set(line.variant_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            total_price: Set(line.total_price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    tracing::info!(
        order_id = %order_id,
        order_number = %order_number,
        total_amount = plan.total_amount,
        lines = plan.lines.len(),
        "order created"
    );

    let origin = origin
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| state.config.public_site_url.clone());
    let (success_url, cancel_url) = redirect_urls(&origin);

    let request = CheckoutSessionRequest {
        currency: state.config.payments.currency.clone(),
        customer_email: if customer.is_some() { None } else { user.email.clone() },
        customer,
        line_items: plan.lines.iter().map(|line| line.payment.clone()).collect(),
        success_url,
        cancel_url,
        metadata: BTreeMap::from([
            ("order_id".to_string(), order_id.to_string()),
            ("order_number".to_string(), order_number.clone()),
        ]),
    };

    let session = match state.payments.create_checkout_session(&request).await {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(order_id = %order_id, error = %err, "payment session failed, order left pending");
            return Err(err.into());
        }
    };

    tracing::info!(order_id = %order_id, session_id = %session.id, "payment session created");

    Ok(ApiResponse::success(
        "Checkout session created",
        CheckoutResponse {
            url: session.url,
            order_id,
            order_number,
        },
        Some(Meta::empty()),
    ))
}
