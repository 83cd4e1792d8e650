mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use marketplace_api::{
    db::{create_pool, run_migrations},
    dto::{
        cart::{AddToCartRequest, UpdateQuantityRequest},
        checkout::{CheckoutRequest, SHIPPING_PLACEHOLDER},
        products::{CreateProductRequest, CreateVariantRequest},
        wishlist::AddToWishlistRequest,
    },
    entity::{
        product_variants::ActiveModel as VariantActive, products::ActiveModel as ProductActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::{create_router, params::OrderListQuery},
    services::{cart_service, checkout_service, order_service, product_service, wishlist_service},
    state::AppState,
};
use sea_orm::ActiveModelTrait;
use serde_json::Value;
use tower::ServiceExt;
use sea_orm::ActiveValue::{NotSet, Set};
use uuid::Uuid;

use crate::common::{FakeGateway, bearer, state_with};

// Integration flow: cart upserts and removals, then checkout against a fake payment gateway.
#[tokio::test]
async fn cart_and_checkout_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let pool = create_pool(&database_url).await?;
    let gateway = Arc::new(FakeGateway::default());
    let state = state_with(pool, &database_url, gateway.clone());
    run_migrations(&state.orm).await?;

    let (product_id, variant_id) = seed_product(&state, 2500, 400).await?;

    upsert_keeps_one_row(&state, product_id, variant_id).await?;
    concurrent_adds_converge_on_one_row(&state, product_id, variant_id).await?;
    zero_quantity_removes_item(&state, product_id).await?;
    empty_cart_checkout_writes_nothing(&state, &gateway).await?;
    checkout_body_is_optional(&state).await?;
    checkout_persists_order_and_opens_session(&state, &gateway, product_id, variant_id).await?;
    known_customer_is_bound_to_session(&state, product_id).await?;
    failed_session_leaves_pending_order(&state, product_id, variant_id).await?;
    wishlist_add_is_idempotent(&state, product_id).await?;
    admin_product_writes_are_validated(&state).await?;

    Ok(())
}

fn buyer() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: Some("buyer@example.com".into()),
    }
}

async fn seed_product(
    state: &AppState,
    price: i64,
    modifier: i64,
) -> anyhow::Result<(Uuid, Uuid)> {
    let slug = format!("test-lamp-{}", Uuid::new_v4());
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(None),
        name: Set("Test Lamp".into()),
        slug: Set(slug.clone()),
        description: Set(Some("A product for testing".into())),
        price: Set(price),
        wholesale_price: Set(None),
        stock_quantity: Set(10),
        min_order_quantity: Set(1),
        images: Set(vec![format!("https://images.example.com/{slug}.jpg")]),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let variant = VariantActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        color: Set(Some("Brass".into())),
        size: Set(Some("L".into())),
        stock_quantity: Set(5),
        price_modifier: Set(modifier),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok((product.id, variant.id))
}

async fn upsert_keeps_one_row(
    state: &AppState,
    product_id: Uuid,
    variant_id: Uuid,
) -> anyhow::Result<()> {
    let user = buyer();
    for quantity in [1, 3] {
        cart_service::add_item(
            state,
            &user,
            AddToCartRequest {
                product_id,
                variant_id: Some(variant_id),
                quantity,
            },
        )
        .await?;
    }

    let cart = cart_service::get_cart(state, &user).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1, "same product/variant must stay one row");
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.item_count, 3);
    assert_eq!(cart.total, (2500 + 400) * 3);

    // The plain product is a separate line.
    let cart = cart_service::add_item(
        state,
        &user,
        AddToCartRequest {
            product_id,
            variant_id: None,
            quantity: 2,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total, (2500 + 400) * 3 + 2500 * 2);

    cart_service::clear_cart(state, &user).await?;
    Ok(())
}

async fn zero_quantity_removes_item(state: &AppState, product_id: Uuid) -> anyhow::Result<()> {
    let user = buyer();
    let cart = cart_service::add_item(
        state,
        &user,
        AddToCartRequest {
            product_id,
            variant_id: None,
            quantity: 2,
        },
    )
    .await?
    .data
    .unwrap();
    let item_id = cart.items[0].id;

    let cart = cart_service::update_quantity(state, &user, item_id, UpdateQuantityRequest { quantity: 0 })
        .await?
        .data
        .unwrap();
    assert!(cart.is_empty());

    // Removing again is not an error, updating a missing item is.
    cart_service::remove_item(state, &user, item_id).await?;
    let missing = cart_service::update_quantity(
        state,
        &user,
        item_id,
        UpdateQuantityRequest { quantity: 1 },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let rejected = cart_service::add_item(
        state,
        &user,
        AddToCartRequest {
            product_id,
            variant_id: None,
            quantity: 0,
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));
    Ok(())
}

async fn empty_cart_checkout_writes_nothing(
    state: &AppState,
    gateway: &FakeGateway,
) -> anyhow::Result<()> {
    let user = buyer();
    let calls_before = gateway.calls();

    let result =
        checkout_service::checkout(state, &user, None, CheckoutRequest::default()).await;
    assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Cart is empty"));

    let (orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(orders, 0);
    assert_eq!(gateway.calls(), calls_before);
    Ok(())
}

async fn checkout_persists_order_and_opens_session(
    state: &AppState,
    gateway: &FakeGateway,
    product_id: Uuid,
    variant_id: Uuid,
) -> anyhow::Result<()> {
    let user = buyer();
    cart_service::add_item(
        state,
        &user,
        AddToCartRequest {
            product_id,
            variant_id: Some(variant_id),
            quantity: 2,
        },
    )
    .await?;

    let resp = checkout_service::checkout(
        state,
        &user,
        Some("https://shop.example.com".into()),
        CheckoutRequest {
            shipping_city: Some("Lisbon".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(resp.order_number.starts_with("ORD-"));

    let detail = order_service::get_order(state, &user, resp.order_id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.order.status, "pending");
    assert_eq!(detail.order.total_amount, (2500 + 400) * 2);
    assert_eq!(detail.order.shipping_city, "Lisbon");
    assert_eq!(detail.order.shipping_address, SHIPPING_PLACEHOLDER);
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].unit_price, 2900);
    let items_total: i64 = detail.items.iter().map(|i| i.total_price).sum();
    assert_eq!(items_total, detail.order.total_amount);

    // Another customer cannot read the order.
    let other = order_service::get_order(state, &buyer(), resp.order_id).await;
    assert!(matches!(other, Err(AppError::NotFound)));

    let sessions = gateway.sessions.lock().unwrap();
    let session = sessions.last().unwrap();
    assert_eq!(
        session.metadata.get("order_id"),
        Some(&resp.order_id.to_string())
    );
    assert_eq!(session.cancel_url, "https://shop.example.com/cart");
    assert_eq!(session.customer_email.as_deref(), Some("buyer@example.com"));
    assert_eq!(session.line_items[0].unit_amount, 2900);
    assert_eq!(session.line_items[0].description.as_deref(), Some("Brass L"));

    Ok(())
}

async fn wishlist_add_is_idempotent(state: &AppState, product_id: Uuid) -> anyhow::Result<()> {
    let user = buyer();
    let first = wishlist_service::add_to_wishlist(state, &user, AddToWishlistRequest { product_id })
        .await?
        .data
        .unwrap();
    let second = wishlist_service::add_to_wishlist(state, &user, AddToWishlistRequest { product_id })
        .await?
        .data
        .unwrap();
    assert_eq!(first.id, second.id);

    let toggled = wishlist_service::toggle(state, &user, product_id)
        .await?
        .data
        .unwrap();
    assert!(!toggled.in_wishlist);
    Ok(())
}

async fn concurrent_adds_converge_on_one_row(
    state: &AppState,
    product_id: Uuid,
    variant_id: Uuid,
) -> anyhow::Result<()> {
    for _ in 0..10 {
        let user = buyer();
        let mut tasks = Vec::new();
        for quantity in 1..=4 {
            let state = state.clone();
            let user = user.clone();
            tasks.push(tokio::spawn(async move {
                cart_service::add_item(
                    &state,
                    &user,
                    AddToCartRequest {
                        product_id,
                        variant_id: Some(variant_id),
                        quantity,
                    },
                )
                .await
                .map(|_| ())
            }));
        }
        for task in tasks {
            assert!(task.await?.is_ok(), "concurrent add must not hit the unique index");
        }

        let cart = cart_service::get_cart(state, &user).await?.data.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert!((1..=4).contains(&cart.items[0].quantity));
        cart_service::clear_cart(state, &user).await?;
    }
    Ok(())
}

async fn checkout_body_is_optional(state: &AppState) -> anyhow::Result<()> {
    let user = buyer();
    let app = create_router(state.clone());

    // No body and no content type: shipping falls back, the empty cart is what fails.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/checkout")
                .header(header::AUTHORIZATION, bearer(user.user_id, "buyer@example.com"))
                .body(Body::empty())
                .unwrap(),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json["data"]["error"], "Bad Request Cart is empty");
    Ok(())
}

async fn known_customer_is_bound_to_session(
    state: &AppState,
    product_id: Uuid,
) -> anyhow::Result<()> {
    let gateway = Arc::new(FakeGateway {
        customer: Some("cus_existing".into()),
        ..Default::default()
    });
    let state = AppState {
        payments: gateway.clone(),
        ..state.clone()
    };
    let user = buyer();
    cart_service::add_item(
        &state,
        &user,
        AddToCartRequest {
            product_id,
            variant_id: None,
            quantity: 1,
        },
    )
    .await?;

    checkout_service::checkout(&state, &user, None, CheckoutRequest::default()).await?;

    let sessions = gateway.sessions.lock().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].customer.as_deref(), Some("cus_existing"));
    assert_eq!(sessions[0].customer_email, None);
    // No Origin header: redirects go to the configured storefront.
    assert_eq!(sessions[0].cancel_url, "http://localhost:5173/cart");
    Ok(())
}

async fn failed_session_leaves_pending_order(
    state: &AppState,
    product_id: Uuid,
    variant_id: Uuid,
) -> anyhow::Result<()> {
    let gateway = Arc::new(FakeGateway {
        fail_sessions: true,
        ..Default::default()
    });
    let state = AppState {
        payments: gateway.clone(),
        ..state.clone()
    };
    let user = buyer();
    cart_service::add_item(
        &state,
        &user,
        AddToCartRequest {
            product_id,
            variant_id: Some(variant_id),
            quantity: 1,
        },
    )
    .await?;

    let result = checkout_service::checkout(&state, &user, None, CheckoutRequest::default()).await;
    let err = match result {
        Err(err) => err,
        Ok(_) => panic!("checkout must fail when the session is rejected"),
    };
    assert!(matches!(err, AppError::Payment(_)));
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

    let orders = order_service::list_orders(&state, &user, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(orders.items.len(), 1);
    assert_eq!(orders.items[0].status, "pending");
    assert_eq!(orders.items[0].total_amount, 2900);

    let detail = order_service::get_order(&state, &user, orders.items[0].id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].total_price, 2900);
    Ok(())
}

async fn admin_product_writes_are_validated(state: &AppState) -> anyhow::Result<()> {
    let admin = buyer();
    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, 'admin')")
        .bind(admin.user_id)
        .execute(&state.pool)
        .await?;

    let request = |slug: &str, modifier: i64| CreateProductRequest {
        name: "Admin Lamp".into(),
        slug: slug.to_string(),
        description: None,
        category_id: None,
        price: 1000,
        wholesale_price: None,
        stock_quantity: 3,
        min_order_quantity: None,
        images: Vec::new(),
        variants: vec![CreateVariantRequest {
            color: Some("Clay".into()),
            size: None,
            stock_quantity: 1,
            price_modifier: modifier,
        }],
    };

    let negative = product_service::create_product(
        state,
        &admin,
        request(&format!("neg-{}", Uuid::new_v4()), -2000),
    )
    .await;
    assert!(matches!(negative, Err(AppError::BadRequest(_))));

    let slug = format!("admin-lamp-{}", Uuid::new_v4());
    product_service::create_product(state, &admin, request(&slug, 0)).await?;
    let duplicate = product_service::create_product(state, &admin, request(&slug, 0)).await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(msg)) if msg == "slug is already taken"));

    // Non-admins are refused before any validation.
    let refused = product_service::create_product(state, &buyer(), request("x", 0)).await;
    assert!(matches!(refused, Err(AppError::Forbidden)));
    Ok(())
}
