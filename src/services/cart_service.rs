use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, Set,
    sea_query::{Expr, OnConflict},
};
use sea_orm::ActiveValue::NotSet;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{AddToCartRequest, CartLine, CartSnapshot, CartVariant, UpdateQuantityRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        product_variants::{Column as VariantCol, Entity as ProductVariants},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::ProductSummary,
    pricing::MAX_LINE_QUANTITY,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Debug, FromRow)]
struct CartRow {
    id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    quantity: i32,
    name: String,
    price: i64,
    images: Vec<String>,
    slug: String,
    color: Option<String>,
    size: Option<String>,
    price_modifier: Option<i64>,
}

impl From<CartRow> for CartLine {
    fn from(row: CartRow) -> Self {
        // A variant is only attached when the left join actually matched.
        let variant = match (row.variant_id, row.price_modifier) {
            (Some(_), Some(price_modifier)) => Some(CartVariant {
                color: row.color,
                size: row.size,
                price_modifier,
            }),
            _ => None,
        };
        CartLine::new(
            row.id,
            row.product_id,
            row.variant_id,
            row.quantity,
            ProductSummary {
                name: row.name,
                price: row.price,
                images: row.images,
                slug: row.slug,
            },
            variant,
        )
    }
}

fn check_quantity_limit(quantity: i32) -> AppResult<()> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must not exceed {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

/// Read the user's cart back from the store and derive its totals.
pub async fn load_cart(pool: &DbPool, user_id: Uuid) -> AppResult<CartSnapshot> {
    let rows = sqlx::query_as::<_, CartRow>(
        r#"
        SELECT ci.id, ci.product_id, ci.variant_id, ci.quantity,
               p.name, p.price, p.images, p.slug,
               pv.color, pv.size, pv.price_modifier
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        LEFT JOIN product_variants pv ON pv.id = ci.variant_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at ASC, ci.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(CartSnapshot::from_lines(
        rows.into_iter().map(CartLine::from).collect(),
    ))
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartSnapshot>> {
    let cart = load_cart(&state.pool, user.user_id).await?;
    let meta = Meta::unpaged(cart.items.len());
    Ok(ApiResponse::success("OK", cart, Some(meta)))
}

/// Upsert keyed by (user, product, variant): re-adding sets the quantity.
pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartSnapshot>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    check_quantity_limit(payload.quantity)?;

    let product = Products::find_by_id(payload.product_id)
        .filter(ProdCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    if let Some(variant_id) = payload.variant_id {
        let variant = ProductVariants::find_by_id(variant_id)
            .filter(VariantCol::ProductId.eq(payload.product_id))
            .one(&state.orm)
            .await?;
        if variant.is_none() {
            return Err(AppError::BadRequest(
                "variant not found for product".to_string(),
            ));
        }
    }

    // One statement so concurrent adds of the same line converge on one row.
    // The unique index treats NULL variants as equal, so plain products conflict too.
    CartItems::insert(CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(payload.product_id),
        variant_id: Set(payload.variant_id),
        quantity: Set(payload.quantity),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([CartCol::UserId, CartCol::ProductId, CartCol::VariantId])
            .update_column(CartCol::Quantity)
            .to_owned(),
    )
    .exec(&state.orm)
    .await?;

    tracing::debug!(
        user_id = %user.user_id,
        product_id = %payload.product_id,
        variant_id = ?payload.variant_id,
        quantity = payload.quantity,
        "cart item upserted"
    );

    let cart = load_cart(&state.pool, user.user_id).await?;
    Ok(ApiResponse::success("Added to cart", cart, Some(Meta::empty())))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartSnapshot>> {
    if payload.quantity <= 0 {
        return remove_item(state, user, item_id).await;
    }
    check_quantity_limit(payload.quantity)?;

    let result = CartItems::update_many()
        .col_expr(CartCol::Quantity, Expr::value(payload.quantity))
        .filter(CartCol::Id.eq(item_id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let cart = load_cart(&state.pool, user.user_id).await?;
    Ok(ApiResponse::success("Quantity updated", cart, Some(Meta::empty())))
}

/// Unconditional delete: removing an item that is already gone is not an error.
pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<CartSnapshot>> {
    let result = CartItems::delete_many()
        .filter(CartCol::Id.eq(item_id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    tracing::debug!(
        user_id = %user.user_id,
        item_id = %item_id,
        removed = result.rows_affected,
        "cart item removed"
    );

    let cart = load_cart(&state.pool, user.user_id).await?;
    Ok(ApiResponse::success("Removed from cart", cart, Some(Meta::empty())))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartSnapshot>> {
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Cart cleared",
        CartSnapshot::empty(),
        Some(Meta::empty()),
    ))
}
