use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::wishlist::{AddToWishlistRequest, WishlistEntry, WishlistList, WishlistState},
    entity::{
        products::{Entity as Products, Model as ProductModel},
        wishlist_items::{
            ActiveModel as WishlistActive, Column as WishCol, Entity as WishlistItems,
            Model as WishlistModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ProductSummary, WishlistItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = WishlistItems::find()
        .filter(WishCol::UserId.eq(user.user_id))
        .order_by_desc(WishCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Products)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(item, product)| {
            product.map(|product| WishlistEntry {
                id: item.id,
                product_id: item.product_id,
                product: summary_from_entity(product),
            })
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", WishlistList { items }, Some(meta)))
}

pub async fn contains(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistState>> {
    let in_wishlist = find_entry(state, user, product_id).await?.is_some();
    Ok(ApiResponse::success(
        "OK",
        WishlistState {
            product_id,
            in_wishlist,
        },
        Some(Meta::empty()),
    ))
}

/// Idempotent: an existing entry is returned unchanged.
pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddToWishlistRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("Product not found".into()));
    }

    let item = match find_entry(state, user, payload.product_id).await? {
        Some(existing) => existing,
        None => {
            WishlistActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                product_id: Set(payload.product_id),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    Ok(ApiResponse::success(
        "Added to wishlist",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistState>> {
    let result = WishlistItems::delete_many()
        .filter(WishCol::UserId.eq(user.user_id))
        .filter(WishCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        WishlistState {
            product_id,
            in_wishlist: false,
        },
        Some(Meta::empty()),
    ))
}

pub async fn toggle(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistState>> {
    if find_entry(state, user, product_id).await?.is_some() {
        return remove_from_wishlist(state, user, product_id).await;
    }

    add_to_wishlist(state, user, AddToWishlistRequest { product_id }).await?;
    Ok(ApiResponse::success(
        "Added to wishlist",
        WishlistState {
            product_id,
            in_wishlist: true,
        },
        Some(Meta::empty()),
    ))
}

async fn find_entry(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<Option<WishlistModel>> {
    let entry = WishlistItems::find()
        .filter(WishCol::UserId.eq(user.user_id))
        .filter(WishCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?;
    Ok(entry)
}

fn item_from_entity(model: WishlistModel) -> WishlistItem {
    WishlistItem {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn summary_from_entity(model: ProductModel) -> ProductSummary {
    ProductSummary {
        name: model.name,
        price: model.price,
        images: model.images,
        slug: model.slug,
    }
}
