use uuid::Uuid;

use crate::{
    dto::products::{
        CategoryList, CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest,
    },
    entity::{
        categories::{Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        product_variants::{
            ActiveModel as VariantActive, Column as VariantCol, Entity as ProductVariants,
            Model as VariantModel,
        },
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product, ProductVariant},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use chrono::Utc;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(Column::IsActive.eq(true));

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let category = Categories::find()
            .filter(CategoryCol::Slug.eq(slug.as_str()))
            .one(&state.orm)
            .await?;
        match category {
            Some(category) => condition = condition.add(Column::CategoryId.eq(category.id)),
            None => {
                let meta = Meta::new(page, limit, 0);
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: Vec::new() },
                    Some(meta),
                ));
            }
        }
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let found = Products::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::IsActive.eq(true))
        .find_also_related(Categories)
        .one(&state.orm)
        .await?;
    let (product, category) = match found {
        Some(found) => found,
        None => return Err(AppError::NotFound),
    };

    let variants = ProductVariants::find()
        .filter(VariantCol::ProductId.eq(product.id))
        .order_by_asc(VariantCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(variant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product: product_from_entity(product),
            category_name: category.map(|c| c.name),
            variants,
        },
        None,
    ))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

pub async fn list_recent_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(state, user).await?;
    let items: Vec<Product> = Products::find()
        .order_by_desc(Column::CreatedAt)
        .limit(10)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(state, user).await?;
    check_variant_prices(
        payload.price,
        payload.variants.iter().map(|v| v.price_modifier),
    )?;
    if payload.slug.trim().is_empty() {
        return Err(AppError::BadRequest("slug must not be empty".into()));
    }

    let txn = state.orm.begin().await?;
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description),
        price: Set(payload.price),
        wholesale_price: Set(payload.wholesale_price),
        stock_quantity: Set(payload.stock_quantity),
        min_order_quantity: Set(payload.min_order_quantity.unwrap_or(1).max(1)),
        images: Set(payload.images),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(slug_conflict)?;

    let mut variants = Vec::with_capacity(payload.variants.len());
    for variant in payload.variants {
        let inserted = VariantActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            color: Set(variant.color),
            size: Set(variant.size),
            stock_quantity: Set(variant.stock_quantity),
            price_modifier: Set(variant.price_modifier),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        variants.push(variant_from_entity(inserted));
    }
    txn.commit().await?;

    tracing::info!(product_id = %product.id, variants = variants.len(), "product created");

    Ok(ApiResponse::success(
        "Product created",
        ProductDetail {
            product: product_from_entity(product),
            category_name: None,
            variants,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(state, user).await?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(price) = payload.price {
        let modifiers: Vec<i64> = ProductVariants::find()
            .filter(VariantCol::ProductId.eq(id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|v| v.price_modifier)
            .collect();
        check_variant_prices(price, modifiers)?;
        active.price = Set(price);
    }
    if let Some(wholesale_price) = payload.wholesale_price {
        active.wholesale_price = Set(Some(wholesale_price));
    }
    if let Some(stock) = payload.stock_quantity {
        active.stock_quantity = Set(stock);
    }
    if let Some(min_order_quantity) = payload.min_order_quantity {
        active.min_order_quantity = Set(min_order_quantity.max(1));
    }
    if let Some(images) = payload.images {
        active.images = Set(images);
    }

    let product = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Flip `is_active`, hiding or re-listing the product in the catalog.
pub async fn toggle_active(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(state, user).await?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let is_active = !existing.is_active;
    let mut active: ActiveModel = existing.into();
    active.is_active = Set(is_active);
    let product = active.update(&state.orm).await?;

    tracing::info!(product_id = %product.id, is_active, "product visibility changed");

    Ok(ApiResponse::success(
        "Product status updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// The base price and every variant's `price + modifier` must be chargeable.
fn check_variant_prices(
    price: i64,
    modifiers: impl IntoIterator<Item = i64>,
) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    for modifier in modifiers {
        if !price.checked_add(modifier).is_some_and(|unit| unit >= 0) {
            return Err(AppError::BadRequest(
                "price plus variant price_modifier must not be negative".into(),
            ));
        }
    }
    Ok(())
}

fn slug_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::BadRequest("slug is already taken".into())
        }
        _ => AppError::OrmError(err),
    }
}

/// Escape `LIKE` wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        price: model.price,
        wholesale_price: model.wholesale_price,
        stock_quantity: model.stock_quantity,
        min_order_quantity: model.min_order_quantity,
        images: model.images,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn variant_from_entity(model: VariantModel) -> ProductVariant {
    ProductVariant {
        id: model.id,
        product_id: model.product_id,
        color: model.color,
        size: model.size,
        stock_quantity: model.stock_quantity,
        price_modifier: model.price_modifier,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("vase"), "vase");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\tmp"), "c:\\\\tmp");
    }

    #[test]
    fn variant_cannot_push_price_below_zero() {
        assert!(check_variant_prices(1000, [0, 500, -1000]).is_ok());
        assert!(matches!(
            check_variant_prices(1000, [-2000]),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            check_variant_prices(-1, Vec::<i64>::new()),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            check_variant_prices(1, [i64::MAX]),
            Err(AppError::BadRequest(_))
        ));
    }
}
