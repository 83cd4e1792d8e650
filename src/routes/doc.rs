use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        blog::{BlogPostDetail, BlogPostList},
        cart::{AddToCartRequest, CartLine, CartSnapshot, CartVariant, UpdateQuantityRequest},
        checkout::{CheckoutRequest, CheckoutResponse},
        dashboard::{AdminStats, RecentUser, RecentUserList, RetailStats, WholesaleStats},
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::{
            CategoryList, CreateProductRequest, CreateVariantRequest, ProductDetail, ProductList,
            UpdateProductRequest,
        },
        profile::UpdateProfileRequest,
        wishlist::{AddToWishlistRequest, WishlistEntry, WishlistList, WishlistState},
    },
    models::{
        BlogPost, Category, MemberType, Order, OrderItem, OrderStatus, Product, ProductSummary,
        ProductVariant, Profile, WishlistItem,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, blog, cart, checkout, dashboard, health, orders, params, products, profile,
        wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        products::list_categories,
        cart::get_cart,
        cart::add_to_cart,
        cart::clear_cart,
        cart::update_quantity,
        cart::remove_item,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::wishlist_state,
        wishlist::remove_from_wishlist,
        wishlist::toggle_wishlist,
        checkout::checkout,
        orders::list_orders,
        orders::get_order,
        profile::get_profile,
        profile::update_profile,
        dashboard::retail_dashboard,
        dashboard::wholesale_dashboard,
        blog::list_posts,
        blog::get_post,
        admin::stats,
        admin::recent_users,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::recent_products,
        admin::create_product,
        admin::update_product,
        admin::toggle_product_active
    ),
    components(
        schemas(
            Category,
            Product,
            ProductVariant,
            ProductSummary,
            WishlistItem,
            Order,
            OrderItem,
            OrderStatus,
            MemberType,
            Profile,
            BlogPost,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartVariant,
            CartLine,
            CartSnapshot,
            AddToWishlistRequest,
            WishlistEntry,
            WishlistList,
            WishlistState,
            CheckoutRequest,
            CheckoutResponse,
            OrderList,
            OrderWithItems,
            UpdateOrderStatusRequest,
            CreateVariantRequest,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductDetail,
            CategoryList,
            UpdateProfileRequest,
            RetailStats,
            WholesaleStats,
            AdminStats,
            RecentUser,
            RecentUserList,
            BlogPostList,
            BlogPostDetail,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::BlogQuery,
            Meta,
            ApiResponse<CartSnapshot>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CheckoutResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Checkout", description = "Checkout endpoint"),
        (name = "Orders", description = "Order history endpoints"),
        (name = "Profile", description = "Profile endpoints"),
        (name = "Dashboard", description = "Member dashboards"),
        (name = "Blog", description = "Blog endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
