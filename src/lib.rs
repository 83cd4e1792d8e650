pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod models;
pub mod payments;
pub mod pricing;
pub mod response;
pub mod routes;
pub mod state;

pub mod dto {
    pub mod auth;
    pub mod blog;
    pub mod cart;
    pub mod checkout;
    pub mod dashboard;
    pub mod orders;
    pub mod products;
    pub mod profile;
    pub mod wishlist;
}

pub mod middleware {
    pub mod auth;
}

pub mod services {
    pub mod admin_service;
    pub mod blog_service;
    pub mod cart_service;
    pub mod checkout_service;
    pub mod dashboard_service;
    pub mod order_service;
    pub mod product_service;
    pub mod profile_service;
    pub mod wishlist_service;
}
