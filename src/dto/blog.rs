use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{BlogPost, Product};

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogPostList {
    pub items: Vec<BlogPost>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogPostDetail {
    pub post: BlogPost,
    pub related_products: Vec<Product>,
}
