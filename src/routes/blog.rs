use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::blog::{BlogPostDetail, BlogPostList},
    error::AppResult,
    response::ApiResponse,
    routes::params::BlogQuery,
    services::blog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/{slug}", get(get_post))
}

#[utoipa::path(
    get,
    path = "/api/blog",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Match title, excerpt or tag")
    ),
    responses(
        (status = 200, description = "Published posts, newest first", body = ApiResponse<BlogPostList>)
    ),
    tag = "Blog"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> AppResult<Json<ApiResponse<BlogPostList>>> {
    let resp = blog_service::list_posts(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post with related products", body = ApiResponse<BlogPostDetail>),
        (status = 404, description = "Post not found")
    ),
    tag = "Blog"
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<BlogPostDetail>>> {
    let resp = blog_service::get_post(&state, &slug).await?;
    Ok(Json(resp))
}
