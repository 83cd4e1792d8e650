use chrono::Utc;
use sea_orm::{
    ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder,
    sea_query::NullOrdering,
};

use crate::{
    dto::blog::{BlogPostDetail, BlogPostList},
    entity::{
        blog_posts::{Column as PostCol, Entity as BlogPosts, Model as PostModel},
        blog_product_associations::{Column as AssocCol, Entity as BlogProductAssociations},
        products::{Column as ProdCol, Entity as Products},
        profiles::{Entity as Profiles, Model as ProfileModel},
    },
    error::{AppError, AppResult},
    models::BlogPost,
    response::{ApiResponse, Meta},
    routes::params::BlogQuery,
    services::product_service::product_from_entity,
    state::AppState,
};

/// Case-insensitive match against title, excerpt or any tag.
pub fn matches_query(post: &BlogPost, query: &str) -> bool {
    let needle = query.to_lowercase();
    post.title.to_lowercase().contains(&needle)
        || post
            .excerpt
            .as_deref()
            .is_some_and(|excerpt| excerpt.to_lowercase().contains(&needle))
        || post
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

pub async fn list_posts(state: &AppState, query: BlogQuery) -> AppResult<ApiResponse<BlogPostList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let posts: Vec<BlogPost> = BlogPosts::find()
        .filter(PostCol::IsPublished.eq(true))
        .order_by_with_nulls(PostCol::PublishedAt, Order::Desc, NullOrdering::Last)
        .find_also_related(Profiles)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(post, author)| post_from_entity(post, author))
        .collect();

    // Search runs in memory so tags are matched by substring like titles.
    let matching: Vec<BlogPost> = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => posts.into_iter().filter(|p| matches_query(p, q)).collect(),
        _ => posts,
    };

    let total = matching.len() as i64;
    let items = matching
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Posts", BlogPostList { items }, Some(meta)))
}

pub async fn get_post(state: &AppState, slug: &str) -> AppResult<ApiResponse<BlogPostDetail>> {
    let found = BlogPosts::find()
        .filter(PostCol::Slug.eq(slug))
        .filter(PostCol::IsPublished.eq(true))
        .find_also_related(Profiles)
        .one(&state.orm)
        .await?;
    let (post, author) = match found {
        Some(found) => found,
        None => return Err(AppError::NotFound),
    };

    let product_ids: Vec<_> = BlogProductAssociations::find()
        .filter(AssocCol::BlogPostId.eq(post.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|assoc| assoc.product_id)
        .collect();

    let related_products = if product_ids.is_empty() {
        Vec::new()
    } else {
        Products::find()
            .filter(ProdCol::Id.is_in(product_ids))
            .filter(ProdCol::IsActive.eq(true))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect()
    };

    Ok(ApiResponse::success(
        "Post",
        BlogPostDetail {
            post: post_from_entity(post, author),
            related_products,
        },
        Some(Meta::empty()),
    ))
}

fn post_from_entity(model: PostModel, author: Option<ProfileModel>) -> BlogPost {
    BlogPost {
        id: model.id,
        author_id: model.author_id,
        author_name: author.map(|a| a.full_name),
        title: model.title,
        slug: model.slug,
        excerpt: model.excerpt,
        content: model.content,
        featured_image: model.featured_image,
        category: model.category,
        tags: model.tags,
        published_at: model.published_at.map(|dt| dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn post(title: &str, excerpt: Option<&str>, tags: &[&str]) -> BlogPost {
        BlogPost {
            id: Uuid::new_v4(),
            author_id: None,
            author_name: None,
            title: title.into(),
            slug: "post".into(),
            excerpt: excerpt.map(str::to_string),
            content: String::new(),
            featured_image: None,
            category: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published_at: None,
        }
    }

    #[test]
    fn search_matches_title_excerpt_and_tags() {
        let p = post("Caring for Wax Prints", Some("Washing tips"), &["Textiles", "care"]);
        assert!(matches_query(&p, "wax"));
        assert!(matches_query(&p, "WASHING"));
        assert!(matches_query(&p, "textile"));
        assert!(!matches_query(&p, "pottery"));
    }

    #[test]
    fn search_tolerates_missing_excerpt() {
        let p = post("Pottery basics", None, &[]);
        assert!(matches_query(&p, "pottery"));
        assert!(!matches_query(&p, "baskets"));
    }
}
