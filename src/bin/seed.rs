use marketplace_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm_from_pool(&pool)).await?;

    let apparel = ensure_category(&pool, "Apparel", "apparel").await?;
    let home = ensure_category(&pool, "Home", "home").await?;
    let hoodie = seed_products(&pool, apparel, home).await?;
    seed_blog_post(&pool, hoodie).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str, slug: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug)
        VALUES ($1, $2, $3)
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await?;

    println!("Ensured category {slug}");
    Ok(id)
}

async fn ensure_product(
    pool: &sqlx::PgPool,
    category_id: Uuid,
    (name, slug, desc, price, wholesale_price, stock): (&str, &str, &str, i64, i64, i32),
) -> anyhow::Result<(Uuid, bool)> {
    let inserted: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO products
            (id, category_id, name, slug, description, price, wholesale_price, stock_quantity, images)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (slug) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(category_id)
    .bind(name)
    .bind(slug)
    .bind(desc)
    .bind(price)
    .bind(wholesale_price)
    .bind(stock)
    .bind(vec![format!("https://images.example.com/{slug}.jpg")])
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some((id,)) => Ok((id, true)),
        None => {
            let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM products WHERE slug = $1")
                .bind(slug)
                .fetch_one(pool)
                .await?;
            Ok((id, false))
        }
    }
}

/// Returns the hoodie id so the demo blog post can link to it.
async fn seed_products(pool: &sqlx::PgPool, apparel: Uuid, home: Uuid) -> anyhow::Result<Uuid> {
    let (hoodie, created) = ensure_product(
        pool,
        apparel,
        ("Linen Hoodie", "linen-hoodie", "Light hoodie in washed linen", 5500, 3900, 50),
    )
    .await?;

    // Variants only on first insert, there is no natural key to upsert on.
    if created {
        let variants = [
            ("Sand", "M", 0_i64),
            ("Sand", "XL", 300),
            ("Charcoal", "M", 500),
        ];
        for (color, size, modifier) in variants {
            sqlx::query(
                r#"
                INSERT INTO product_variants (id, product_id, color, size, stock_quantity, price_modifier)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(hoodie)
            .bind(color)
            .bind(size)
            .bind(10)
            .bind(modifier)
            .execute(pool)
            .await?;
        }
    }

    let others = [
        ("Stoneware Mug", "stoneware-mug", "Hand glazed, 350 ml", 1800, 1100, 100),
        ("Wool Throw", "wool-throw", "Merino blanket for the sofa", 8900, 6200, 20),
    ];
    for product in others {
        ensure_product(pool, home, product).await?;
    }

    println!("Seeded products");
    Ok(hoodie)
}

async fn seed_blog_post(pool: &sqlx::PgPool, product_id: Uuid) -> anyhow::Result<()> {
    let (post_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO blog_posts
            (id, title, slug, excerpt, content, category, tags, is_published, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, now())
        ON CONFLICT (slug) DO UPDATE SET title = EXCLUDED.title
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Layering for spring")
    .bind("layering-for-spring")
    .bind("Three pieces that carry you from March to May")
    .bind("Start with a breathable base and add a light linen layer on top.")
    .bind("style")
    .bind(vec!["linen".to_string(), "spring".to_string()])
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO blog_product_associations (blog_post_id, product_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(product_id)
    .execute(pool)
    .await?;

    println!("Seeded blog post");
    Ok(())
}
