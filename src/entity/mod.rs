pub mod blog_posts;
pub mod blog_product_associations;
pub mod cart_items;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod product_variants;
pub mod products;
pub mod profiles;
pub mod user_roles;
pub mod wishlist_items;

pub use blog_posts::Entity as BlogPosts;
pub use blog_product_associations::Entity as BlogProductAssociations;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_variants::Entity as ProductVariants;
pub use products::Entity as Products;
pub use profiles::Entity as Profiles;
pub use user_roles::Entity as UserRoles;
pub use wishlist_items::Entity as WishlistItems;
