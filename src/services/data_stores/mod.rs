mod hashmap_user_store;
mod hashmap_website_store;
mod postgres_user_store;
mod postgres_website_store;

pub use hashmap_user_store::*;
pub use hashmap_website_store::*;
pub use postgres_user_store::*;
pub use postgres_website_store::*;
