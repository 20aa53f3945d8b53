//! SeaORM entities for the `post`, `category`, and `post_category` tables.

pub mod category;
pub mod post;
pub mod post_category;
