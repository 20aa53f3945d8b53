//! Domain entities - the core business objects.

mod category;
mod post;

pub use category::{Category, CategoryDraft, CategoryId, CategorySummary};
pub use post::{Post, PostDraft, PostId};
