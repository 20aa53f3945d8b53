use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{CategoryId, CategorySummary};
use crate::error::DomainError;
use crate::sync::ensure_unique;

/// Database-generated post identifier.
pub type PostId = i32;

/// Post entity - a blog article together with the categories it is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// HTML body.
    pub content: String,
    /// Storage key (or absolute URL) of the thumbnail image.
    pub thumbnail_image_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<CategorySummary>,
}

impl Post {
    /// Ids of the categories attached to this post.
    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

/// Payload used to create a post or to replace an existing post's fields and category set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub thumbnail_image_key: String,
    pub category_ids: Vec<CategoryId>,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        thumbnail_image_key: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            thumbnail_image_key: thumbnail_image_key.into(),
            category_ids: Vec::new(),
        }
    }

    pub fn with_categories(mut self, ids: impl IntoIterator<Item = CategoryId>) -> Self {
        self.category_ids = ids.into_iter().collect();
        self
    }

    /// Reject drafts that name the same category twice.
    ///
    /// The join table is keyed on `(post_id, category_id)`, so a repeated id
    /// can never be stored; it is reported rather than silently collapsed.
    pub fn validate_category_ids(&self) -> Result<(), DomainError> {
        ensure_unique(&self.category_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_with_distinct_categories_is_valid() {
        let draft = PostDraft::new("Hello", "<p>hi</p>", "k1").with_categories([1, 2, 3]);
        assert!(draft.validate_category_ids().is_ok());
    }

    #[test]
    fn test_draft_with_repeated_category_is_rejected() {
        let draft = PostDraft::new("Hello", "<p>hi</p>", "k1").with_categories([4, 2, 4]);
        let err = draft.validate_category_ids().unwrap_err();
        assert!(matches!(err, DomainError::Duplicate(msg) if msg.contains('4')));
    }

    #[test]
    fn test_draft_without_categories_is_valid() {
        let draft = PostDraft::new("Hello", "", "");
        assert!(draft.validate_category_ids().is_ok());
    }
}
