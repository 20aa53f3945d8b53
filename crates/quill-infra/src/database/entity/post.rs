//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;

use quill_core::domain::{CategorySummary, Post};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub thumbnail_image_key: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_category::Entity")]
    PostCategory,
}

impl Related<super::post_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostCategory.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_category::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build the domain post from its row and joined category rows.
    pub fn into_domain(self, categories: Vec<super::category::Model>) -> Post {
        let mut categories: Vec<CategorySummary> = categories
            .into_iter()
            .map(|c| CategorySummary {
                id: c.id,
                name: c.name,
            })
            .collect();
        categories.sort_by_key(|c| c.id);

        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            thumbnail_image_key: self.thumbnail_image_key,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            categories,
        }
    }
}
