//! Schema migrations for the blog tables.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_blog_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_blog_tables::Migration)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::{ConnectionTrait, Database, Statement};

    #[tokio::test]
    async fn test_migrations_apply_and_roll_back() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        Migrator::up(&db, None).await.unwrap();

        let manager = SchemaManager::new(&db);
        for table in ["post", "category", "post_category"] {
            assert!(manager.has_table(table).await.unwrap(), "{table} missing");
        }

        db.execute(Statement::from_string(
            db.get_database_backend(),
            "INSERT INTO category (name, created_at, updated_at) VALUES ('Tech', '2025-01-01 00:00:00+00:00', '2025-01-01 00:00:00+00:00')",
        ))
        .await
        .unwrap();
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "INSERT INTO post (title, content, thumbnail_image_key, created_at, updated_at) VALUES ('Hello', '<p>hi</p>', 'k1', '2025-01-01 00:00:00+00:00', '2025-01-01 00:00:00+00:00')",
        ))
        .await
        .unwrap();
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "INSERT INTO post_category (post_id, category_id) VALUES (1, 1)",
        ))
        .await
        .unwrap();

        let duplicate = db
            .execute(Statement::from_string(
                db.get_database_backend(),
                "INSERT INTO post_category (post_id, category_id) VALUES (1, 1)",
            ))
            .await;
        assert!(duplicate.is_err());

        Migrator::down(&db, None).await.unwrap();
        assert!(!manager.has_table("post_category").await.unwrap());
    }
}
