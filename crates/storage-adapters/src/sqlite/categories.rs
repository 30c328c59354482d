use async_trait::async_trait;
use domains::{Category, CategoryRepository, DomainError, DomainResult};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::SqliteStore;
use crate::error::{IntoDomain, StorageError};

const COLUMNS: &str = "id, name, slug, icon, image_count, created_at";

fn category_from_row(row: &SqliteRow) -> Result<Category, StorageError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        icon: row.try_get("icon")?,
        image_count: row.try_get("image_count")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CategoryRepository for SqliteStore {
    async fn insert(&self, category: &Category) -> DomainResult<()> {
        sqlx::query(&format!("INSERT INTO categories ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"))
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.icon)
            .bind(category.image_count)
            .bind(category.created_at)
            .execute(&self.pool)
            .await
            .domain()?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Category>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM categories WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .domain()?;
        row.as_ref().map(category_from_row).transpose().domain()
    }

    async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Category>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM categories WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .domain()?;
        row.as_ref().map(category_from_row).transpose().domain()
    }

    async fn list(&self) -> DomainResult<Vec<Category>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM categories ORDER BY name ASC"))
            .fetch_all(&self.pool)
            .await
            .domain()?;
        rows.iter().map(category_from_row).collect::<Result<Vec<_>, _>>().domain()
    }

    async fn count(&self) -> DomainResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .domain()
    }

    /// `image_count` is owned by the image insert path and is not written here.
    async fn update(&self, category: &Category) -> DomainResult<()> {
        let done = sqlx::query("UPDATE categories SET name = ?, slug = ?, icon = ? WHERE id = ?")
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.icon)
            .bind(category.id)
            .execute(&self.pool)
            .await
            .domain()?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("category", category.id));
        }
        Ok(())
    }
}
