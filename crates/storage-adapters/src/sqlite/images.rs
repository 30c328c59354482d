use std::collections::BTreeSet;

use async_trait::async_trait;
use domains::{DomainError, DomainResult, Image, ImageRepository, ImageSummary};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_column, SqliteStore};
use crate::error::{IntoDomain, StorageError};

const COLUMNS: &str = "id, title, description, category_id, tags, kind, \
                       postimage_url, thumbnail_url, download_count, created_at";

fn image_from_row(row: &SqliteRow) -> Result<Image, StorageError> {
    let tags: BTreeSet<String> = serde_json::from_str(row.try_get("tags")?)?;
    Ok(Image {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category_id: row.try_get("category_id")?,
        tags,
        kind: parse_column("kind", row.try_get("kind")?)?,
        postimage_url: row.try_get("postimage_url")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        download_count: row.try_get("download_count")?,
        created_at: row.try_get("created_at")?,
    })
}

fn images_from_rows(rows: &[SqliteRow]) -> DomainResult<Vec<Image>> {
    rows.iter().map(image_from_row).collect::<Result<Vec<_>, _>>().domain()
}

#[async_trait]
impl ImageRepository for SqliteStore {
    /// The image row and its category's counter share one transaction.
    async fn insert(&self, image: &Image) -> DomainResult<()> {
        let tags = serde_json::to_string(&image.tags).domain()?;
        let mut tx = self.pool.begin().await.domain()?;

        sqlx::query(&format!(
            "INSERT INTO images ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
            .bind(image.id)
            .bind(&image.title)
            .bind(&image.description)
            .bind(image.category_id)
            .bind(tags)
            .bind(image.kind.as_str())
            .bind(&image.postimage_url)
            .bind(&image.thumbnail_url)
            .bind(image.download_count)
            .bind(image.created_at)
            .execute(&mut *tx)
            .await
            .domain()?;

        if let Some(category_id) = image.category_id {
            sqlx::query("UPDATE categories SET image_count = image_count + 1 WHERE id = ?")
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .domain()?;
        }

        tx.commit().await.domain()?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Image>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM images WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .domain()?;
        row.as_ref().map(image_from_row).transpose().domain()
    }

    async fn list_recent(&self, limit: i64, offset: i64) -> DomainResult<Vec<Image>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM images ORDER BY created_at DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .domain()?;
        images_from_rows(&rows)
    }

    async fn list_by_category(&self, category_id: Uuid) -> DomainResult<Vec<Image>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM images WHERE category_id = ? ORDER BY created_at DESC"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .domain()?;
        images_from_rows(&rows)
    }

    async fn most_downloaded(&self, limit: i64) -> DomainResult<Vec<Image>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM images ORDER BY download_count DESC, created_at DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .domain()?;
        images_from_rows(&rows)
    }

    async fn find_by_tag(&self, tag: &str) -> DomainResult<Vec<Image>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM images \
             WHERE EXISTS (SELECT 1 FROM json_each(images.tags) WHERE json_each.value = ?) \
             ORDER BY created_at DESC"
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await
        .domain()?;
        images_from_rows(&rows)
    }

    async fn update(&self, image: &Image) -> DomainResult<()> {
        let tags = serde_json::to_string(&image.tags).domain()?;
        let done = sqlx::query(
            "UPDATE images SET title = ?, description = ?, tags = ?, kind = ?, \
             postimage_url = ?, thumbnail_url = ? WHERE id = ?",
        )
        .bind(&image.title)
        .bind(&image.description)
        .bind(tags)
        .bind(image.kind.as_str())
        .bind(&image.postimage_url)
        .bind(&image.thumbnail_url)
        .bind(image.id)
        .execute(&self.pool)
        .await
        .domain()?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("image", image.id));
        }
        Ok(())
    }

    async fn increment_downloads(&self, id: Uuid) -> DomainResult<bool> {
        let done = sqlx::query("UPDATE images SET download_count = download_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .domain()?;
        Ok(done.rows_affected() == 1)
    }

    async fn summary(&self) -> DomainResult<ImageSummary> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
                    COALESCE(SUM(download_count), 0) AS downloads, \
                    COALESCE(SUM(kind = 'premium'), 0) AS premium, \
                    COALESCE(SUM(kind = 'free'), 0) AS free \
             FROM images",
        )
        .fetch_one(&self.pool)
        .await
        .domain()?;
        Ok(ImageSummary {
            total: row.try_get("total").domain()?,
            downloads: row.try_get("downloads").domain()?,
            premium: row.try_get("premium").domain()?,
            free: row.try_get("free").domain()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::fixtures;
    use domains::CategoryRepository;

    #[tokio::test]
    async fn insert_bumps_category_count() {
        let store = SqliteStore::in_memory().await.unwrap();
        let cat = fixtures::category("Nature", "nature");
        CategoryRepository::insert(&store, &cat).await.unwrap();

        for i in 0..3 {
            let img = fixtures::image(&format!("leaf-{i}"), Some(cat.id), &["green"], i);
            ImageRepository::insert(&store, &img).await.unwrap();
        }
        ImageRepository::insert(&store, &fixtures::image("loose", None, &[], 0)).await.unwrap();

        let reloaded = CategoryRepository::find_by_id(&store, cat.id).await.unwrap().unwrap();
        assert_eq!(reloaded.image_count, 3);
        assert_eq!(store.list_by_category(cat.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let store = SqliteStore::in_memory().await.unwrap();
        let img = fixtures::image("orphan", Some(Uuid::new_v4()), &[], 0);
        let err = ImageRepository::insert(&store, &img).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn recent_listing_pages_newest_first() {
        let store = SqliteStore::in_memory().await.unwrap();
        for (title, age) in [("old", 30), ("new", 0), ("mid", 10)] {
            ImageRepository::insert(&store, &fixtures::image(title, None, &[], age)).await.unwrap();
        }
        let titles = |imgs: Vec<Image>| imgs.into_iter().map(|i| i.title).collect::<Vec<_>>();
        assert_eq!(titles(store.list_recent(2, 0).await.unwrap()), ["new", "mid"]);
        assert_eq!(titles(store.list_recent(2, 2).await.unwrap()), ["old"]);
    }

    #[tokio::test]
    async fn tag_search_is_exact() {
        let store = SqliteStore::in_memory().await.unwrap();
        let beach = fixtures::image("beach", None, &["sea", "sunset"], 0);
        ImageRepository::insert(&store, &beach).await.unwrap();
        let city = fixtures::image("city", None, &["urban"], 5);
        ImageRepository::insert(&store, &city).await.unwrap();

        let hits = store.find_by_tag("sunset").await.unwrap();
        assert_eq!(hits, vec![beach]);
        assert!(store.find_by_tag("sun").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn downloads_feed_featured_and_summary() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut quiet = fixtures::image("quiet", None, &[], 0);
        quiet.kind = domains::ImageKind::Premium;
        let popular = fixtures::image("popular", None, &[], 5);
        ImageRepository::insert(&store, &quiet).await.unwrap();
        ImageRepository::insert(&store, &popular).await.unwrap();

        assert!(store.increment_downloads(popular.id).await.unwrap());
        assert!(store.increment_downloads(popular.id).await.unwrap());
        assert!(!store.increment_downloads(Uuid::new_v4()).await.unwrap());

        let featured = store.most_downloaded(6).await.unwrap();
        assert_eq!(featured[0].id, popular.id);
        assert_eq!(featured[0].download_count, 2);
        assert_eq!(
            store.summary().await.unwrap(),
            ImageSummary { total: 2, downloads: 2, premium: 1, free: 1 }
        );
    }

    #[tokio::test]
    async fn update_rewrites_tags() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut img = fixtures::image("peak", None, &["snow"], 0);
        ImageRepository::insert(&store, &img).await.unwrap();

        img.tags = ["alpine".to_string(), "rock".to_string()].into();
        ImageRepository::update(&store, &img).await.unwrap();

        assert!(store.find_by_tag("snow").await.unwrap().is_empty());
        assert_eq!(ImageRepository::find_by_id(&store, img.id).await.unwrap(), Some(img));
    }
}
