//! # Catalog
//!
//! Browsing and curation of categories and images. Everything here is a
//! thin validation layer over the category and image stores.

use std::sync::Arc;

use domains::{
    Category, CategoryPatch, CategoryRepository, Clock, DomainError, DomainResult, Image,
    ImagePatch, ImageRepository, NewCategory, NewImage,
};
use uuid::Uuid;

use crate::text::{normalize_tags, optional, required, slugify};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const FEATURED_COUNT: i64 = 6;
pub const DEFAULT_CATEGORY_ICON: &str = "fas fa-folder";

pub struct CatalogService {
    categories: Arc<dyn CategoryRepository>,
    images: Arc<dyn ImageRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        images: Arc<dyn ImageRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { categories, images, clock }
    }

    pub async fn list_categories(&self) -> DomainResult<Vec<Category>> {
        self.categories.list().await
    }

    pub async fn category_by_slug(&self, slug: &str) -> DomainResult<Category> {
        self.categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("category", slug))
    }

    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_category(&self, new: NewCategory) -> DomainResult<Category> {
        let name = required("name", &new.name)?;
        let slug = slugify(new.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(DomainError::validation("slug must contain a letter or digit"));
        }
        if self.categories.find_by_slug(&slug).await?.is_some() {
            return Err(DomainError::conflict(format!("category slug {slug} already exists")));
        }

        let category = Category {
            id: Uuid::new_v4(),
            name,
            slug,
            icon: optional(new.icon.as_deref())
                .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
            image_count: 0,
            created_at: self.clock.now(),
        };
        self.categories.insert(&category).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> DomainResult<Category> {
        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("category", id))?;

        if let Some(name) = patch.name.as_deref() {
            category.name = required("name", name)?;
        }
        if let Some(raw) = patch.slug.as_deref() {
            let slug = slugify(raw);
            if slug.is_empty() {
                return Err(DomainError::validation("slug must contain a letter or digit"));
            }
            if slug != category.slug {
                if self.categories.find_by_slug(&slug).await?.is_some() {
                    return Err(DomainError::conflict(format!(
                        "category slug {slug} already exists"
                    )));
                }
                category.slug = slug;
            }
        }
        if let Some(icon) = optional(patch.icon.as_deref()) {
            category.icon = icon;
        }

        self.categories.update(&category).await?;
        Ok(category)
    }

    pub async fn list_images(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> DomainResult<Vec<Image>> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        self.images.list_recent(limit, offset).await
    }

    pub async fn featured_images(&self) -> DomainResult<Vec<Image>> {
        self.images.most_downloaded(FEATURED_COUNT).await
    }

    /// Literal tag lookup; no ranking or partial matches.
    pub async fn search_images(&self, query: &str) -> DomainResult<Vec<Image>> {
        let tag = query.trim().to_lowercase();
        if tag.is_empty() {
            return Err(DomainError::validation("search query required"));
        }
        self.images.find_by_tag(&tag).await
    }

    pub async fn images_by_category(&self, category_id: Uuid) -> DomainResult<Vec<Image>> {
        self.images.list_by_category(category_id).await
    }

    pub async fn image_by_id(&self, id: Uuid) -> DomainResult<Image> {
        self.images
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("image", id))
    }

    #[tracing::instrument(skip(self, new), fields(title = %new.title))]
    pub async fn create_image(&self, new: NewImage) -> DomainResult<Image> {
        let title = required("title", &new.title)?;
        let postimage_url = required("postimageUrl", &new.postimage_url)?;
        let thumbnail_url = required("thumbnailUrl", &new.thumbnail_url)?;

        if let Some(category_id) = new.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(DomainError::not_found("category", category_id));
            }
        }

        let image = Image {
            id: Uuid::new_v4(),
            title,
            description: optional(new.description.as_deref()),
            category_id: new.category_id,
            tags: normalize_tags(&new.tags),
            kind: new.kind,
            postimage_url,
            thumbnail_url,
            download_count: 0,
            created_at: self.clock.now(),
        };
        self.images.insert(&image).await?;
        tracing::info!(image_id = %image.id, kind = image.kind.as_str(), "image published");
        Ok(image)
    }

    pub async fn update_image(&self, id: Uuid, patch: ImagePatch) -> DomainResult<Image> {
        let mut image = self.image_by_id(id).await?;

        if let Some(title) = patch.title.as_deref() {
            image.title = required("title", title)?;
        }
        if let Some(description) = patch.description.as_deref() {
            image.description = optional(Some(description));
        }
        if let Some(tags) = patch.tags {
            image.tags = normalize_tags(tags);
        }
        if let Some(kind) = patch.kind {
            image.kind = kind;
        }
        if let Some(url) = patch.postimage_url.as_deref() {
            image.postimage_url = required("postimageUrl", url)?;
        }
        if let Some(url) = patch.thumbnail_url.as_deref() {
            image.thumbnail_url = required("thumbnailUrl", url)?;
        }

        self.images.update(&image).await?;
        Ok(image)
    }
}
