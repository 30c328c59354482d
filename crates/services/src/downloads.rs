//! # Download gate
//!
//! Decides what a visitor gets when they hit "Download" on an image page.

use std::sync::Arc;

use domains::{
    Clock, DomainError, DomainResult, DownloadGrant, ImageKind, ImageRepository, UserRepository,
};
use uuid::Uuid;

pub struct DownloadService {
    images: Arc<dyn ImageRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl DownloadService {
    pub fn new(
        images: Arc<dyn ImageRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { images, users, clock }
    }

    /// | image   | active premium | outcome                    |
    /// |---------|----------------|----------------------------|
    /// | free    | no             | source URL, watermarked    |
    /// | free    | yes            | source URL, clean          |
    /// | premium | no             | `PremiumRequired`          |
    /// | premium | yes            | source URL, clean          |
    ///
    /// Every grant counts as one download.
    #[tracing::instrument(skip(self))]
    pub async fn authorize(
        &self,
        image_id: Uuid,
        user_id: Option<Uuid>,
    ) -> DomainResult<DownloadGrant> {
        let image = self
            .images
            .find_by_id(image_id)
            .await?
            .ok_or_else(|| DomainError::not_found("image", image_id))?;

        let premium = match user_id {
            Some(id) => self
                .users
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found("user", id))?
                .has_active_premium(self.clock.now()),
            None => false,
        };

        if image.kind == ImageKind::Premium && !premium {
            return Err(DomainError::PremiumRequired(format!(
                "image {image_id} requires an active premium plan"
            )));
        }

        if !self.images.increment_downloads(image_id).await? {
            return Err(DomainError::not_found("image", image_id));
        }

        Ok(DownloadGrant { image_id, url: image.postimage_url, watermarked: !premium })
    }
}
