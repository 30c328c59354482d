//! # Ports
//!
//! Contracts the services depend on. Storage, hashing and time are injected
//! through these traits so each adapter can be swapped (or mocked) freely.
//! Enable the `testing` feature to get the mockall-generated `MockXxx` types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::{Category, Image, ImageSummary, Payment, PaymentReview, PaymentStatus, User};

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email or username is taken.
    async fn insert(&self, user: &User) -> DomainResult<()>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    /// Persists profile fields (email, username). Entitlement is left alone.
    async fn update_profile(&self, user: &User) -> DomainResult<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, category: &Category) -> DomainResult<()>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Category>>;
    async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Category>>;
    /// Ordered by name, ascending.
    async fn list(&self) -> DomainResult<Vec<Category>>;
    async fn count(&self) -> DomainResult<i64>;
    async fn update(&self, category: &Category) -> DomainResult<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Stores the image and bumps its category's `image_count` in one step.
    async fn insert(&self, image: &Image) -> DomainResult<()>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Image>>;
    /// Newest first.
    async fn list_recent(&self, limit: i64, offset: i64) -> DomainResult<Vec<Image>>;
    async fn list_by_category(&self, category_id: Uuid) -> DomainResult<Vec<Image>>;
    /// Highest download count first.
    async fn most_downloaded(&self, limit: i64) -> DomainResult<Vec<Image>>;
    /// Exact tag match.
    async fn find_by_tag(&self, tag: &str) -> DomainResult<Vec<Image>>;
    async fn update(&self, image: &Image) -> DomainResult<()>;
    /// Returns `false` when no image has this id.
    async fn increment_downloads(&self, id: Uuid) -> DomainResult<bool>;
    /// Image totals, split by kind.
    async fn summary(&self) -> DomainResult<ImageSummary>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &Payment) -> DomainResult<()>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>>;
    /// Newest first.
    async fn list_all(&self) -> DomainResult<Vec<Payment>>;
    async fn list_by_status(&self, status: PaymentStatus) -> DomainResult<Vec<Payment>>;
    async fn list_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Payment>>;
    /// Moves a *pending* payment to the review's status and writes the
    /// premium grant (if any) in the same transaction.
    ///
    /// Returns `false` without touching anything when the payment is no
    /// longer pending, so a terminal status can never be overwritten.
    async fn apply_review(&self, review: &PaymentReview) -> DomainResult<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Returns a self-describing hash (PHC string) of `password`.
    fn hash(&self, password: &str) -> DomainResult<String>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
