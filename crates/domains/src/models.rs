//! # Domain Models
//!
//! These structs represent the core entities of PixHub. Field names follow
//! the JSON shape the gallery front-end already speaks (camelCase).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::money::UsdAmount;
use crate::plan::{Network, Plan};

/// A registered account and its premium entitlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_premium: bool,
    pub plan: Option<Plan>,
    pub premium_expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Premium only counts while the expiry lies in the future.
    pub fn has_active_premium(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.premium_expiry_date.is_some_and(|exp| exp > now)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Profile fields a user may change. Entitlement fields are not here:
/// only payment approval grants premium.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// URL-safe key (e.g. "night-sky")
    pub slug: String,
    pub icon: String,
    /// Denormalized; bumped when an image is filed under this category.
    pub image_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub slug: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub icon: Option<String>,
}

/// Whether an image can be downloaded clean by anyone or only by premium users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Free,
    Premium,
}

impl ImageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Free => "free",
            ImageKind::Premium => "premium",
        }
    }
}

impl FromStr for ImageKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(ImageKind::Free),
            "premium" => Ok(ImageKind::Premium),
            other => Err(DomainError::validation(format!("unknown image type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    /// Lower-cased, trimmed and de-duplicated; searched by exact match.
    pub tags: BTreeSet<String>,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    /// Full-resolution source.
    pub postimage_url: String,
    pub thumbnail_url: String,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    pub postimage_url: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: Option<ImageKind>,
    pub postimage_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "rejected" => Ok(PaymentStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown payment status: {other}"))),
        }
    }
}

/// A manually verified crypto payment for a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: Plan,
    pub network: Network,
    pub wallet_address: String,
    #[serde(rename = "amountUSD")]
    pub amount_usd: UsdAmount,
    /// Transaction hash as typed by the payer; never checked on-chain.
    pub txid: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Submission from the payment form. Wallet and amount are optional because
/// the server knows both; when present they must agree with the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub user_id: Uuid,
    pub plan: Plan,
    pub network: Network,
    pub wallet_address: Option<String>,
    #[serde(rename = "amountUSD")]
    pub amount_usd: Option<UsdAmount>,
    pub txid: String,
}

/// Entitlement written to the payer when a payment is approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumGrant {
    pub user_id: Uuid,
    pub plan: Plan,
    pub expires_at: DateTime<Utc>,
}

/// A terminal status transition, applied atomically by the payment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReview {
    pub payment_id: Uuid,
    pub status: PaymentStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub grant: Option<PremiumGrant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadGrant {
    pub image_id: Uuid,
    pub url: String,
    /// Clients overlay the watermark when set.
    pub watermarked: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSummary {
    pub total: i64,
    pub downloads: i64,
    pub premium: i64,
    pub free: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanBreakdown {
    pub monthly: u64,
    pub yearly: u64,
    pub lifetime: u64,
}

/// Admin dashboard figures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_images: i64,
    pub premium_images: i64,
    pub free_images: i64,
    pub total_categories: i64,
    pub total_downloads: i64,
    /// Count of completed payments.
    pub premium_users: u64,
    pub pending_payments: u64,
    pub total_revenue: UsdAmount,
    pub completed_by_plan: PlanBreakdown,
}
