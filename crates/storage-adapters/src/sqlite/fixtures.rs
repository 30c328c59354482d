//! Row builders shared by the store tests.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use domains::{Category, Image, ImageKind, Network, Payment, PaymentStatus, Plan, UsdAmount, User};
use uuid::Uuid;

/// Millisecond precision keeps equality checks independent of how the
/// driver renders fractional seconds.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn user(email: &str, username: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.into(),
        username: username.into(),
        password_hash: "$argon2id$v=19$stub".into(),
        is_premium: false,
        plan: None,
        premium_expiry_date: None,
        created_at: now(),
    }
}

pub fn category(name: &str, slug: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.into(),
        slug: slug.into(),
        icon: "fas fa-folder".into(),
        image_count: 0,
        created_at: now(),
    }
}

/// `age_secs` pushes `created_at` into the past so ordering is deterministic.
pub fn image(title: &str, category_id: Option<Uuid>, tags: &[&str], age_secs: i64) -> Image {
    Image {
        id: Uuid::new_v4(),
        title: title.into(),
        description: Some(format!("{title} description")),
        category_id,
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        kind: ImageKind::Free,
        postimage_url: format!("https://i.example/{title}.jpg"),
        thumbnail_url: format!("https://i.example/{title}_t.jpg"),
        download_count: 0,
        created_at: now() - Duration::seconds(age_secs),
    }
}

pub fn payment(user_id: Uuid, plan: Plan, age_secs: i64) -> Payment {
    Payment {
        id: Uuid::new_v4(),
        user_id,
        plan,
        network: Network::Trc20,
        wallet_address: "TQn9Y2khEsLJW1ChVWFMSMeRDow5KcbLSE".into(),
        amount_usd: UsdAmount::from_cents(499),
        txid: format!("tx-{age_secs}"),
        status: PaymentStatus::Pending,
        created_at: now() - Duration::seconds(age_secs),
        verified_at: None,
    }
}
