//! # seed
//!
//! Fills an empty PixHub database with a few categories, images and a demo
//! account. Safe to re-run: categories that already exist are skipped
//! together with their images.

use std::sync::Arc;

use anyhow::Context;
use auth_adapters::Argon2Hasher;
use configs::Settings;
use domains::{DomainError, ImageKind, NewCategory, NewImage, NewUser, SystemClock};
use secrecy::ExposeSecret;
use services::{Ports, Services};
use storage_adapters::SqliteStore;

struct SeedCategory {
    name: &'static str,
    icon: &'static str,
    images: &'static [SeedImage],
}

struct SeedImage {
    title: &'static str,
    tags: &'static [&'static str],
    kind: ImageKind,
    key: &'static str,
}

const CATALOG: &[SeedCategory] = &[
    SeedCategory {
        name: "Nature",
        icon: "fas fa-leaf",
        images: &[
            SeedImage {
                title: "Misty Forest",
                tags: &["forest", "fog", "green"],
                kind: ImageKind::Free,
                key: "misty-forest",
            },
            SeedImage {
                title: "Alpine Lake",
                tags: &["lake", "mountain"],
                kind: ImageKind::Premium,
                key: "alpine-lake",
            },
        ],
    },
    SeedCategory {
        name: "Abstract",
        icon: "fas fa-shapes",
        images: &[
            SeedImage {
                title: "Neon Waves",
                tags: &["neon", "gradient"],
                kind: ImageKind::Free,
                key: "neon-waves",
            },
            SeedImage {
                title: "Liquid Gold",
                tags: &["gold", "fluid"],
                kind: ImageKind::Premium,
                key: "liquid-gold",
            },
        ],
    },
    SeedCategory {
        name: "Space",
        icon: "fas fa-rocket",
        images: &[
            SeedImage {
                title: "Orion Nebula",
                tags: &["nebula", "stars"],
                kind: ImageKind::Premium,
                key: "orion-nebula",
            },
            SeedImage {
                title: "Night Sky",
                tags: &["stars", "night"],
                kind: ImageKind::Free,
                key: "night-sky",
            },
        ],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = Settings::load().context("loading configuration")?;
    let store = Arc::new(
        SqliteStore::connect(
            settings.database.url.expose_secret(),
            settings.database.max_connections,
        )
            .await
            .context("opening database")?,
    );
    let services = Services::new(
        Ports {
            users: store.clone(),
            categories: store.clone(),
            images: store.clone(),
            payments: store,
            hasher: Arc::new(Argon2Hasher::new()),
            clock: Arc::new(SystemClock),
        },
        settings.billing.plan_catalog().context("billing settings")?,
    );

    for seed in CATALOG {
        let category = match services
            .catalog
            .create_category(NewCategory {
                name: seed.name.into(),
                slug: None,
                icon: Some(seed.icon.into()),
            })
            .await
        {
            Ok(category) => category,
            Err(DomainError::Conflict(_)) => {
                tracing::info!(name = seed.name, "category exists, skipping");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("creating category {}", seed.name)),
        };

        for image in seed.images {
            services
                .catalog
                .create_image(NewImage {
                    title: image.title.into(),
                    description: Some(format!("{} wallpaper", image.title)),
                    category_id: Some(category.id),
                    tags: image.tags.iter().map(|t| t.to_string()).collect(),
                    kind: image.kind,
                    postimage_url: format!("https://i.postimg.cc/pixhub/{}.jpg", image.key),
                    thumbnail_url: format!("https://i.postimg.cc/pixhub/{}_thumb.jpg", image.key),
                })
                .await
                .with_context(|| format!("creating image {}", image.title))?;
        }
        tracing::info!(name = seed.name, images = seed.images.len(), "category seeded");
    }

    match services
        .users
        .register(NewUser {
            email: "demo@pixhub.local".into(),
            username: "demo".into(),
            password: "demo-password".into(),
        })
        .await
    {
        Ok(user) => tracing::info!(user_id = %user.id, "demo user created"),
        Err(DomainError::Conflict(_)) => tracing::info!("demo user exists"),
        Err(e) => return Err(e).context("creating demo user"),
    }

    Ok(())
}
