//! # services
//!
//! Use cases of the gallery, written against the ports in `domains`.
//! Adapters hand in their implementations through [`Ports`]; the HTTP layer
//! only ever talks to [`Services`].

pub mod catalog;
pub mod downloads;
pub mod payments;
pub mod stats;
pub mod text;
pub mod users;

use std::sync::Arc;

use domains::{
    CategoryRepository, Clock, ImageRepository, PasswordHasher, PaymentRepository, PlanCatalog,
    UserRepository,
};

pub use catalog::CatalogService;
pub use downloads::DownloadService;
pub use payments::PaymentService;
pub use stats::StatsService;
pub use users::UserService;

/// Concrete adapters chosen by the binary.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

pub struct Services {
    pub catalog: CatalogService,
    pub users: UserService,
    pub payments: PaymentService,
    pub downloads: DownloadService,
    pub stats: StatsService,
}

impl Services {
    pub fn new(ports: Ports, plans: PlanCatalog) -> Self {
        let Ports { users, categories, images, payments, hasher, clock } = ports;
        Self {
            catalog: CatalogService::new(categories.clone(), images.clone(), clock.clone()),
            users: UserService::new(users.clone(), hasher, clock.clone()),
            payments: PaymentService::new(payments.clone(), users.clone(), plans, clock.clone()),
            downloads: DownloadService::new(images.clone(), users, clock),
            stats: StatsService::new(categories, images, payments),
        }
    }
}
