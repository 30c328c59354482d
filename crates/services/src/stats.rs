//! Admin dashboard figures.

use std::sync::Arc;

use domains::{
    CategoryRepository, DashboardStats, DomainResult, ImageRepository, PaymentRepository,
    PaymentStatus, Plan, PlanBreakdown,
};

pub struct StatsService {
    categories: Arc<dyn CategoryRepository>,
    images: Arc<dyn ImageRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl StatsService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        images: Arc<dyn ImageRepository>,
        payments: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self { categories, images, payments }
    }

    pub async fn dashboard(&self) -> DomainResult<DashboardStats> {
        let summary = self.images.summary().await?;
        let total_categories = self.categories.count().await?;
        let payments = self.payments.list_all().await?;

        let mut stats = DashboardStats {
            total_images: summary.total,
            premium_images: summary.premium,
            free_images: summary.free,
            total_categories,
            total_downloads: summary.downloads,
            ..DashboardStats::default()
        };
        let mut by_plan = PlanBreakdown::default();
        for payment in &payments {
            match payment.status {
                PaymentStatus::Pending => stats.pending_payments += 1,
                PaymentStatus::Completed => {
                    stats.premium_users += 1;
                    stats.total_revenue = stats.total_revenue + payment.amount_usd;
                    match payment.plan {
                        Plan::Monthly => by_plan.monthly += 1,
                        Plan::Yearly => by_plan.yearly += 1,
                        Plan::Lifetime => by_plan.lifetime += 1,
                    }
                }
                PaymentStatus::Rejected => {}
            }
        }
        stats.completed_by_plan = by_plan;
        Ok(stats)
    }
}
