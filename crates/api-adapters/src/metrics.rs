//! Prometheus counters for the money and download paths.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum ReviewOutcome {
    Completed,
    Rejected,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ReviewLabels {
    outcome: ReviewOutcome,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum DownloadVariant {
    Clean,
    Watermarked,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct DownloadLabels {
    variant: DownloadVariant,
}

pub struct Metrics {
    registry: Registry,
    payments_submitted: Counter,
    payment_reviews: Family<ReviewLabels, Counter>,
    downloads: Family<DownloadLabels, Counter>,
    premium_denials: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("pixhub");
        let payments_submitted = Counter::default();
        let payment_reviews = Family::<ReviewLabels, Counter>::default();
        let downloads = Family::<DownloadLabels, Counter>::default();
        let premium_denials = Counter::default();

        registry.register(
            "payments_submitted",
            "Payments submitted for manual review",
            payments_submitted.clone(),
        );
        registry.register("payment_reviews", "Payment reviews by outcome", payment_reviews.clone());
        registry.register("downloads", "Download grants by variant", downloads.clone());
        registry.register(
            "premium_denials",
            "Premium downloads refused for lack of an active plan",
            premium_denials.clone(),
        );

        Self { registry, payments_submitted, payment_reviews, downloads, premium_denials }
    }

    pub fn payment_submitted(&self) {
        self.payments_submitted.inc();
    }

    pub fn payment_reviewed(&self, outcome: ReviewOutcome) {
        self.payment_reviews.get_or_create(&ReviewLabels { outcome }).inc();
    }

    pub fn download(&self, watermarked: bool) {
        let variant = if watermarked {
            DownloadVariant::Watermarked
        } else {
            DownloadVariant::Clean
        };
        self.downloads.get_or_create(&DownloadLabels { variant }).inc();
    }

    pub fn premium_denied(&self) {
        self.premium_denials.inc();
    }

    /// OpenMetrics text exposition of every registered metric.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        let metrics = Metrics::new();
        metrics.payment_submitted();
        metrics.payment_reviewed(ReviewOutcome::Completed);
        metrics.download(true);
        metrics.download(true);

        let text = metrics.render().unwrap();
        assert!(text.contains("pixhub_payments_submitted_total 1"));
        assert!(text.contains("pixhub_payment_reviews_total{outcome=\"Completed\"} 1"));
        assert!(text.contains("pixhub_downloads_total{variant=\"Watermarked\"} 2"));
        assert!(text.ends_with("# EOF\n"));
    }
}
