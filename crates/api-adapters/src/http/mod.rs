//! # Router
//!
//! JSON API under `/api`, plus `/health` and `/metrics`.

mod catalog;
mod payments;
mod users;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use domains::DomainError;
use serde_json::json;
use services::Services;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::metrics::Metrics;

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services: Arc::new(services), metrics: Arc::new(Metrics::new()) }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/plans", get(payments::plans))
        .route("/categories", get(catalog::list_categories).post(catalog::create_category))
        // GET resolves a slug, PATCH an id.
        .route("/categories/{key}", get(catalog::category_by_slug).patch(catalog::update_category))
        .route("/images", get(catalog::list_images).post(catalog::create_image))
        .route("/images/featured", get(catalog::featured_images))
        .route("/images/search", get(catalog::search_images))
        .route("/images/category/{category_id}", get(catalog::images_by_category))
        .route("/images/{id}", get(catalog::get_image).patch(catalog::update_image))
        .route("/images/{id}/download", post(catalog::download_image))
        .route("/users", post(users::register))
        .route("/users/{id}", get(users::get_user).patch(users::update_user))
        .route("/users/{id}/payments", get(users::user_payments))
        .route("/payments", get(payments::list_payments).post(payments::submit_payment))
        .route("/payments/pending", get(payments::pending_payments))
        .route("/payments/{id}", get(payments::get_payment).patch(payments::review_payment))
        .route("/admin/stats", get(payments::dashboard_stats));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest("/api", api)
        .layer(cors_policy())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body))
}

/// Malformed ids can never match a row, so they read as "not found".
fn parse_id(entity: &'static str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|_| DomainError::not_found(entity, raw))
}
