//! # api-adapters
//!
//! HTTP surface of PixHub. With `web-axum` enabled this crate exposes an
//! axum [`Router`](http::router) over [`services::Services`]; the metrics
//! registry is framework-independent.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod http;

pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use error::ApiError;
#[cfg(feature = "web-axum")]
pub use http::{router, AppState};
