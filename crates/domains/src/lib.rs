//! # domains
//!
//! The central domain model and port definitions for PixHub.
//! Nothing in this crate performs I/O.

pub mod error;
pub mod models;
pub mod money;
pub mod plan;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use money::UsdAmount;
pub use plan::*;
pub use ports::*;
