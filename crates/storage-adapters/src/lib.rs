//! # storage-adapters
//!
//! Persistence implementations of the `domains` repository ports.
//!
//! The only backend today is SQLite (feature `db-sqlite`, on by default),
//! which plays the role of the document store: one table per collection,
//! tag sets kept as JSON text.

pub mod error;

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use error::StorageError;

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;
