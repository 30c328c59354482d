//! # SQLite store
//!
//! One [`SqliteStore`] implements every repository port; each collection
//! lives in its own submodule. Schema changes ship as embedded migrations
//! and run on connect.

mod categories;
mod images;
mod payments;
mod users;

#[cfg(test)]
mod fixtures;

use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::StorageError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and applies pending
    /// migrations.
    ///
    /// An in-memory database exists per connection, so those URLs get a
    /// single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool = SqlitePoolOptions::new();
        if url.contains(":memory:") || url.contains("mode=memory") {
            pool = pool.max_connections(1).idle_timeout(None).max_lifetime(None);
        } else {
            pool = pool.max_connections(max_connections.max(1));
        }

        let store = Self { pool: pool.connect_with(options).await? };
        store.migrate().await?;
        tracing::info!(url, "sqlite store ready");
        Ok(store)
    }

    /// Fresh, migrated, private database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::connect("sqlite::memory:", 1).await
    }

    pub async fn migrate(&self) -> Result<(), StorageError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Parses a TEXT column through the domain type's `FromStr`.
fn parse_column<T: FromStr>(column: &'static str, value: String) -> Result<T, StorageError> {
    value.parse().map_err(|_| StorageError::Decode { column, value })
}
