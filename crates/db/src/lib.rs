//! Document store backends for the Ndiambour catalog.
//!
//! This crate provides:
//! - [`LocalStore`]: a local key-value store kept in a JSON file (or in memory)
//! - [`PgDocumentStore`]: a remote document database on PostgreSQL `jsonb`
//! - [`StoreBackend`]: runtime selection between the two from configuration
//! - `SeaORM` entity and migrations for the `documents` table
//! - [`copy_collections`]: one-shot copy between backends

pub mod copy;
pub mod entities;
pub mod migration;
pub mod store;

pub use copy::{CollectionCopy, CopyReport, copy_collections};
pub use store::{LocalStore, PgDocumentStore, StoreBackend};

use ndiambour_shared::config::StoreConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection sized from the store configuration.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection
/// cannot be established.
pub async fn connect_with(config: &StoreConfig) -> Result<DatabaseConnection, DbErr> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| DbErr::Custom("store.database_url is not set".to_string()))?;

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
