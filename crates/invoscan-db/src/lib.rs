//! Invoscan Database Layer
//!
//! Provides `SQLite` storage for the IBAN blacklist.
//! Uses `SQLx` with embedded migrations.
//!
//! # Example
//!
//! ```ignore
//! use invoscan_db::Database;
//!
//! let db = Database::new("invoscan.db", 5).await?;
//! db.run_migrations().await?;
//! db.blacklist_iban("FR7630006000011234567890189", "fraud report").await?;
//! ```
//!
//! The scanner never writes: it only asks which candidates are listed,
//! through the [`invoscan_core::BlacklistLookup`] implementation on
//! [`Database`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod blacklist;
pub mod connection;
pub mod error;
pub mod migrations;

// Re-export commonly used types
pub use connection::StorePool;
pub use error::{DatabaseError, Result};

use async_trait::async_trait;
use invoscan_core::{BlacklistEntry, BlacklistLookup, DatabaseConfig, InvoscanError};
use std::collections::HashSet;
use std::path::Path;

/// High-level database interface with migrations.
#[derive(Debug, Clone)]
pub struct Database {
    pool: StorePool,
}

impl Database {
    /// Open a database at `path` (or `:memory:` for in-memory).
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let pool = StorePool::new(path, max_connections).await?;
        Ok(Self { pool })
    }

    /// Open the configured database, creating its directory if needed, and
    /// bring the schema up to date.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let path = config
            .resolved_path()
            .map_err(|e| DatabaseError::Open(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DatabaseError::Open(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let db = Self::new(&path, config.max_connections).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Get the current schema version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Add an IBAN to the blacklist.
    pub async fn blacklist_iban(&self, iban: &str, reason: &str) -> Result<BlacklistEntry> {
        blacklist::blacklist_iban(self.pool(), iban, reason).await
    }

    /// Return the subset of `ibans` that is blacklisted.
    pub async fn find_by_ibans(&self, ibans: &[String]) -> Result<HashSet<String>> {
        blacklist::find_by_ibans(self.pool(), ibans).await
    }

    /// Whether a single IBAN is blacklisted.
    pub async fn is_blacklisted(&self, iban: &str) -> Result<bool> {
        blacklist::exists(self.pool(), iban).await
    }

    /// List all blacklist entries.
    pub async fn list_blacklist(&self) -> Result<Vec<BlacklistEntry>> {
        blacklist::list(self.pool()).await
    }

    /// Remove an IBAN from the blacklist.
    pub async fn remove_from_blacklist(&self, iban: &str) -> Result<()> {
        blacklist::delete(self.pool(), iban).await
    }
}

#[async_trait]
impl BlacklistLookup for Database {
    async fn lookup_any(&self, candidates: &[String]) -> invoscan_core::Result<HashSet<String>> {
        self.find_by_ibans(candidates)
            .await
            .map_err(|e| InvoscanError::Lookup(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn create_test_db() -> Database {
        let db = Database::new(":memory:", 2)
            .await
            .expect("create database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    #[tokio::test]
    async fn test_database_migrations() {
        let db = Database::new(":memory:", 1)
            .await
            .expect("create database");

        assert_eq!(db.get_schema_version().await.expect("get version"), 0);
        db.run_migrations().await.expect("run migrations");
        assert_eq!(db.get_schema_version().await.expect("get version"), 1);
    }

    #[tokio::test]
    async fn test_database_schema() {
        let db = create_test_db().await;

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('blacklisted_ibans') ORDER BY cid")
                .fetch_all(db.pool())
                .await
                .expect("query columns");

        assert_eq!(columns, vec!["id", "iban", "reason", "created_at"]);
    }

    #[tokio::test]
    async fn test_open_from_config_creates_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = DatabaseConfig {
            path: Some(dir.path().join("nested").join("invoscan.db")),
            max_connections: 1,
        };

        let db = Database::open(&config).await.expect("open database");
        db.blacklist_iban("GB29NWBK60161331926819", "test")
            .await
            .expect("blacklist");
        db.close().await;

        let db = Database::open(&config).await.expect("reopen database");
        assert!(db
            .is_blacklisted("GB29NWBK60161331926819")
            .await
            .expect("exists"));
    }

    #[tokio::test]
    async fn test_blacklist_lookup_trait() {
        let db = create_test_db().await;
        db.blacklist_iban("FR7630006000011234567890189", "fraud")
            .await
            .expect("blacklist");

        let lookup: Arc<dyn BlacklistLookup> = Arc::new(db);
        let hits = lookup
            .lookup_any(&[
                "FR7630006000011234567890189".to_string(),
                "DE44500105175407324931".to_string(),
            ])
            .await
            .expect("lookup");

        assert_eq!(hits, HashSet::from(["FR7630006000011234567890189".to_string()]));
    }

    #[tokio::test]
    async fn test_lookup_after_close_is_reported() {
        let db = create_test_db().await;
        let handle = db.clone();
        db.close().await;

        let result = handle.lookup_any(&["GB29NWBK60161331926819".to_string()]).await;
        assert!(matches!(result, Err(InvoscanError::Lookup(_))));
    }

    #[tokio::test]
    async fn test_lookup_with_empty_batch_skips_query() {
        let db = create_test_db().await;
        let handle = db.clone();
        db.close().await;

        // No query is issued, so a closed pool does not matter
        let hits = handle.lookup_any(&[]).await.expect("lookup");
        assert!(hits.is_empty());
    }
}
