//! Connection handle and serializable units of work.
//!
//! Every unit of work is one database transaction. On PostgreSQL it opens
//! at SERIALIZABLE isolation; SQLite transactions are serializable by
//! construction and take no isolation clause. A transaction dropped
//! without [`Database::commit`] rolls back.

use sea_orm::{
    ConnectOptions, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction,
    IsolationLevel, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use tally_shared::config::DatabaseConfig;
use tracing::{debug, info, instrument};

use crate::error::StoreError;
use crate::migration::Migrator;

/// Shared handle to the database. Clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    conn: DatabaseConnection,
}

impl Database {
    /// Connects, then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails.
    #[instrument(skip_all)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.pool_size())
            .min_connections(config.min_connections.min(config.pool_size()))
            .sqlx_logging(false);

        let conn = sea_orm::Database::connect(options).await?;
        Migrator::up(&conn, None).await?;
        info!(backend = ?conn.get_database_backend(), "database ready");
        Ok(Self { conn })
    }

    /// A fresh, migrated in-memory SQLite database.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot be opened.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect(&DatabaseConfig::in_memory()).await
    }

    /// The underlying connection, for reads outside a unit of work.
    ///
    /// With a single-connection pool, never use it while a transaction from
    /// [`Database::begin`] is open: the call would wait for that transaction.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Opens a unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub async fn begin(&self) -> Result<DatabaseTransaction, StoreError> {
        let isolation = match self.conn.get_database_backend() {
            DatabaseBackend::Sqlite => None,
            _ => Some(IsolationLevel::Serializable),
        };
        let txn = self.conn.begin_with_config(isolation, None).await?;
        debug!("unit of work opened");
        Ok(txn)
    }

    /// Commits a unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; nothing is kept.
    pub async fn commit(txn: DatabaseTransaction) -> Result<(), StoreError> {
        txn.commit().await?;
        debug!("unit of work committed");
        Ok(())
    }
}
