use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::memory::MemoryStore;
use super::postgres::PgStore;
use super::store::SharedStore;
use crate::config::DatabaseConfig;

/// Errors from the entity store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map unique violations to `Conflict`, everything else passes through
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                DatabaseError::Conflict(format!("{} already exists", what))
            }
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                DatabaseError::NotFound(format!("{} references a missing parent", what))
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Chooses and opens the store backing the API
pub struct DatabaseManager;

impl DatabaseManager {
    /// Postgres when a URL is configured, otherwise the in-memory store
    pub async fn open(config: &DatabaseConfig) -> Result<SharedStore, DatabaseError> {
        match config.url.as_deref() {
            Some(url) => {
                Self::validate_url(url)?;
                let store = PgStore::connect(url, config).await?;
                info!("Using postgres store ({} max connections)", config.max_connections);
                Ok(Arc::new(store))
            }
            None => {
                info!("DATABASE_URL not set, using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }

    fn validate_url(url: &str) -> Result<(), DatabaseError> {
        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match parsed.scheme() {
            "postgres" | "postgresql" => Ok(()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }
}
