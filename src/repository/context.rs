//! Database context for managing the connection factory and repository access.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::newspaper::NewspaperRepository;
use super::pool::{DbError, DbPool};
use crate::clock::CivilClock;

/// Database context that owns the connection factory and hands out repositories.
///
/// Create one context per command or service, then use it to access all
/// repositories.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:newsredirect.db", clock);
/// ctx.init_schema().await?;
/// let papers = ctx.newspapers().get_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbContext {
    pool: DbPool,
    clock: CivilClock,
}

impl DbContext {
    /// Create a context from a database URL (`sqlite:path` or a plain path).
    pub fn from_url(database_url: &str, clock: CivilClock) -> Self {
        Self {
            pool: DbPool::new(database_url),
            clock,
        }
    }

    /// Create a context from a SQLite file path.
    pub fn from_path(db_path: &Path, clock: CivilClock) -> Self {
        Self {
            pool: DbPool::from_path(db_path),
            clock,
        }
    }

    /// Override how long connections wait for a competing writer.
    pub fn with_busy_timeout(mut self, busy_timeout: std::time::Duration) -> Self {
        self.pool = self.pool.with_busy_timeout(busy_timeout);
        self
    }

    /// Get the underlying connection factory.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn clock(&self) -> CivilClock {
        self.clock
    }

    /// Get a newspaper repository.
    pub fn newspapers(&self) -> NewspaperRepository {
        NewspaperRepository::new(self.pool.clone(), self.clock)
    }

    /// Initialize the database schema.
    ///
    /// This creates the necessary tables if they don't exist and switches the
    /// database to WAL so readers don't block the advancement job.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS newspapers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                base_url TEXT,
                pattern TEXT,
                local_latest_id INTEGER CHECK (local_latest_id IS NULL OR local_latest_id >= 0),
                provider_latest_id INTEGER,
                seed_date TEXT,
                cutover_hour INTEGER NOT NULL DEFAULT 8 CHECK (cutover_hour BETWEEN 0 AND 23),
                last_increment_date TEXT,
                last_redirect_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_newspapers_kind ON newspapers(kind);
            "#,
        )
        .await
    }
}
