//! Diesel-based newspaper repository for SQLite.
//!
//! Uses diesel-async's SyncConnectionWrapper to provide an async interface
//! while maintaining Diesel's compile-time query checking.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewNewspaper, NewspaperChangeset, NewspaperRecord};
use super::pool::{DbError, DbPool};
use crate::clock::CivilClock;
use crate::models::{Newspaper, NewspaperSeed, NewspaperUpdate};
use crate::schema::newspapers;

/// Diesel-based newspaper repository with compile-time query checking.
#[derive(Debug, Clone)]
pub struct NewspaperRepository {
    pool: DbPool,
    clock: CivilClock,
}

impl NewspaperRepository {
    /// Create a new repository with an existing pool.
    ///
    /// `clock` stamps `created_at`/`updated_at` in civil time.
    pub fn new(pool: DbPool, clock: CivilClock) -> Self {
        Self { pool, clock }
    }

    /// Get a newspaper by slug.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Newspaper>, DbError> {
        let mut conn = self.pool.get().await?;

        newspapers::table
            .filter(newspapers::slug.eq(slug))
            .first::<NewspaperRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Newspaper::from))
    }

    /// Get a newspaper by ID.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Newspaper>, DbError> {
        let mut conn = self.pool.get().await?;

        newspapers::table
            .find(id)
            .first::<NewspaperRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Newspaper::from))
    }

    /// Get all newspapers ordered by slug.
    pub async fn get_all(&self) -> Result<Vec<Newspaper>, DbError> {
        let mut conn = self.pool.get().await?;

        newspapers::table
            .order(newspapers::slug.asc())
            .load::<NewspaperRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Newspaper::from).collect())
    }

    /// Check if a newspaper exists.
    pub async fn exists(&self, slug: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = newspapers::table
            .filter(newspapers::slug.eq(slug))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count > 0)
    }

    /// Insert a newspaper. Fails on a duplicate slug.
    pub async fn create(&self, seed: &NewspaperSeed) -> Result<Newspaper, DbError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.timestamp();

        diesel::insert_into(newspapers::table)
            .values(NewNewspaper::from_seed(seed, &now))
            .execute(&mut conn)
            .await?;

        newspapers::table
            .filter(newspapers::slug.eq(&seed.slug))
            .first::<NewspaperRecord>(&mut conn)
            .await
            .map(Newspaper::from)
    }

    /// Apply a partial update outside of any lock.
    ///
    /// Only the columns set in `update` (plus `updated_at`) are written, so
    /// concurrent writers of other columns are not clobbered.
    pub async fn update_fields(
        &self,
        slug: &str,
        update: &NewspaperUpdate,
    ) -> Result<Option<Newspaper>, DbError> {
        let mut conn = self.pool.get().await?;
        let changes = NewspaperChangeset::from_update(update, self.clock.timestamp());

        let rows = diesel::update(newspapers::table.filter(newspapers::slug.eq(slug)))
            .set(&changes)
            .execute(&mut conn)
            .await?;
        if rows == 0 {
            return Ok(None);
        }

        newspapers::table
            .filter(newspapers::slug.eq(slug))
            .first::<NewspaperRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Newspaper::from))
    }

    /// Lock, re-read, mutate and commit one newspaper.
    ///
    /// Runs inside `BEGIN IMMEDIATE`, which takes the database write lock up
    /// front: a second caller (in this or another process) blocks until the
    /// first commits and then reads the committed row. `decide` sees the
    /// freshly read row and returns the update to apply (if any) plus a value
    /// handed back to the caller. Any error rolls the whole transaction back.
    ///
    /// Returns `None` if no newspaper has this slug.
    pub async fn run_atomic<T, E, F>(
        &self,
        slug: &str,
        decide: F,
    ) -> Result<Option<(Newspaper, T)>, E>
    where
        F: FnOnce(&Newspaper) -> Result<(Option<NewspaperUpdate>, T), E> + Send + 'static,
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let mut conn = self.pool.get().await?;
        let slug = slug.to_string();
        let clock = self.clock;

        let outcome = conn
            .spawn_blocking(move |c| {
                Ok(c.immediate_transaction(|c| locked::apply(c, &slug, clock, decide)))
            })
            .await?;

        outcome.map_err(|e| match e {
            AtomicError::Storage(e) => e.into(),
            AtomicError::Decide(e) => e,
        })
    }
}

/// Failure inside the locked section; either one rolls the transaction back.
enum AtomicError<E> {
    Storage(DbError),
    Decide(E),
}

impl<E> From<DbError> for AtomicError<E> {
    fn from(e: DbError) -> Self {
        AtomicError::Storage(e)
    }
}

/// Blocking half of `run_atomic`, run on the connection's worker thread.
mod locked {
    use diesel::prelude::*;
    use diesel::sqlite::SqliteConnection;

    use super::AtomicError;
    use crate::clock::CivilClock;
    use crate::models::{Newspaper, NewspaperUpdate};
    use crate::repository::models::{NewspaperChangeset, NewspaperRecord};
    use crate::schema::newspapers;

    pub(super) fn apply<T, E, F>(
        conn: &mut SqliteConnection,
        slug: &str,
        clock: CivilClock,
        decide: F,
    ) -> Result<Option<(Newspaper, T)>, AtomicError<E>>
    where
        F: FnOnce(&Newspaper) -> Result<(Option<NewspaperUpdate>, T), E>,
    {
        let Some(record) = newspapers::table
            .filter(newspapers::slug.eq(slug))
            .first::<NewspaperRecord>(conn)
            .optional()?
        else {
            return Ok(None);
        };

        let current = Newspaper::from(record);
        let (update, value) = decide(&current).map_err(AtomicError::Decide)?;
        let Some(update) = update else {
            return Ok(Some((current, value)));
        };

        let changes = NewspaperChangeset::from_update(&update, clock.timestamp());
        diesel::update(newspapers::table.find(current.id))
            .set(&changes)
            .execute(conn)?;

        let fresh = newspapers::table
            .find(current.id)
            .first::<NewspaperRecord>(conn)?;

        Ok(Some((Newspaper::from(fresh), value)))
    }
}
