//! Diesel ORM models for database tables.
//!
//! These models provide compile-time type checking for database operations.
//! Dates and timestamps are stored as civil-time text.

use diesel::prelude::*;

use super::util::{format_date, parse_date_opt, parse_timestamp};
use crate::models::{Newspaper, NewspaperKind, NewspaperSeed, NewspaperUpdate};
use crate::schema;

/// Newspaper record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::newspapers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewspaperRecord {
    pub id: i32,
    pub slug: String,
    pub kind: String,
    pub base_url: Option<String>,
    pub pattern: Option<String>,
    pub local_latest_id: Option<i64>,
    pub provider_latest_id: Option<i64>,
    pub seed_date: Option<String>,
    pub cutover_hour: i32,
    pub last_increment_date: Option<String>,
    pub last_redirect_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Convert a database record to a domain model.
impl From<NewspaperRecord> for Newspaper {
    fn from(record: NewspaperRecord) -> Self {
        Newspaper {
            id: record.id,
            kind: NewspaperKind::parse(&record.kind),
            slug: record.slug,
            base_url: record.base_url,
            pattern: record.pattern,
            local_latest_id: record.local_latest_id,
            provider_latest_id: record.provider_latest_id,
            seed_date: parse_date_opt(record.seed_date.as_deref()),
            cutover_hour: record.cutover_hour.clamp(0, 23) as u8,
            last_increment_date: parse_date_opt(record.last_increment_date.as_deref()),
            last_redirect_url: record.last_redirect_url,
            created_at: parse_timestamp(&record.created_at),
            updated_at: parse_timestamp(&record.updated_at),
        }
    }
}

/// New newspaper for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::newspapers)]
pub struct NewNewspaper<'a> {
    pub slug: &'a str,
    pub kind: &'a str,
    pub base_url: Option<&'a str>,
    pub pattern: Option<&'a str>,
    pub local_latest_id: Option<i64>,
    pub provider_latest_id: Option<i64>,
    pub seed_date: Option<String>,
    pub cutover_hour: i32,
    pub last_increment_date: Option<String>,
    pub last_redirect_url: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

impl<'a> NewNewspaper<'a> {
    pub fn from_seed(seed: &'a NewspaperSeed, now: &'a str) -> Self {
        Self {
            slug: &seed.slug,
            kind: seed.kind.as_str(),
            base_url: seed.base_url.as_deref(),
            pattern: seed.pattern.as_deref(),
            local_latest_id: seed.local_latest_id,
            provider_latest_id: seed.provider_latest_id,
            seed_date: seed.seed_date.map(format_date),
            cutover_hour: i32::from(seed.cutover_hour),
            last_increment_date: seed.last_increment_date.map(format_date),
            last_redirect_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Column changes for a newspaper. `None` fields are left untouched.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = schema::newspapers)]
pub struct NewspaperChangeset {
    pub local_latest_id: Option<i64>,
    pub last_increment_date: Option<String>,
    pub last_redirect_url: Option<String>,
    pub updated_at: Option<String>,
}

impl NewspaperChangeset {
    pub fn from_update(update: &NewspaperUpdate, updated_at: String) -> Self {
        Self {
            local_latest_id: update.local_latest_id,
            last_increment_date: update.last_increment_date.map(format_date),
            last_redirect_url: update.last_redirect_url.clone(),
            updated_at: Some(updated_at),
        }
    }
}
