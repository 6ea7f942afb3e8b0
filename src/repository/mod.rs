//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! against a SQLite database.

pub mod context;
pub mod models;
pub mod newspaper;
pub mod pool;
pub mod util;

pub use context::DbContext;
pub use newspaper::NewspaperRepository;
pub use pool::{DbError, DbPool};
