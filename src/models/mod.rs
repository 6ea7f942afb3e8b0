//! Data models for newsredirect.

mod newspaper;

pub use newspaper::{
    Newspaper, NewspaperKind, NewspaperSeed, NewspaperStatusRow, NewspaperUpdate,
    DEFAULT_CUTOVER_HOUR,
};
