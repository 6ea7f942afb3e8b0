//! Newspaper model.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::clock::civil_days_between;

/// Rule that turns a civil date into a redirect target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewspaperKind {
    /// Daily edition addressed by `{Y}/{m}/{d}`.
    Date,
    /// Numbered issues that advance once per civil day.
    Sequence,
    /// Monthly edition addressed by `{month_year}`.
    Monthly,
    /// Anything the database holds that we do not understand.
    #[serde(untagged)]
    Unknown(String),
}

impl NewspaperKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Date => "date",
            Self::Sequence => "sequence",
            Self::Monthly => "monthly",
            Self::Unknown(other) => other,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "date" => Self::Date,
            "sequence" => Self::Sequence,
            "monthly" => Self::Monthly,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for NewspaperKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A newspaper and the state that drives its redirect target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Newspaper {
    pub id: i32,
    pub slug: String,
    pub kind: NewspaperKind,
    pub base_url: Option<String>,
    pub pattern: Option<String>,
    /// Current issue id; only meaningful for sequence newspapers.
    pub local_latest_id: Option<i64>,
    /// Last id the publisher was seen serving. Informational only.
    pub provider_latest_id: Option<i64>,
    pub seed_date: Option<NaiveDate>,
    /// Civil hour (0-23) at which today's issue becomes visible.
    pub cutover_hour: u8,
    /// Civil date of the last advancement.
    pub last_increment_date: Option<NaiveDate>,
    pub last_redirect_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Newspaper {
    pub fn is_sequence(&self) -> bool {
        self.kind == NewspaperKind::Sequence
    }

    /// Civil days since the last advancement, if any happened.
    pub fn days_since_increment(&self, today: NaiveDate) -> Option<i64> {
        self.last_increment_date
            .map(|last| civil_days_between(last, today).abs())
    }

    /// Summary row used by the health report and the CLI listing.
    pub fn status_row(&self, today: NaiveDate) -> NewspaperStatusRow {
        NewspaperStatusRow {
            slug: self.slug.clone(),
            kind: self.kind.clone(),
            local_latest_id: self.local_latest_id,
            provider_latest_id: self.provider_latest_id,
            last_increment_date: self.last_increment_date,
            days_since_increment: self.days_since_increment(today),
            last_redirect_url: self.last_redirect_url.clone(),
        }
    }
}

#[cfg(test)]
impl Newspaper {
    /// In-memory newspaper for unit tests that never touch the database.
    pub(crate) fn fixture(slug: &str, kind: NewspaperKind) -> Self {
        let created = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Self {
            id: 1,
            slug: slug.to_string(),
            kind,
            base_url: None,
            pattern: None,
            local_latest_id: None,
            provider_latest_id: None,
            seed_date: None,
            cutover_hour: DEFAULT_CUTOVER_HOUR,
            last_increment_date: None,
            last_redirect_url: None,
            created_at: created,
            updated_at: created,
        }
    }
}

/// Fields for creating a newspaper.
///
/// Also the shape of `[[newspapers]]` entries in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewspaperSeed {
    pub slug: String,
    pub kind: NewspaperKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_latest_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_latest_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_date: Option<NaiveDate>,
    #[serde(default = "default_cutover_hour")]
    pub cutover_hour: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_increment_date: Option<NaiveDate>,
}

/// Cutover hour used when none is configured.
pub const DEFAULT_CUTOVER_HOUR: u8 = 8;

fn default_cutover_hour() -> u8 {
    DEFAULT_CUTOVER_HOUR
}

impl NewspaperSeed {
    /// A sequence newspaper served from `base_url/{id}/index.html`.
    pub fn sequence(slug: &str, base_url: &str, local_latest_id: i64) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            local_latest_id: Some(local_latest_id),
            ..Self::bare(slug, NewspaperKind::Sequence)
        }
    }

    /// A date or monthly newspaper driven by `pattern`.
    pub fn patterned(slug: &str, kind: NewspaperKind, pattern: &str) -> Self {
        Self {
            pattern: Some(pattern.to_string()),
            ..Self::bare(slug, kind)
        }
    }

    fn bare(slug: &str, kind: NewspaperKind) -> Self {
        Self {
            slug: slug.to_string(),
            kind,
            base_url: None,
            pattern: None,
            local_latest_id: None,
            provider_latest_id: None,
            seed_date: None,
            cutover_hour: DEFAULT_CUTOVER_HOUR,
            last_increment_date: None,
        }
    }

    pub fn with_cutover_hour(mut self, hour: u8) -> Self {
        self.cutover_hour = hour;
        self
    }

    pub fn with_last_increment_date(mut self, day: NaiveDate) -> Self {
        self.last_increment_date = Some(day);
        self
    }
}

/// Partial update applied to one newspaper row.
///
/// `None` leaves the column untouched; `updated_at` is always bumped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewspaperUpdate {
    pub local_latest_id: Option<i64>,
    pub last_increment_date: Option<NaiveDate>,
    pub last_redirect_url: Option<String>,
}

impl NewspaperUpdate {
    pub fn latest_id(id: i64) -> Self {
        Self {
            local_latest_id: Some(id),
            ..Default::default()
        }
    }

    pub fn redirect_url(url: &str) -> Self {
        Self {
            last_redirect_url: Some(url.to_string()),
            ..Default::default()
        }
    }
}

/// Health/status view of a newspaper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewspaperStatusRow {
    pub slug: String,
    pub kind: NewspaperKind,
    pub local_latest_id: Option<i64>,
    pub provider_latest_id: Option<i64>,
    pub last_increment_date: Option<NaiveDate>,
    pub days_since_increment: Option<i64>,
    pub last_redirect_url: Option<String>,
}
