//! Redirect target computation.
//!
//! `target_url` is pure; `RedirectBuilder` adds the bookkeeping write of
//! `last_redirect_url`.

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;

use super::error::NewspaperError;
use crate::models::{Newspaper, NewspaperKind, NewspaperUpdate};
use crate::repository::NewspaperRepository;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Compute the redirect target for `newspaper` at civil time `now`.
///
/// For sequence newspapers `sequence_override` replaces the persisted id;
/// the job uses it to build the candidate URL for a freshly advanced id and
/// the redirect endpoint passes the cutover-adjusted id.
pub fn target_url(
    newspaper: &Newspaper,
    now: &DateTime<Tz>,
    sequence_override: Option<i64>,
) -> Result<String, NewspaperError> {
    match &newspaper.kind {
        NewspaperKind::Date => {
            let pattern = required_pattern(newspaper)?;
            Ok(date_url(pattern, now))
        }
        NewspaperKind::Monthly => {
            let pattern = required_pattern(newspaper)?;
            Ok(monthly_url(pattern, now))
        }
        NewspaperKind::Sequence => {
            let id = sequence_override
                .or(newspaper.local_latest_id)
                .ok_or_else(|| NewspaperError::MissingSequenceId(newspaper.slug.clone()))?;
            sequence_url(newspaper, id)
        }
        NewspaperKind::Unknown(kind) => Err(NewspaperError::UnsupportedKind {
            slug: newspaper.slug.clone(),
            kind: kind.clone(),
        }),
    }
}

fn required_pattern(newspaper: &Newspaper) -> Result<&str, NewspaperError> {
    newspaper
        .pattern
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| NewspaperError::MissingPattern(newspaper.slug.clone()))
}

fn date_url(pattern: &str, now: &DateTime<Tz>) -> String {
    pattern
        .replace("{Y}", &format!("{:04}", now.year()))
        .replace("{m}", &format!("{:02}", now.month()))
        .replace("{d}", &format!("{:02}", now.day()))
}

fn monthly_url(pattern: &str, now: &DateTime<Tz>) -> String {
    let month = MONTH_NAMES[now.month0() as usize];
    pattern.replace("{month_year}", &format!("{}-{:04}", month, now.year()))
}

fn sequence_url(newspaper: &Newspaper, id: i64) -> Result<String, NewspaperError> {
    if let Some(pattern) = newspaper.pattern.as_deref() {
        if pattern.contains("{id}") {
            return Ok(pattern.replace("{id}", &id.to_string()));
        }
    }

    let base = newspaper
        .base_url
        .as_deref()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| NewspaperError::MissingBaseUrl(newspaper.slug.clone()))?;

    Ok(format!("{}/{}/index.html", base.trim_end_matches('/'), id))
}

/// Builds targets and remembers the last one on the newspaper row.
#[derive(Debug, Clone)]
pub struct RedirectBuilder {
    repo: NewspaperRepository,
}

impl RedirectBuilder {
    pub fn new(repo: NewspaperRepository) -> Self {
        Self { repo }
    }

    /// Compute the target and record it as `last_redirect_url`.
    ///
    /// A failure to record the URL is logged and otherwise ignored.
    pub async fn build_for(
        &self,
        newspaper: &Newspaper,
        now: &DateTime<Tz>,
        sequence_override: Option<i64>,
    ) -> Result<String, NewspaperError> {
        let url = target_url(newspaper, now, sequence_override)?;
        self.remember(&newspaper.slug, &url).await;
        Ok(url)
    }

    /// Record `url` as the newspaper's last redirect target (last writer wins).
    pub async fn remember(&self, slug: &str, url: &str) {
        match self
            .repo
            .update_fields(slug, &NewspaperUpdate::redirect_url(url))
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!("Cannot record redirect URL, {} no longer exists", slug),
            Err(e) => tracing::warn!("Failed to record redirect URL for {}: {}", slug, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{CivilClock, DEFAULT_TIMEZONE};
    use crate::models::NewspaperSeed;
    use crate::repository::DbContext;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn on(year: i32, month: u32, day: u32) -> DateTime<Tz> {
        DEFAULT_TIMEZONE
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .unwrap()
    }

    fn with_pattern(kind: NewspaperKind, pattern: &str) -> Newspaper {
        Newspaper {
            pattern: Some(pattern.to_string()),
            ..Newspaper::fixture("paper", kind)
        }
    }

    #[test]
    fn test_date_pattern() {
        let paper = with_pattern(NewspaperKind::Date, "https://x/{Y}/{m}/{d}/index.html");
        let url = target_url(&paper, &on(2025, 1, 15), None).unwrap();
        assert_eq!(url, "https://x/2025/01/15/index.html");
    }

    #[test]
    fn test_monthly_pattern() {
        let paper = with_pattern(NewspaperKind::Monthly, "https://x/{month_year}/view");
        let url = target_url(&paper, &on(2025, 11, 1), None).unwrap();
        assert_eq!(url, "https://x/november-2025/view");
    }

    #[test]
    fn test_missing_or_empty_pattern() {
        let missing = Newspaper::fixture("okaz", NewspaperKind::Date);
        assert!(matches!(
            target_url(&missing, &on(2025, 1, 1), None),
            Err(NewspaperError::MissingPattern(slug)) if slug == "okaz"
        ));

        let empty = with_pattern(NewspaperKind::Monthly, "");
        assert!(matches!(
            target_url(&empty, &on(2025, 1, 1), None),
            Err(NewspaperError::MissingPattern(_))
        ));
    }

    #[test]
    fn test_sequence_base_url() {
        let paper = Newspaper {
            base_url: Some("https://example.com/pdf/".to_string()),
            local_latest_id: Some(11),
            ..Newspaper::fixture("arabnews", NewspaperKind::Sequence)
        };
        let url = target_url(&paper, &on(2025, 1, 1), None).unwrap();
        assert_eq!(url, "https://example.com/pdf/11/index.html");

        let url = target_url(&paper, &on(2025, 1, 1), Some(12)).unwrap();
        assert_eq!(url, "https://example.com/pdf/12/index.html");
    }

    #[test]
    fn test_sequence_id_pattern_wins_over_base_url() {
        let paper = Newspaper {
            base_url: Some("https://ignored.example".to_string()),
            ..with_pattern(NewspaperKind::Sequence, "https://x/issue{id}/")
        };
        let url = target_url(&paper, &on(2025, 1, 1), Some(200)).unwrap();
        assert_eq!(url, "https://x/issue200/");
    }

    #[test]
    fn test_sequence_errors() {
        let no_id = Newspaper {
            base_url: Some("https://example.com/pdf".to_string()),
            ..Newspaper::fixture("aawsat", NewspaperKind::Sequence)
        };
        assert!(matches!(
            target_url(&no_id, &on(2025, 1, 1), None),
            Err(NewspaperError::MissingSequenceId(_))
        ));

        // A pattern without {id} falls back to base_url, which is missing
        let no_base = Newspaper {
            local_latest_id: Some(3),
            ..with_pattern(NewspaperKind::Sequence, "https://x/latest")
        };
        assert!(matches!(
            target_url(&no_base, &on(2025, 1, 1), None),
            Err(NewspaperError::MissingBaseUrl(_))
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let paper = Newspaper::fixture("weekly", NewspaperKind::Unknown("weekly".into()));
        assert!(matches!(
            target_url(&paper, &on(2025, 1, 1), None),
            Err(NewspaperError::UnsupportedKind { kind, .. }) if kind == "weekly"
        ));
    }

    #[tokio::test]
    async fn test_build_for_records_last_url() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"), CivilClock::default());
        ctx.init_schema().await.unwrap();
        let repo = ctx.newspapers();
        let paper = repo
            .create(&NewspaperSeed::sequence("arabnews", "https://example.com/pdf", 41))
            .await
            .unwrap();

        let builder = RedirectBuilder::new(repo.clone());
        let url = builder.build_for(&paper, &on(2025, 1, 1), None).await.unwrap();
        assert_eq!(url, "https://example.com/pdf/41/index.html");

        let stored = repo.find_by_slug("arabnews").await.unwrap().unwrap();
        assert_eq!(stored.last_redirect_url.as_deref(), Some(url.as_str()));
        assert_eq!(stored.local_latest_id, Some(41));
    }
}
