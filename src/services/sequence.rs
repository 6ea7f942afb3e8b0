//! Day-boundary advancement of sequence issue ids.
//!
//! A sequence newspaper is in one of three states relative to a civil day:
//! uninitialized (no marker yet), current (marker is today) or stale (marker
//! is `n >= 1` days old). Stale newspapers advance by exactly `n`, one issue
//! per elapsed civil day, with no calendar exceptions.

use chrono::NaiveDate;

use super::error::NewspaperError;
use super::trace::{TraceEvent, TraceLog};
use crate::clock::civil_days_between;
use crate::models::{Newspaper, NewspaperUpdate};
use crate::repository::NewspaperRepository;

/// What `advance_for_day` decided for one newspaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceDecision {
    /// Not a sequence newspaper; left alone.
    NotSequence,
    /// First run: the day marker was set, the id kept.
    Initialized,
    /// Already processed today (or the marker is ahead of today).
    AlreadyCurrent,
    /// The id moved forward by `delta`.
    Advanced { delta: i64, new_id: i64 },
}

/// Result of one `advance_for_day` call.
#[derive(Debug, Clone)]
pub struct Advancement {
    /// The newspaper as committed.
    pub newspaper: Newspaper,
    pub decision: AdvanceDecision,
}

impl Advancement {
    pub fn advanced(&self) -> bool {
        matches!(self.decision, AdvanceDecision::Advanced { .. })
    }
}

/// Decide the update for `newspaper` on `today`.
///
/// Called on the freshly locked row; never on a cached copy.
pub fn decide(
    newspaper: &Newspaper,
    today: NaiveDate,
) -> Result<(Option<NewspaperUpdate>, AdvanceDecision), NewspaperError> {
    if !newspaper.is_sequence() {
        return Ok((None, AdvanceDecision::NotSequence));
    }

    let Some(last) = newspaper.last_increment_date else {
        let update = NewspaperUpdate {
            last_increment_date: Some(today),
            ..Default::default()
        };
        return Ok((Some(update), AdvanceDecision::Initialized));
    };

    let delta = civil_days_between(last, today);
    if delta <= 0 {
        return Ok((None, AdvanceDecision::AlreadyCurrent));
    }

    let current = newspaper
        .local_latest_id
        .ok_or_else(|| NewspaperError::InvalidState {
            slug: newspaper.slug.clone(),
            reason: "stale sequence without a local latest id",
        })?;
    let new_id = current + delta;

    let update = NewspaperUpdate {
        local_latest_id: Some(new_id),
        last_increment_date: Some(today),
        ..Default::default()
    };
    Ok((Some(update), AdvanceDecision::Advanced { delta, new_id }))
}

/// Applies day-boundary advancement under the store's write lock.
#[derive(Debug, Clone)]
pub struct SequenceAdvancer {
    repo: NewspaperRepository,
    trace: TraceLog,
}

impl SequenceAdvancer {
    pub fn new(repo: NewspaperRepository, trace: TraceLog) -> Self {
        Self { repo, trace }
    }

    /// Advance `slug` for civil day `today`, at most once per day.
    ///
    /// Concurrent callers for the same slug serialize on the store; the
    /// second one sees the first one's committed marker and does nothing.
    pub async fn advance_for_day(
        &self,
        slug: &str,
        today: NaiveDate,
    ) -> Result<Advancement, NewspaperError> {
        let (newspaper, decision) = self
            .repo
            .run_atomic(slug, move |current| decide(current, today))
            .await?
            .ok_or_else(|| NewspaperError::NotFound(slug.to_string()))?;

        match decision {
            AdvanceDecision::Initialized => {
                self.trace.record(&newspaper, &TraceEvent::Initialized).await;
            }
            AdvanceDecision::Advanced { delta, new_id } => {
                self.trace
                    .record(&newspaper, &TraceEvent::Advanced { delta, new_id })
                    .await;
            }
            AdvanceDecision::NotSequence | AdvanceDecision::AlreadyCurrent => {
                tracing::debug!("{}: nothing to advance ({:?})", slug, decision);
            }
        }

        Ok(Advancement {
            newspaper,
            decision,
        })
    }

    /// Restore `local_latest_id` after a failed verification.
    ///
    /// The day marker is left as is, so another run on the same day does not
    /// advance again.
    pub async fn rollback_advance(
        &self,
        slug: &str,
        previous_id: i64,
    ) -> Result<Newspaper, NewspaperError> {
        self.repo
            .update_fields(slug, &NewspaperUpdate::latest_id(previous_id))
            .await?
            .ok_or_else(|| NewspaperError::NotFound(slug.to_string()))
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }
}
