//! Daily advancement job.
//!
//! One best-effort pass over every sequence newspaper: advance for today,
//! verify the new issue with a liveness check and roll back if it is not
//! served yet. Newspapers are independent; a failure on one is recorded and
//! the pass moves on.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use super::error::NewspaperError;
use super::liveness::LivenessCheck;
use super::redirect::{target_url, RedirectBuilder};
use super::sequence::{AdvanceDecision, SequenceAdvancer};
use super::trace::TraceEvent;
use crate::clock::CivilClock;
use crate::models::Newspaper;
use crate::repository::NewspaperRepository;

/// What happened to one newspaper during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NewspaperOutcome {
    /// Already processed today; nothing to verify.
    Unchanged,
    /// Day marker set for the first time.
    Initialized,
    /// Advanced and the new issue answered.
    Verified { id: i64, url: String },
    /// Advanced, the new issue did not answer, and the id was restored.
    RolledBack {
        attempted_id: i64,
        restored_id: i64,
        url: String,
    },
    /// Processing stopped with an error.
    Failed { error: String },
}

/// Outcome for one newspaper.
#[derive(Debug, Clone, Serialize)]
pub struct NewspaperReport {
    pub slug: String,
    #[serde(flatten)]
    pub outcome: NewspaperOutcome,
}

/// Result of a full pass.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub date: NaiveDate,
    pub newspapers: Vec<NewspaperReport>,
}

impl JobReport {
    fn count(&self, pred: impl Fn(&NewspaperOutcome) -> bool) -> usize {
        self.newspapers.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn verified(&self) -> usize {
        self.count(|o| matches!(o, NewspaperOutcome::Verified { .. }))
    }

    pub fn rolled_back(&self) -> usize {
        self.count(|o| matches!(o, NewspaperOutcome::RolledBack { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, NewspaperOutcome::Failed { .. }))
    }

    pub fn initialized(&self) -> usize {
        self.count(|o| matches!(o, NewspaperOutcome::Initialized))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, NewspaperOutcome::Unchanged))
    }

    pub fn outcome_for(&self, slug: &str) -> Option<&NewspaperOutcome> {
        self.newspapers
            .iter()
            .find(|r| r.slug == slug)
            .map(|r| &r.outcome)
    }
}

/// Orchestrates advancer, builder and liveness check.
#[derive(Clone)]
pub struct AdvancementJob {
    repo: NewspaperRepository,
    advancer: SequenceAdvancer,
    builder: RedirectBuilder,
    checker: Arc<dyn LivenessCheck>,
    clock: CivilClock,
}

impl AdvancementJob {
    pub fn new(
        repo: NewspaperRepository,
        advancer: SequenceAdvancer,
        checker: Arc<dyn LivenessCheck>,
        clock: CivilClock,
    ) -> Self {
        let builder = RedirectBuilder::new(repo.clone());
        Self {
            repo,
            advancer,
            builder,
            checker,
            clock,
        }
    }

    /// Run one pass for the clock's current civil day.
    ///
    /// Only failing to list the newspapers aborts the pass.
    pub async fn run(&self) -> Result<JobReport, NewspaperError> {
        let now = self.clock.now();
        let today = now.date_naive();
        let newspapers = self.repo.get_all().await?;

        let mut report = JobReport {
            date: today,
            newspapers: Vec::new(),
        };

        for newspaper in newspapers.iter().filter(|p| p.is_sequence()) {
            let outcome = match self.process(newspaper, &now).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if e.is_configuration() {
                        tracing::warn!("Skipping misconfigured {}: {}", newspaper.slug, e);
                    } else {
                        tracing::error!("Advancement failed for {}: {}", newspaper.slug, e);
                    }
                    NewspaperOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.newspapers.push(NewspaperReport {
                slug: newspaper.slug.clone(),
                outcome,
            });
        }

        tracing::info!(
            "Advancement for {}: {} verified, {} rolled back, {} initialized, {} failed",
            today,
            report.verified(),
            report.rolled_back(),
            report.initialized(),
            report.failed()
        );

        Ok(report)
    }

    async fn process(
        &self,
        newspaper: &Newspaper,
        now: &DateTime<Tz>,
    ) -> Result<NewspaperOutcome, NewspaperError> {
        let advancement = self
            .advancer
            .advance_for_day(&newspaper.slug, now.date_naive())
            .await?;

        // The id read under the lock is the one to restore, not the listing's
        let (delta, new_id) = match advancement.decision {
            AdvanceDecision::Advanced { delta, new_id } => (delta, new_id),
            AdvanceDecision::Initialized => return Ok(NewspaperOutcome::Initialized),
            AdvanceDecision::NotSequence | AdvanceDecision::AlreadyCurrent => {
                return Ok(NewspaperOutcome::Unchanged)
            }
        };
        let previous_id = new_id - delta;

        let url = target_url(&advancement.newspaper, now, Some(new_id))?;

        if self.checker.is_reachable(&url).await {
            self.builder.remember(&newspaper.slug, &url).await;
            return Ok(NewspaperOutcome::Verified { id: new_id, url });
        }

        let restored = self
            .advancer
            .rollback_advance(&newspaper.slug, previous_id)
            .await?;
        self.advancer
            .trace()
            .record(
                &restored,
                &TraceEvent::RolledBack {
                    from: new_id,
                    to: previous_id,
                    url: url.clone(),
                },
            )
            .await;

        Ok(NewspaperOutcome::RolledBack {
            attempted_id: new_id,
            restored_id: previous_id,
            url,
        })
    }
}
