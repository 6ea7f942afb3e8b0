//! Status snapshot for operators and monitoring.

use serde::Serialize;

use super::error::NewspaperError;
use crate::clock::CivilClock;
use crate::models::NewspaperStatusRow;
use crate::repository::NewspaperRepository;

/// A sequence newspaper is pending once its marker is older than this.
pub const PENDING_AFTER_DAYS: i64 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Civil time of the snapshot, RFC 3339.
    pub timestamp: String,
    pub newspaper_count: usize,
    /// Sequence newspapers the daily job has not advanced recently.
    pub sequence_pending: Vec<String>,
    pub newspapers: Vec<NewspaperStatusRow>,
}

#[derive(Debug, Clone)]
pub struct HealthService {
    repo: NewspaperRepository,
    clock: CivilClock,
}

impl HealthService {
    pub fn new(repo: NewspaperRepository, clock: CivilClock) -> Self {
        Self { repo, clock }
    }

    pub async fn status(&self) -> Result<HealthReport, NewspaperError> {
        let now = self.clock.now();
        let today = now.date_naive();
        let newspapers = self.repo.get_all().await?;

        let sequence_pending = newspapers
            .iter()
            .filter(|p| p.is_sequence())
            .filter(|p| {
                p.days_since_increment(today)
                    .is_some_and(|days| days > PENDING_AFTER_DAYS)
            })
            .map(|p| p.slug.clone())
            .collect();

        Ok(HealthReport {
            timestamp: now.to_rfc3339(),
            newspaper_count: newspapers.len(),
            sequence_pending,
            newspapers: newspapers.iter().map(|p| p.status_row(today)).collect(),
        })
    }
}
