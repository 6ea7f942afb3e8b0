//! Manual correction of sequence issue ids.
//!
//! Neither operation touches the day marker, so the daily job keeps its
//! once-per-day guarantee after an operator intervenes.

use super::error::NewspaperError;
use crate::models::{Newspaper, NewspaperUpdate};
use crate::repository::NewspaperRepository;

#[derive(Debug, Clone)]
pub struct IssueAdmin {
    repo: NewspaperRepository,
}

impl IssueAdmin {
    pub fn new(repo: NewspaperRepository) -> Self {
        Self { repo }
    }

    /// Set `local_latest_id`, clamped at 0.
    pub async fn set_latest_id(&self, slug: &str, value: i64) -> Result<Newspaper, NewspaperError> {
        self.mutate(slug, move |_| value).await
    }

    /// Add `delta` (possibly negative) to `local_latest_id`, clamped at 0.
    pub async fn adjust_latest_id(
        &self,
        slug: &str,
        delta: i64,
    ) -> Result<Newspaper, NewspaperError> {
        self.mutate(slug, move |current| current.unwrap_or(0).saturating_add(delta))
            .await
    }

    async fn mutate<F>(&self, slug: &str, next: F) -> Result<Newspaper, NewspaperError>
    where
        F: FnOnce(Option<i64>) -> i64 + Send + 'static,
    {
        let (newspaper, ()) = self
            .repo
            .run_atomic(slug, move |current| {
                if !current.is_sequence() {
                    return Err(NewspaperError::NotAdjustable(current.slug.clone()));
                }
                let value = next(current.local_latest_id).max(0);
                Ok((Some(NewspaperUpdate::latest_id(value)), ()))
            })
            .await?
            .ok_or_else(|| NewspaperError::NotFound(slug.to_string()))?;

        tracing::info!(
            "Set {} local latest id to {}",
            newspaper.slug,
            newspaper.local_latest_id.unwrap_or_default()
        );
        Ok(newspaper)
    }
}
