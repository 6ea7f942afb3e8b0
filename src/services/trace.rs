//! Append-only trace of sequence decisions.
//!
//! One line per event: `<civil timestamp> <slug>#<id> <event>`. Every event
//! is also emitted through `tracing`, so a disabled file sink still leaves a
//! record in the logs.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::clock::CivilClock;
use crate::models::Newspaper;

/// A decision worth keeping a line for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// First run for this newspaper; the day marker was set.
    Initialized,
    /// The issue id moved forward by `delta` days.
    Advanced { delta: i64, new_id: i64 },
    /// The advanced id failed verification and was restored.
    RolledBack { from: i64, to: i64, url: String },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialized => f.write_str("initialized increment marker"),
            Self::Advanced { delta, new_id } => {
                write!(f, "advanced by {} to {}", delta, new_id)
            }
            Self::RolledBack { from, to, url } => {
                write!(f, "rolled back {} to {} (unreachable: {})", from, to, url)
            }
        }
    }
}

/// Trace sink writing to an optional file.
#[derive(Debug, Clone)]
pub struct TraceLog {
    path: Option<PathBuf>,
    clock: CivilClock,
}

impl TraceLog {
    pub fn new(path: impl Into<PathBuf>, clock: CivilClock) -> Self {
        Self {
            path: Some(path.into()),
            clock,
        }
    }

    /// A sink that only logs through `tracing`.
    pub fn disabled(clock: CivilClock) -> Self {
        Self { path: None, clock }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Format the line recorded for `event`.
    pub fn line(&self, newspaper: &Newspaper, event: &TraceEvent) -> String {
        format!(
            "{} {}#{} {}",
            self.clock.timestamp(),
            newspaper.slug,
            newspaper.id,
            event
        )
    }

    /// Record an event. Write failures are logged, never returned.
    pub async fn record(&self, newspaper: &Newspaper, event: &TraceEvent) {
        tracing::info!(slug = %newspaper.slug, "{}", event);

        let Some(path) = &self.path else {
            return;
        };

        let line = self.line(newspaper, event);
        if let Err(e) = append_line(path, &line).await {
            tracing::warn!("Failed to write trace to {}: {}", path.display(), e);
        }
    }
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{}\n", line).as_bytes()).await?;
    file.flush().await
}
