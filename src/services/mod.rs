//! Service layer for newspaper redirect logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Services are used by the CLI and the web server alike.

pub mod admin;
pub mod advancement;
pub mod cutover;
pub mod error;
pub mod health;
pub mod liveness;
pub mod redirect;
pub mod seed;
pub mod sequence;
pub mod trace;

pub use admin::IssueAdmin;
pub use advancement::{AdvancementJob, JobReport, NewspaperOutcome, NewspaperReport};
pub use cutover::effective_sequence_id;
pub use error::NewspaperError;
pub use health::{HealthReport, HealthService};
pub use liveness::{HttpLivenessChecker, LivenessCheck};
pub use redirect::{target_url, RedirectBuilder};
pub use seed::{default_seeds, seed_newspapers};
pub use sequence::{AdvanceDecision, Advancement, SequenceAdvancer};
pub use trace::{TraceEvent, TraceLog};
