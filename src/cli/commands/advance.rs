//! Daily advancement command.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use console::style;

use crate::clock::{CivilClock, DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::config::Settings;
use crate::services::{
    AdvancementJob, HttpLivenessChecker, JobReport, NewspaperOutcome, SequenceAdvancer,
};

/// Run the advancement pass once, or repeatedly in daemon mode.
pub async fn cmd_advance(
    settings: &Settings,
    daemon: bool,
    interval: u64,
    at: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let clock = match at {
        Some(at) => CivilClock::frozen_at(settings.timezone, parse_at(settings.timezone, at)?),
        None => settings.clock(),
    };

    let ctx = settings.create_db_context_with_clock(clock);
    ctx.init_schema().await?;

    let repo = ctx.newspapers();
    let advancer = SequenceAdvancer::new(repo.clone(), settings.trace_log(clock));
    let checker = HttpLivenessChecker::with_timeout(settings.liveness_timeout)?;
    let job = AdvancementJob::new(repo, advancer, Arc::new(checker), clock);

    if daemon {
        println!(
            "{} Running in daemon mode (interval: {}s)",
            style("→").cyan(),
            interval
        );
    }

    loop {
        match job.run().await {
            Ok(report) => print_report(&report, json)?,
            // A daemon keeps going; the next pass retries
            Err(e) if daemon => {
                tracing::error!("Advancement pass failed: {}", e);
                eprintln!("{} Advancement pass failed: {}", style("✗").red(), e);
            }
            Err(e) => return Err(e.into()),
        }

        if !daemon {
            break;
        }

        println!(
            "{} Sleeping for {}s before next pass...",
            style("→").dim(),
            interval
        );
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(interval)) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("{} Stopping", style("→").cyan());
                break;
            }
        }
    }

    Ok(())
}

fn print_report(report: &JobReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} Advancement for {}",
        style("→").cyan(),
        report.date.format(DATE_FORMAT)
    );
    if report.newspapers.is_empty() {
        println!("  {} No sequence newspapers", style("!").yellow());
    }

    for entry in &report.newspapers {
        match &entry.outcome {
            NewspaperOutcome::Unchanged => {
                println!("  {} {} already current", style("·").dim(), entry.slug)
            }
            NewspaperOutcome::Initialized => {
                println!("  {} {} initialized", style("✓").green(), entry.slug)
            }
            NewspaperOutcome::Verified { id, url } => println!(
                "  {} {} advanced to {} ({})",
                style("✓").green(),
                entry.slug,
                id,
                url
            ),
            NewspaperOutcome::RolledBack {
                attempted_id,
                restored_id,
                url,
            } => println!(
                "  {} {} issue {} not served yet, kept {} ({})",
                style("↺").yellow(),
                entry.slug,
                attempted_id,
                restored_id,
                url
            ),
            NewspaperOutcome::Failed { error } => {
                println!("  {} {} failed: {}", style("✗").red(), entry.slug, error)
            }
        }
    }

    Ok(())
}

/// Parse `--at` as RFC 3339 or as a civil time in `tz`.
fn parse_at(tz: Tz, at: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(at) {
        return Ok(instant.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(at, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(at, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| anyhow::anyhow!("Cannot parse --at value '{}'", at))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| anyhow::anyhow!("'{}' does not exist in {}", at, tz))
}
