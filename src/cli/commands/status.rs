//! Status command.

use console::style;

use crate::clock::DATE_FORMAT;
use crate::config::Settings;
use crate::services::HealthService;

/// Print the health report.
pub async fn cmd_status(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    let report = HealthService::new(ctx.newspapers(), ctx.clock())
        .status()
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", style("Newspaper Status").bold());
    println!("{}", "-".repeat(60));
    println!("  {:<14} {}", "Checked at:", report.timestamp);
    println!("  {:<14} {}", "Newspapers:", report.newspaper_count);

    for row in &report.newspapers {
        let last = row
            .last_increment_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "never".to_string());
        let id = row
            .local_latest_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<14} {:<9} id {:<8} last advanced {}",
            row.slug, row.kind, id, last
        );
    }

    if report.sequence_pending.is_empty() {
        println!("{} All sequence newspapers are current", style("✓").green());
    } else {
        println!(
            "{} Pending advancement: {}",
            style("!").yellow(),
            report.sequence_pending.join(", ")
        );
    }

    Ok(())
}
