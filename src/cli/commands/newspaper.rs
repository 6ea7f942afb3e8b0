//! Newspaper listing and issue administration commands.

use console::style;

use crate::config::Settings;
use crate::models::Newspaper;
use crate::services::{effective_sequence_id, target_url, IssueAdmin, NewspaperError};

/// List newspapers with the target a redirect would use right now.
pub async fn cmd_list(settings: &Settings) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    let newspapers = ctx.newspapers().get_all().await?;
    let now = ctx.clock().now();

    if newspapers.is_empty() {
        println!("{} No newspapers configured", style("!").yellow());
        println!("  Run 'newsredirect init' to seed the defaults");
        return Ok(());
    }

    println!("{}", style("Newspapers").bold());
    println!("{}", "-".repeat(60));
    for newspaper in &newspapers {
        // Pure computation; listing does not touch last_redirect_url
        let target = if newspaper.is_sequence() {
            effective_sequence_id(newspaper, &now)
                .and_then(|id| target_url(newspaper, &now, Some(id)))
        } else {
            target_url(newspaper, &now, None)
        };

        match target {
            Ok(url) => println!("  {:<14} {:<9} {}", newspaper.slug, newspaper.kind, url),
            Err(e) => println!(
                "  {:<14} {:<9} {}",
                newspaper.slug,
                newspaper.kind,
                style(e).red()
            ),
        }
    }

    Ok(())
}

/// Set a sequence newspaper's issue id.
pub async fn cmd_set(settings: &Settings, slug: &str, value: i64) -> anyhow::Result<()> {
    let admin = IssueAdmin::new(settings.create_db_context().newspapers());
    report(admin.set_latest_id(slug, value).await)
}

/// Move a sequence newspaper's issue id by `delta`.
pub async fn cmd_adjust(settings: &Settings, slug: &str, delta: i64) -> anyhow::Result<()> {
    let admin = IssueAdmin::new(settings.create_db_context().newspapers());
    report(admin.adjust_latest_id(slug, delta).await)
}

fn report(result: Result<Newspaper, NewspaperError>) -> anyhow::Result<()> {
    let newspaper = result?;
    println!(
        "{} {} issue id is now {}",
        style("✓").green(),
        newspaper.slug,
        newspaper.local_latest_id.unwrap_or_default()
    );
    Ok(())
}
