//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::services::seed_newspapers;

/// Create the data directory and schema, then seed newspapers.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    if settings.database_url.is_none() {
        settings.ensure_directories()?;
    }

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    let repo = ctx.newspapers();
    let added = seed_newspapers(&repo, &settings.seeds).await?;
    for seed in &settings.seeds {
        println!("  {} {} ({})", style("✓").green(), seed.slug, seed.kind);
    }

    println!(
        "{} Initialized newsredirect in {} ({} newspapers added)",
        style("✓").green(),
        settings.data_dir.display(),
        added
    );

    Ok(())
}
