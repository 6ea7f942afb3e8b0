//! Liveness probe command.

use console::style;

use crate::config::Settings;
use crate::services::{HttpLivenessChecker, LivenessCheck};

/// HEAD a URL the way the advancement job does. Fails if unreachable.
pub async fn cmd_probe(settings: &Settings, url: &str) -> anyhow::Result<()> {
    let checker = HttpLivenessChecker::with_timeout(settings.liveness_timeout)?;

    if checker.is_reachable(url).await {
        println!("{} {} is reachable", style("✓").green(), url);
        Ok(())
    } else {
        println!("{} {} is not reachable", style("✗").red(), url);
        anyhow::bail!("{} is not reachable", url)
    }
}
