//! Initial newspaper rows.

use super::error::NewspaperError;
use crate::models::{NewspaperKind, NewspaperSeed};
use crate::repository::NewspaperRepository;

/// Newspapers created by `init` when the config file lists none.
pub fn default_seeds() -> Vec<NewspaperSeed> {
    vec![
        NewspaperSeed::sequence(
            "arabnews",
            "https://www.arabnews.com/sites/default/files/pdf",
            1000,
        ),
        NewspaperSeed::sequence("aawsat", "https://aawsat.com/files/pdf/issue", 1000),
        NewspaperSeed::patterned(
            "okaz",
            NewspaperKind::Date,
            "https://www.okaz.com.sa/digitals/{Y}/{m}/{d}/index.html",
        ),
        NewspaperSeed::patterned(
            "ring",
            NewspaperKind::Monthly,
            "https://ringmagazine.com/en/magazines/{month_year}/view",
        ),
    ]
}

/// Insert every seed whose slug is not taken yet. Returns how many were added.
pub async fn seed_newspapers(
    repo: &NewspaperRepository,
    seeds: &[NewspaperSeed],
) -> Result<usize, NewspaperError> {
    let mut inserted = 0;
    for seed in seeds {
        if repo.exists(&seed.slug).await? {
            tracing::debug!("Newspaper {} already exists, skipping", seed.slug);
            continue;
        }
        repo.create(seed).await?;
        tracing::info!("Seeded newspaper {} ({})", seed.slug, seed.kind);
        inserted += 1;
    }
    Ok(inserted)
}
