//! Configuration management.
//!
//! Settings start from defaults, then the TOML config file is applied, then
//! command-line flags and their environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::{parse_timezone, CivilClock, DEFAULT_TIMEZONE};
use crate::models::NewspaperSeed;
use crate::repository::pool::DEFAULT_BUSY_TIMEOUT;
use crate::repository::DbContext;
use crate::services::liveness::DEFAULT_LIVENESS_TIMEOUT;
use crate::services::{default_seeds, TraceLog};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "newsredirect.db";

/// Default trace filename inside the data directory.
pub const DEFAULT_TRACE_FILENAME: &str = "sequence.log";

/// Config file name looked up in the working and config directories.
pub const CONFIG_FILENAME: &str = "newsredirect.toml";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Operating timezone for every civil date decision.
    pub timezone: Tz,
    /// Trace file; `None` logs decisions through tracing only.
    pub trace_log: Option<PathBuf>,
    /// Timeout for a single liveness check.
    pub liveness_timeout: Duration,
    /// How long a connection waits on another writer.
    pub busy_timeout: Duration,
    /// Bearer token required by the admin routes, if any.
    pub admin_token: Option<String>,
    /// Newspapers created by `init`.
    pub seeds: Vec<NewspaperSeed>,
}

impl Default for Settings {
    fn default() -> Self {
        // Platform data dir, falling back to home, then the current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsredirect");

        Self::with_data_dir(data_dir)
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            trace_log: Some(data_dir.join(DEFAULT_TRACE_FILENAME)),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            timezone: DEFAULT_TIMEZONE,
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            admin_token: None,
            seeds: default_seeds(),
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => format!("sqlite:{}", self.database_path().display()),
        }
    }

    /// Get the full path to the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory {}: {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }

    /// Wall clock in the configured timezone.
    pub fn clock(&self) -> CivilClock {
        CivilClock::new(self.timezone)
    }

    /// Create a database context using the configured database URL or path.
    pub fn create_db_context(&self) -> DbContext {
        self.create_db_context_with_clock(self.clock())
    }

    /// Same as `create_db_context`, stamping rows with `clock`.
    pub fn create_db_context_with_clock(&self, clock: CivilClock) -> DbContext {
        DbContext::from_url(&self.database_url(), clock).with_busy_timeout(self.busy_timeout)
    }

    /// Trace sink for sequence decisions.
    pub fn trace_log(&self, clock: CivilClock) -> TraceLog {
        match &self.trace_log {
            Some(path) => TraceLog::new(path, clock),
            None => TraceLog::disabled(clock),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// IANA timezone name, e.g. `Asia/Riyadh`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Trace file path; an empty string disables the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_log: Option<String>,
    /// Liveness check timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_timeout_secs: Option<u64>,
    /// SQLite busy timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub busy_timeout_ms: Option<u64>,
    /// Bearer token for the admin routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
    /// Newspapers to seed; the built-in list is used when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub newspapers: Vec<NewspaperSeed>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific TOML file.
    pub async fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(
        &self,
        settings: &mut Settings,
        base_dir: &Path,
    ) -> anyhow::Result<()> {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.trace_log = Some(settings.data_dir.join(DEFAULT_TRACE_FILENAME));
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref name) = self.timezone {
            settings.timezone = parse_timezone(name)
                .with_context(|| format!("Unknown timezone '{}' in config", name))?;
        }
        if let Some(ref trace_log) = self.trace_log {
            settings.trace_log = if trace_log.is_empty() {
                None
            } else {
                Some(self.resolve_path(trace_log, base_dir))
            };
        }
        if let Some(secs) = self.liveness_timeout_secs {
            settings.liveness_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.busy_timeout_ms {
            settings.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(ref token) = self.admin_token {
            settings.admin_token = Some(token.clone()).filter(|t| !t.is_empty());
        }
        if !self.newspapers.is_empty() {
            settings.seeds = self.newspapers.clone();
        }
        Ok(())
    }
}

/// Options for loading settings.
///
/// The override fields come from CLI flags, which also read their
/// environment variables.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory or database file (--data flag).
    pub data: Option<PathBuf>,
    /// DATABASE_URL
    pub database_url: Option<String>,
    /// NEWSREDIRECT_TIMEZONE
    pub timezone: Option<String>,
    /// NEWSREDIRECT_TRACE_LOG
    pub trace_log: Option<PathBuf>,
    /// NEWSREDIRECT_ADMIN_TOKEN
    pub admin_token: Option<String>,
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn is_db_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "db" || ext == "sqlite" || ext == "sqlite3")
        || path.is_file()
}

/// Find the config file to load, in priority order:
/// explicit path, next to the data dir, working dir, platform config dir.
fn discover_config(options: &LoadOptions, data_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(ref path) = options.config_path {
        return Some(path.clone());
    }

    let candidates = [
        data_dir.map(|d| d.join(CONFIG_FILENAME)),
        Some(current_dir().join(CONFIG_FILENAME)),
        dirs::config_dir().map(|d| d.join("newsredirect").join(CONFIG_FILENAME)),
    ];
    candidates.into_iter().flatten().find(|p| p.exists())
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> anyhow::Result<(Settings, Config)> {
    // --data may name a directory or the database file itself
    let data = options.data.as_ref().map(|d| {
        let d = if d.is_absolute() {
            d.clone()
        } else {
            current_dir().join(d)
        };
        if is_db_file(&d) {
            let dir = d.parent().unwrap_or(Path::new(".")).to_path_buf();
            let file = d.file_name().and_then(|n| n.to_str()).map(str::to_string);
            (dir, file)
        } else {
            (d, None)
        }
    });

    let config = match discover_config(&options, data.as_ref().map(|(dir, _)| dir.as_path())) {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            Config::load_from_path(&path).await?
        }
        None => Config::default(),
    };

    let mut settings = Settings::default();
    let base_dir = config.base_dir().unwrap_or_else(current_dir);
    config.apply_to_settings(&mut settings, &base_dir)?;

    // --data takes precedence over the config file
    if let Some((dir, file)) = data {
        let trace_in_data_dir =
            settings.trace_log == Some(settings.data_dir.join(DEFAULT_TRACE_FILENAME));
        settings.data_dir = dir;
        if trace_in_data_dir {
            settings.trace_log = Some(settings.data_dir.join(DEFAULT_TRACE_FILENAME));
        }
        if let Some(file) = file {
            settings.database_filename = file;
        }
    }

    if let Some(url) = options.database_url.filter(|s| !s.is_empty()) {
        tracing::debug!("Using DATABASE_URL from environment: {}", url);
        settings.database_url = Some(url);
    }
    if let Some(name) = options.timezone.filter(|s| !s.is_empty()) {
        settings.timezone =
            parse_timezone(&name).with_context(|| format!("Unknown timezone '{}'", name))?;
    }
    if let Some(path) = options.trace_log {
        settings.trace_log = Some(path).filter(|p| !p.as_os_str().is_empty());
    }
    if let Some(token) = options.admin_token.filter(|s| !s.is_empty()) {
        settings.admin_token = Some(token);
    }

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewspaperKind;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_file_applies_over_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
            data_dir = "data"
            timezone = "Europe/London"
            trace_log = ""
            liveness_timeout_secs = 3
            admin_token = "s3cret"

            [[newspapers]]
            slug = "arabnews"
            kind = "sequence"
            base_url = "https://example.com/pdf"
            local_latest_id = 5
            cutover_hour = 6
            "#,
        )
        .unwrap();

        let options = LoadOptions {
            config_path: Some(path),
            ..Default::default()
        };
        let (settings, config) = load_settings_with_options(options).await.unwrap();

        assert_eq!(settings.data_dir, dir.path().join("data"));
        assert_eq!(settings.timezone, chrono_tz::Europe::London);
        assert_eq!(settings.trace_log, None);
        assert_eq!(settings.liveness_timeout, Duration::from_secs(3));
        assert_eq!(settings.admin_token.as_deref(), Some("s3cret"));
        assert_eq!(settings.seeds.len(), 1);
        assert_eq!(settings.seeds[0].kind, NewspaperKind::Sequence);
        assert_eq!(settings.seeds[0].cutover_hour, 6);
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));
    }

    #[tokio::test]
    async fn test_overrides_win_over_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "timezone = \"Europe/London\"\n").unwrap();

        let options = LoadOptions {
            config_path: Some(path),
            data: Some(dir.path().join("papers.db")),
            timezone: Some("UTC".to_string()),
            database_url: Some(String::new()),
            ..Default::default()
        };
        let (settings, _) = load_settings_with_options(options).await.unwrap();

        assert_eq!(settings.timezone, chrono_tz::UTC);
        assert_eq!(settings.database_filename, "papers.db");
        assert_eq!(settings.database_path(), dir.path().join("papers.db"));
        assert_eq!(
            settings.trace_log,
            Some(dir.path().join(DEFAULT_TRACE_FILENAME))
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.seeds, default_seeds());
    }

    #[tokio::test]
    async fn test_invalid_timezone_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "timezone = \"Mars/Olympus\"\n").unwrap();

        let options = LoadOptions {
            config_path: Some(path),
            ..Default::default()
        };
        assert!(load_settings_with_options(options).await.is_err());
    }

    #[test]
    fn test_database_url_defaults_to_data_dir() {
        let settings = Settings::with_data_dir(PathBuf::from("/srv/news"));
        assert_eq!(settings.database_url(), "sqlite:/srv/news/newsredirect.db");
        assert_eq!(settings.clock().timezone(), DEFAULT_TIMEZONE);
    }
}
