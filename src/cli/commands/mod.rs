//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod advance;
mod init;
mod newspaper;
mod probe;
mod serve;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "newsredirect")]
#[command(about = "Daily redirects to newspaper e-editions")]
#[command(version)]
pub struct Cli {
    /// Data directory or database file (overrides config file).
    #[arg(long, short = 'd', global = true)]
    data: Option<PathBuf>,

    /// Config file path (overrides discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database URL (sqlite:path)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Operating timezone (IANA name)
    #[arg(long, global = true, env = "NEWSREDIRECT_TIMEZONE")]
    timezone: Option<String>,

    /// Trace file for sequence decisions (empty to disable)
    #[arg(long, global = true, env = "NEWSREDIRECT_TRACE_LOG")]
    trace_log: Option<PathBuf>,

    /// Bearer token required by the admin routes
    #[arg(long, global = true, env = "NEWSREDIRECT_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and seed the configured newspapers
    Init,

    /// Start the redirect server
    Serve {
        /// Address to bind: port, host, or host:port
        #[arg(default_value = "127.0.0.1:3030")]
        bind: String,
    },

    /// Advance sequence newspapers for today and verify the new issues
    Advance {
        /// Keep running, repeating the pass every --interval seconds
        #[arg(long)]
        daemon: bool,
        /// Seconds between passes in daemon mode
        #[arg(long, default_value = "3600")]
        interval: u64,
        /// Process as if it were this civil time ("YYYY-MM-DD[ HH:MM:SS]" or RFC 3339)
        #[arg(long, conflicts_with = "daemon")]
        at: Option<String>,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a URL is currently served
    Probe {
        /// URL to send a HEAD request to
        url: String,
    },

    /// Show the health report
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List newspapers and today's redirect targets
    List,

    /// Set a sequence newspaper's issue id
    Set {
        slug: String,
        value: i64,
    },

    /// Move a sequence newspaper's issue id by a delta
    Adjust {
        slug: String,
        /// Amount to add; negative to go back
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data: cli.data,
        database_url: cli.database_url,
        timezone: cli.timezone,
        trace_log: cli.trace_log,
        admin_token: cli.admin_token,
    };
    let (settings, _config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Advance {
            daemon,
            interval,
            at,
            json,
        } => advance::cmd_advance(&settings, daemon, interval, at.as_deref(), json).await,
        Commands::Probe { url } => probe::cmd_probe(&settings, &url).await,
        Commands::Status { json } => status::cmd_status(&settings, json).await,
        Commands::List => newspaper::cmd_list(&settings).await,
        Commands::Set { slug, value } => newspaper::cmd_set(&settings, &slug, value).await,
        Commands::Adjust { slug, delta } => newspaper::cmd_adjust(&settings, &slug, delta).await,
    }
}
