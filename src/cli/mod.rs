//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Settings;
use crate::engine::SecretEngine;
use crate::errors::Result;
use crate::store::{SecretStore, SqliteStore};

/// OnceSecret CLI: one-time secret exchange.
#[derive(Parser)]
#[command(
    name = "oncesecret",
    about = "One-time secret exchange: every secret can be read exactly once",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Secret store database (overrides config and ONCESECRET_DATABASE)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Directory containing .oncesecret.toml (default: current directory)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the secret store if it does not exist yet
    Init,

    /// Store a secret and print its one-time handle
    Save {
        /// Secret text (omit for piped stdin or interactive prompt)
        text: Option<String>,
    },

    /// Retrieve a secret once; it is destroyed as it is shown
    Get {
        /// Handle or full retrieval URL
        handle: String,
    },

    /// Run the HTTP server
    Serve {
        /// Address to bind to (overrides config and ONCESECRET_BIND)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_enum, ignore_case = true)]
        shell: Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins; otherwise `--log-level`, otherwise `default_level`.
pub fn init_logging(cli: &Cli, default_level: &str) {
    let level = cli.log_level.as_deref().unwrap_or(default_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Load settings from the config directory and apply CLI overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let mut settings = Settings::load(&config_dir)?;
    if let Some(ref db) = cli.database {
        settings.database_path = db.clone();
    }
    Ok(settings)
}

/// Open the SQLite store named by `settings` and provision its table.
pub fn open_store(settings: &Settings) -> Result<SqliteStore> {
    let store = SqliteStore::open(&settings.database_path, settings.busy_timeout())?;
    store.create_table()?;
    Ok(store)
}

/// Open the store and wrap it in an engine configured from `settings`.
pub fn open_engine(settings: &Settings) -> Result<SecretEngine<SqliteStore>> {
    let store = open_store(settings)?;
    Ok(SecretEngine::with_settings(store, settings))
}

/// Accept either a bare handle or a full retrieval URL.
///
/// `https://host/get/Ab3xYz...` and `Ab3xYz...` both yield `Ab3xYz...`.
pub fn handle_from_arg(arg: &str) -> &str {
    let trimmed = arg.trim().trim_end_matches('/');
    match trimmed.rfind("/get/") {
        Some(pos) => &trimmed[pos + "/get/".len()..],
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_from_bare_handle() {
        assert_eq!(handle_from_arg("Ab3xYz0123456789"), "Ab3xYz0123456789");
        assert_eq!(handle_from_arg("  Ab3xYz0123456789\n"), "Ab3xYz0123456789");
    }

    #[test]
    fn handle_from_full_url() {
        assert_eq!(
            handle_from_arg("https://secrets.example.com/get/Ab3xYz0123456789"),
            "Ab3xYz0123456789"
        );
        assert_eq!(
            handle_from_arg("http://localhost:5000/get/Ab3xYz0123456789/"),
            "Ab3xYz0123456789"
        );
    }

    #[test]
    fn cli_parses_global_database_flag() {
        let cli = Cli::try_parse_from(["oncesecret", "get", "abc", "--database", "/tmp/x.db"])
            .unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Commands::Get { ref handle } if handle == "abc"));
    }
}
