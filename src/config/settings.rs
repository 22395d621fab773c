use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::crypto::handle::{DEFAULT_HANDLE_LEN, MAX_HANDLE_LEN, MIN_HANDLE_LEN};
use crate::engine::DEFAULT_MAX_INSERT_ATTEMPTS;
use crate::errors::{OnceSecretError, Result};

/// Environment variable overriding `database_path`.
pub const ENV_DATABASE: &str = "ONCESECRET_DATABASE";

/// Environment variable overriding `bind_addr`.
pub const ENV_BIND: &str = "ONCESECRET_BIND";

/// Environment variable overriding `base_url`.
pub const ENV_BASE_URL: &str = "ONCESECRET_BASE_URL";

/// Service configuration, loaded from `.oncesecret.toml`.
///
/// Every field has a sensible default so OnceSecret works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// SQLite database holding pending secrets.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Public base URL used to build retrieval links
    /// (e.g. `https://secrets.example.com`).  When unset the server
    /// derives it from the request's `Host` header.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Number of alphanumeric characters in a handle (default: 16).
    #[serde(default = "default_handle_length")]
    pub handle_length: usize,

    /// How many fresh handles to try when one collides (default: 5).
    #[serde(default = "default_max_insert_attempts")]
    pub max_insert_attempts: u32,

    /// How long a store transaction waits on a locked database.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_database_path() -> PathBuf {
    PathBuf::from("oncesecret.db")
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_handle_length() -> usize {
    DEFAULT_HANDLE_LEN
}

fn default_max_insert_attempts() -> u32 {
    DEFAULT_MAX_INSERT_ATTEMPTS
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bind_addr: default_bind_addr(),
            base_url: None,
            handle_length: default_handle_length(),
            max_insert_attempts: default_max_insert_attempts(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    const FILE_NAME: &'static str = ".oncesecret.toml";

    /// Load settings from `<config_dir>/.oncesecret.toml`, then apply
    /// environment overrides and validate the result.
    ///
    /// A missing file means defaults; an unparsable one is an error.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let mut settings = Self::load_file(config_dir)?;
        settings.apply_overrides(|name| std::env::var(name).ok());
        settings.validate()?;
        Ok(settings)
    }

    fn load_file(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        toml::from_str(&contents).map_err(|e| {
            OnceSecretError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Apply overrides looked up through `lookup` (normally the process
    /// environment).  Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(db) = lookup(ENV_DATABASE) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind_addr = bind;
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = Some(url);
        }
    }

    /// Reject settings that would weaken handles or break the engine.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_HANDLE_LEN..=MAX_HANDLE_LEN).contains(&self.handle_length) {
            return Err(OnceSecretError::Config(format!(
                "handle_length must be between {MIN_HANDLE_LEN} and {MAX_HANDLE_LEN} (got {})",
                self.handle_length
            )));
        }
        if self.max_insert_attempts < 1 {
            return Err(OnceSecretError::Config(
                "max_insert_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Busy timeout as a `Duration`.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Build the public retrieval URL for `handle` under `base`.
    ///
    /// Example: `https://secrets.example.com/get/Ab3...`
    pub fn retrieval_url(base: &str, handle: &str) -> String {
        format!("{}/get/{handle}", base.trim_end_matches('/'))
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.database_path, PathBuf::from("oncesecret.db"));
        assert_eq!(s.bind_addr, "0.0.0.0:5000");
        assert!(s.base_url.is_none());
        assert_eq!(s.handle_length, 16);
        assert_eq!(s.max_insert_attempts, 5);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn load_file_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load_file(tmp.path()).unwrap();
        assert_eq!(settings.handle_length, 16);
    }

    #[test]
    fn load_file_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
database_path = "/var/lib/oncesecret/secrets.db"
bind_addr = "127.0.0.1:8080"
base_url = "https://secrets.example.com"
handle_length = 24
max_insert_attempts = 3
busy_timeout_ms = 250
"#;
        fs::write(tmp.path().join(".oncesecret.toml"), config).unwrap();

        let settings = Settings::load_file(tmp.path()).unwrap();
        assert_eq!(
            settings.database_path,
            PathBuf::from("/var/lib/oncesecret/secrets.db")
        );
        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
        assert_eq!(
            settings.base_url.as_deref(),
            Some("https://secrets.example.com")
        );
        assert_eq!(settings.handle_length, 24);
        assert_eq!(settings.max_insert_attempts, 3);
        assert_eq!(settings.busy_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn load_file_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".oncesecret.toml"), "handle_length = 20\n").unwrap();

        let settings = Settings::load_file(tmp.path()).unwrap();
        assert_eq!(settings.handle_length, 20);
        assert_eq!(settings.bind_addr, "0.0.0.0:5000");
        assert_eq!(settings.max_insert_attempts, 5);
    }

    #[test]
    fn load_file_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".oncesecret.toml"), "not valid {{toml").unwrap();

        assert!(matches!(
            Settings::load_file(tmp.path()),
            Err(OnceSecretError::Config(_))
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_DATABASE, "/tmp/other.db"),
            (ENV_BIND, "127.0.0.1:9000"),
            (ENV_BASE_URL, "http://localhost:9000"),
        ]
        .into_iter()
        .collect();

        let mut s = Settings::default();
        s.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(s.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(s.bind_addr, "127.0.0.1:9000");
        assert_eq!(s.base_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn empty_overrides_are_ignored() {
        let mut s = Settings::default();
        s.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(s.database_path, PathBuf::from("oncesecret.db"));
        assert!(s.base_url.is_none());
    }

    #[test]
    fn validate_rejects_short_handles() {
        let s = Settings {
            handle_length: 8,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_handles() {
        let s = Settings {
            handle_length: MAX_HANDLE_LEN + 1,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let s = Settings {
            max_insert_attempts: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn retrieval_url_joins_base_and_handle() {
        assert_eq!(
            Settings::retrieval_url("https://example.com/", "abc123"),
            "https://example.com/get/abc123"
        );
        assert_eq!(
            Settings::retrieval_url("http://localhost:5000", "abc123"),
            "http://localhost:5000/get/abc123"
        );
    }
}
