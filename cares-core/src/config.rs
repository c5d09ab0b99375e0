//! Cares configuration.
//!
//! Read from ~/.config/cares/config.toml and overridden by `CARES_*`
//! environment variables (`CARES_SMTP__PASSWORD` sets `smtp.password`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{CaresError, CaresResult};

static DEFAULT_DATA_FILE: &str = "~/cares/events.json";
static DEFAULT_ADMIN_PASSWORD: &str = "admin123";
static DEFAULT_BIND: &str = "127.0.0.1:4097";
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SMTP_PORT: u16 = 587;

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_notify_timeout_secs() -> u64 {
    DEFAULT_NOTIFY_TIMEOUT_SECS
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaresConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Shared password for adding events. Not a security boundary.
    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    #[serde(default = "default_notify_timeout_secs")]
    pub notify_timeout_secs: u64,

    #[serde(default)]
    pub server: ServerConfig,

    /// Mail relay for signup confirmations. Without it confirmations are only logged.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    #[serde(default)]
    pub from_name: Option<String>,
}

impl Default for CaresConfig {
    fn default() -> Self {
        CaresConfig {
            data_file: default_data_file(),
            admin_password: default_admin_password(),
            notify_timeout_secs: default_notify_timeout_secs(),
            server: ServerConfig::default(),
            smtp: None,
        }
    }
}

impl CaresConfig {
    pub fn config_path() -> CaresResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CaresError::Config("Could not determine config directory".into()))?
            .join("cares");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented default file on first run.
    pub fn load() -> CaresResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load config from a specific file (which may be missing), layered with
    /// `CARES_*` environment variables.
    pub fn load_from(path: &Path) -> CaresResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("CARES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| CaresError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CaresError::Config(e.to_string()))
    }

    /// The events file with `~` expanded.
    pub fn data_file_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_file.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CaresResult<()> {
        let contents = format!(
            "\
# cares configuration

# Where the events live:
# data_file = \"{DEFAULT_DATA_FILE}\"

# Password for adding events:
# admin_password = \"{DEFAULT_ADMIN_PASSWORD}\"

# Seconds to wait for a signup confirmation to be accepted by the relay:
# notify_timeout_secs = {DEFAULT_NOTIFY_TIMEOUT_SECS}

# [server]
# bind = \"{DEFAULT_BIND}\"

# Signup confirmations. Prefer CARES_SMTP__PASSWORD over writing it here.
# [smtp]
# host = \"smtp.gmail.com\"
# port = {DEFAULT_SMTP_PORT}
# username = \"you@example.com\"
# password = \"app-password\"
# from_email = \"you@example.com\"
# from_name = \"Bengaluru Cares\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CaresError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CaresError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
