use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::constants::DEFAULT_TIMEOUT_SECS;
use crate::api::{Endpoint, LogLevel, MonitoringConfig};
use crate::migration::MigrationOptions;
use crate::migration::password::{DEFAULT_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "janus.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub source: EndpointConfig,
    #[serde(default)]
    pub destination: EndpointConfig,
    #[serde(default)]
    pub migration: MigrationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// One side of the migration; every field may still come from flags or env
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationSettings {
    #[serde(default = "default_true")]
    pub continue_on_error: bool,
    #[serde(default = "default_true")]
    pub skip_duplicates: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_password_length")]
    pub password_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log every request and response as a structured event at debug level
    #[serde(default = "default_true")]
    pub request_logging: bool,
    /// Also log request and response bodies (secrets masked)
    #[serde(default)]
    pub log_payloads: bool,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_password_length() -> usize {
    DEFAULT_PASSWORD_LENGTH
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            api_key: None,
            verify_ssl: true,
        }
    }
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            skip_duplicates: true,
            timeout_secs: default_timeout_secs(),
            password_length: default_password_length(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            request_logging: true,
            log_payloads: false,
        }
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

impl EndpointConfig {
    /// Replace file values with any that were given on the command line or in the environment
    pub fn overlay(&mut self, url: Option<String>, username: Option<String>, api_key: Option<String>, insecure: bool) {
        if url.is_some() {
            self.url = url;
        }
        if username.is_some() {
            self.username = username;
        }
        if api_key.is_some() {
            self.api_key = api_key;
        }
        if insecure {
            self.verify_ssl = false;
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Validated connection details; `side` names the section in errors
    pub fn resolve(&self, side: &str) -> Result<Endpoint> {
        let url = required(&self.url, side, "url")?;
        let username = required(&self.username, side, "username")?;
        let api_key = required(&self.api_key, side, "api_key")?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("[{}] url must start with http:// or https://, got '{}'", side, url);
        }

        Ok(Endpoint {
            url,
            username,
            api_key,
            verify_ssl: self.verify_ssl,
        })
    }
}

fn required(value: &Option<String>, side: &str, field: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => anyhow::bail!("[{}] {} is not set (config file, flag or environment)", side, field),
    }
}

impl MigrationSettings {
    pub fn validate(&self) -> Result<()> {
        if self.password_length < MIN_PASSWORD_LENGTH {
            anyhow::bail!(
                "[migration] password_length must be at least {}, got {}",
                MIN_PASSWORD_LENGTH,
                self.password_length
            );
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("[migration] timeout_secs must be greater than 0");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn options(&self) -> MigrationOptions {
        MigrationOptions {
            continue_on_error: self.continue_on_error,
            skip_duplicates: self.skip_duplicates,
            password_length: self.password_length,
        }
    }
}

impl LoggingSettings {
    pub fn monitoring(&self, debug: bool) -> MonitoringConfig {
        MonitoringConfig {
            request_logging: self.request_logging,
            log_payloads: self.log_payloads,
            log_level: if debug { LogLevel::Debug } else { LogLevel::Info },
        }
    }
}

impl Config {
    /// `explicit`, else `./janus.toml`, else `<config_dir>/janus/config.toml`
    pub fn get_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("janus").join("config.toml"))
            .filter(|path| path.exists())
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let Some(config_path) = Self::get_config_path(explicit) else {
            info!("No config file found, using defaults");
            return Ok(Self::default());
        };
        debug!("Loading config from: {:?}", config_path);

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config = Self::from_toml_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.migration.validate()?;
        Ok(config)
    }
}
