use crate::core::currency::Currency;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_CBR_BASE_URL: &str = "https://www.cbr-xml-daily.ru";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Longest accepted refresh period: one year.
pub const MAX_PERIOD_MINUTES: u64 = 365 * 24 * 60;

/// Interprets the value given to `--debug`. Unknown values disable debug output.
pub fn parse_debug(value: &str) -> bool {
    matches!(
        value.trim(),
        "1" | "true" | "True" | "y" | "Y" | "yes" | "Yes"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Serve the HTTP API.
    Server,
    /// Poll rates on a timer and print a summary on change.
    Poll,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CbrProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub cbr: Option<CbrProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            cbr: Some(CbrProviderConfig {
                base_url: DEFAULT_CBR_BASE_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Optional settings file. Everything in it has a default.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            providers: ProvidersConfig::default(),
            server: ServerConfig::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    /// Loads the settings file from the platform config directory, falling
    /// back to defaults when there is none.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Self::load_from_path(&path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "currency-service", "currency-service")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read settings file: {}", path.as_ref().display())
        })?;

        let settings: Self = serde_yaml::from_str(&config_str).with_context(|| {
            format!("Failed to parse settings file: {}", path.as_ref().display())
        })?;
        debug!("Successfully loaded settings");
        Ok(settings)
    }

    pub fn cbr_base_url(&self) -> &str {
        self.providers
            .cbr
            .as_ref()
            .map_or(DEFAULT_CBR_BASE_URL, |p| &p.base_url)
    }
}

/// Values given on the command line. `None` defers to the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub rates_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub initial_amounts: Vec<(Currency, f64)>,
    pub period_minutes: u64,
    pub debug: bool,
    pub mode: AppMode,
    pub host: String,
    pub port: u16,
    pub rates_base_url: String,
    pub fetch_timeout: Duration,
}

impl AppConfig {
    pub fn new(
        initial_amounts: Vec<(Currency, f64)>,
        period_minutes: u64,
        debug: bool,
        mode: AppMode,
        settings: Settings,
        overrides: Overrides,
    ) -> Self {
        let rates_base_url = overrides
            .rates_url
            .unwrap_or_else(|| settings.cbr_base_url().to_string());
        AppConfig {
            initial_amounts,
            period_minutes,
            debug,
            mode,
            host: overrides.host.unwrap_or(settings.server.host),
            port: overrides.port.unwrap_or(settings.server.port),
            rates_base_url,
            fetch_timeout: Duration::from_secs(
                overrides.timeout_secs.unwrap_or(settings.timeout_secs),
            ),
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_minutes.saturating_mul(60))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
