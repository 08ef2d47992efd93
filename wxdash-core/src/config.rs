use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{Coordinates, pipeline::FallbackLocation, theme::Theme};

pub const DEFAULT_IP_LOCATE_URL: &str = "http://ip-api.com/json/";
pub const DEFAULT_REVERSE_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_POWER_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";
/// Nominatim requires clients to identify themselves.
pub const DEFAULT_USER_AGENT: &str =
    concat!("wxdash/", env!("CARGO_PKG_VERSION"), " (+https://github.com/wxdash)");

/// Whether the position provider may be queried at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub enabled: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Base URLs of the three external services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub ip_locate: String,
    pub reverse_geocode: String,
    pub power: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ip_locate: DEFAULT_IP_LOCATE_URL.to_string(),
            reverse_geocode: DEFAULT_REVERSE_GEOCODE_URL.to_string(),
            power: DEFAULT_POWER_URL.to_string(),
        }
    }
}

/// Location used when the user's own position cannot be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        let cairo = FallbackLocation::default();
        Self {
            latitude: cairo.coords.latitude,
            longitude: cairo.coords.longitude,
            label: cairo.label,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// theme = "light-mode"
/// [fallback]
/// latitude = 52.52
/// longitude = 13.405
/// label = "Berlin, Germany (Default)"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub locator: LocatorConfig,
    pub endpoints: Endpoints,
    pub fallback: FallbackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            locator: LocatorConfig::default(),
            endpoints: Endpoints::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wxdash", "wxdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Flip the theme and return the new value. The caller persists it.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn fallback_location(&self) -> FallbackLocation {
        FallbackLocation {
            coords: Coordinates::new(self.fallback.latitude, self.fallback.longitude),
            label: self.fallback.label.clone(),
        }
    }

    /// Shared HTTP client for all three services.
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(self.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")
    }
}
