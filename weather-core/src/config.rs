use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::YearRange;

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "METEOSTAT_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://meteostat.p.rapidapi.com";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// timeout_secs = 10
///
/// [search]
/// station_limit = 10
/// radius_km = 100
/// max_stations = 3
///
/// [normals]
/// start = 1991
/// end = 2020
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// RapidAPI key for the Meteostat JSON API.
    pub api_key: Option<String>,

    /// Override for the provider endpoint, mostly useful for testing.
    pub base_url: Option<String>,

    pub timeout_secs: u64,

    pub search: SearchConfig,

    pub normals: NormalsConfig,
}

/// How candidate stations are searched for and how many are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidates requested from the proximity search.
    pub station_limit: usize,
    pub radius_km: u32,
    /// Qualifying stations kept in a result.
    pub max_stations: usize,
}

/// Reference period requested for climate normals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NormalsConfig {
    pub start: i32,
    pub end: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_secs: 10,
            search: SearchConfig::default(),
            normals: NormalsConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            station_limit: 10,
            radius_km: 100,
            max_stations: 3,
        }
    }
}

impl Default for NormalsConfig {
    fn default() -> Self {
        Self {
            start: 1991,
            end: 2020,
        }
    }
}

impl NormalsConfig {
    pub fn period(&self) -> YearRange {
        YearRange::new(self.start, self.end)
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// The `METEOSTAT_API_KEY` environment variable overrides the stored key.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = Self::load_from(&path)?;
        Ok(cfg.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
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
        let dirs = ProjectDirs::from("dev", "weather-mcp", "weather-mcp")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the stored key when `key` is set and non-empty.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, if present.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        if self.search.station_limit == 0 || self.search.max_stations == 0 {
            return Err(anyhow!(
                "search.station_limit and search.max_stations must be at least 1"
            ));
        }
        if self.normals.start > self.normals.end {
            return Err(anyhow!(
                "normals period is reversed: {} > {}",
                self.normals.start,
                self.normals.end
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("weather-mcp-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn default_config_is_unconfigured() {
        let cfg = Config::default();
        assert!(!cfg.is_configured());
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.normals.period(), YearRange::new(1991, 2020));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_override_replaces_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        let cfg = cfg.with_api_key_override(Some("FROM_ENV".into()));
        assert_eq!(cfg.api_key(), Some("FROM_ENV"));

        let cfg = cfg.with_api_key_override(Some("   ".into()));
        assert_eq!(cfg.api_key(), Some("FROM_ENV"));

        let cfg = cfg.with_api_key_override(None);
        assert_eq!(cfg.api_key(), Some("FROM_ENV"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"

            [search]
            max_stations = 1
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.api_key(), Some("KEY"));
        assert_eq!(cfg.search.max_stations, 1);
        assert_eq!(cfg.search.station_limit, 10);
        assert_eq!(cfg.timeout_secs, 10);
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_path("roundtrip");
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.search.radius_km = 50;

        cfg.save_to(&path).expect("save should succeed");
        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded, cfg);

        let _ = fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn missing_file_yields_default() {
        let path = temp_path("missing");
        let cfg = Config::load_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = Config::default();
        cfg.normals = NormalsConfig {
            start: 2020,
            end: 1991,
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("reversed"));

        let mut cfg = Config::default();
        cfg.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
