//! Application configuration management.
//!
//! Configuration is stored at `~/.config/raidcache/config.json`. The cache
//! directory defaults to `~/.cache/raidcache/<club>` and can be overridden
//! with the `RAIDCACHE_CACHE_DIR` environment variable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "raidcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "RAIDCACHE_CACHE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Club whose races are cached; scopes the cache directory
    #[serde(default)]
    pub club_slug: Option<String>,
    #[serde(default)]
    pub last_race_id: Option<i64>,
    /// Refuse leisure races whose age thresholds are missing or misordered
    #[serde(default)]
    pub strict_leisure_thresholds: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Read a config file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let base = dirs::cache_dir().context("Could not find cache directory")?;
        Ok(match self.club_slug.as_deref() {
            Some(club) => base.join(APP_NAME).join(club),
            None => base.join(APP_NAME),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.club_slug.is_none());
        assert!(!config.strict_leisure_thresholds);
    }

    #[test]
    fn test_config_round_trip_fields() {
        let config: Config = serde_json::from_str(
            r#"{"club_slug": "co-grenoble", "last_race_id": 12, "strict_leisure_thresholds": true}"#,
        )
        .unwrap();
        assert_eq!(config.club_slug.as_deref(), Some("co-grenoble"));
        assert_eq!(config.last_race_id, Some(12));
        assert!(config.strict_leisure_thresholds);
    }

    fn temp_config_path(tag: &str) -> PathBuf {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        std::env::temp_dir()
            .join(format!("raidcache-config-{}-{}-{}", tag, std::process::id(), nanos))
            .join(CONFIG_FILE)
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = Config::load_from(&temp_config_path("missing")).unwrap();
        assert!(config.last_race_id.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_config_path("save");
        let config = Config {
            last_race_id: Some(4),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().last_race_id, Some(4));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_malformed_config_names_its_path() {
        let path = temp_config_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
        assert!(err.to_string().contains(&path.display().to_string()));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
