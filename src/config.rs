use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YAML dataset the record store loads and persists to
    pub data_path: String,
    /// Page size when the query does not set `limit`
    pub default_limit: u32,
    pub search_debounce_ms: u64,
    pub notification_ttl_secs: u64,
    /// Directory CSV exports are written to
    pub export_dir: String,
    pub log_path: String,
    /// Event poll timeout; also the pace of debounce and toast expiry checks
    pub tick_rate_ms: u64,
    /// Capture the mouse for clicks and scrolling in the table
    pub mouse: bool,
}

impl Default for Config {
    fn default() -> Self {
        let dir = Self::config_dir().unwrap_or_else(|| PathBuf::from(".fleet-console"));
        Self {
            data_path: dir.join("fleet.yaml").to_string_lossy().to_string(),
            default_limit: 25,
            search_debounce_ms: 250,
            notification_ttl_secs: 4,
            export_dir: dir.join("exports").to_string_lossy().to_string(),
            log_path: dir.join("fleet-console.log").to_string_lossy().to_string(),
            tick_rate_ms: 100,
            mouse: true,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".fleet-console"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load the saved config, falling back to defaults when there is none
    ///
    /// An unreadable file also falls back to defaults; the caller logs it once
    /// logging is up.
    pub fn load() -> (Config, Option<String>) {
        let Some(config_path) = Self::config_path() else {
            return (Config::default(), None);
        };
        if !config_path.exists() {
            return (Config::default(), None);
        }

        let parsed = fs::read_to_string(&config_path)
            .map_err(|e| e.to_string())
            .and_then(|contents| serde_json::from_str(&contents).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => (config, None),
            Err(e) => (
                Config::default(),
                Some(format!("{}: {}", config_path.display(), e)),
            ),
        }
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    /// Tick interval, never below 10ms so idle polling cannot spin
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"default_limit": 50}"#).unwrap();
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.search_debounce(), Duration::from_millis(250));
        assert_eq!(config.notification_ttl(), Duration::from_secs(4));
        assert_eq!(config.tick_rate(), Duration::from_millis(100));
        assert!(config.mouse);
    }

    #[test]
    fn test_tick_rate_has_a_floor() {
        let config = Config {
            tick_rate_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.tick_rate(), Duration::from_millis(10));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = Config {
            data_path: "/tmp/fleet.yaml".to_string(),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
    }
}
