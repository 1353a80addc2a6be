use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Roster;
use crate::session::LockPolicy;

const APP_NAME: &str = "attendance-register";
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the database location.
pub const DB_ENV: &str = "ATTENDANCE_DB";

const DEFAULT_ROSTER: &[&str] = &[
    "Aarav Sharma",
    "Meera Patel",
    "Rahul Gupta",
    "Sneha Reddy",
    "Vikram Singh",
    "Anaya Jain",
    "Rohit Mehta",
    "Priya Desai",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Students of the class, in display order.
    pub roster: Roster,
    /// Minutes a marking session stays open for toggles.
    pub window_minutes: u64,
    /// Whether the closed window also blocks submitting.
    pub lock_policy: LockPolicy,
    /// Database file. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            window_minutes: 10,
            lock_policy: LockPolicy::ToggleOnly,
            database_path: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the user's config directory.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load(path: Option<&Path>) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => get_config_path()?,
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save the configuration to `path`, or to the user's config directory.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => get_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Marking window. Absurdly large minute counts saturate rather than wrap.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_minutes.saturating_mul(60))
    }

    /// Database path: explicit override, then `ATTENDANCE_DB`, then config,
    /// then `None` for the platform default.
    pub fn resolve_database_path(&self, cli_override: Option<PathBuf>) -> Option<PathBuf> {
        cli_override
            .or_else(|| std::env::var_os(DB_ENV).map(PathBuf::from))
            .or_else(|| self.database_path.clone())
    }
}

fn default_roster() -> Roster {
    Roster::from_known(DEFAULT_ROSTER)
}

fn get_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::try_load(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(config.window_minutes, 10);
        assert_eq!(config.window(), Duration::from_secs(600));
        assert_eq!(config.roster.len(), 8);
        assert_eq!(config.lock_policy, LockPolicy::ToggleOnly);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "roster": ["A", "B"], "lock_policy": "toggle_and_submit" }"#)
            .unwrap();

        let config = Config::try_load(Some(&path)).unwrap();
        assert_eq!(config.roster.names(), &["A", "B"]);
        assert_eq!(config.lock_policy, LockPolicy::ToggleAndSubmit);
        assert_eq!(config.window_minutes, 10);
    }

    #[test]
    fn duplicate_roster_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "roster": ["A", "A"] }"#).unwrap();

        assert!(Config::try_load(Some(&path)).is_err());
        assert_eq!(Config::load(Some(&path)).roster.len(), 8);
    }

    #[test]
    fn huge_window_saturates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, format!(r#"{{ "window_minutes": {} }}"#, u64::MAX)).unwrap();

        let config = Config::try_load(Some(&path)).unwrap();
        assert_eq!(config.window_minutes, u64::MAX);
        assert_eq!(config.window(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            window_minutes: 5,
            database_path: Some(dir.path().join("a.db")),
            ..Config::default()
        };
        config.save(Some(&path)).unwrap();

        let loaded = Config::try_load(Some(&path)).unwrap();
        assert_eq!(loaded.window_minutes, 5);
        assert_eq!(loaded.database_path, config.database_path);
    }

    #[test]
    fn cli_override_wins() {
        let config = Config {
            database_path: Some(PathBuf::from("/from/config.db")),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_database_path(Some(PathBuf::from("/from/cli.db"))),
            Some(PathBuf::from("/from/cli.db"))
        );
    }
}
