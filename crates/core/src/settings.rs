//! User settings
//!
//! Small TOML file next to the config document, with environment variables
//! taking precedence. Everything is optional; a missing file is a valid
//! (default) settings set.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Settings filename inside the config directory
const SETTINGS_FILE: &str = "settings.toml";

/// Persisted user preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// GitHub token for authenticated API calls (raises rate limits,
    /// enables private repos)
    pub github_token: Option<String>,
    /// adb serial to target when several devices are attached
    pub adb_serial: Option<String>,
    /// Override for the downloaded-asset cache directory
    pub cache_dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `<config_dir>/settings.toml`, then apply
    /// environment overrides
    ///
    /// Reads the following environment variables:
    /// - `APKGIT_GITHUB_TOKEN` or `GITHUB_TOKEN`: API token
    /// - `APKGIT_ADB_SERIAL` or `ANDROID_SERIAL`: device serial
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(SETTINGS_FILE);
        let mut settings = if path.is_file() {
            toml::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            Self::default()
        };

        if let Some(token) = env_first(&["APKGIT_GITHUB_TOKEN", "GITHUB_TOKEN"]) {
            settings.github_token = Some(token);
        }
        if let Some(serial) = env_first(&["APKGIT_ADB_SERIAL", "ANDROID_SERIAL"]) {
            settings.adb_serial = Some(serial);
        }

        Ok(settings)
    }

    /// Cache directory, honoring the override
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|v| !v.is_empty())
}

/// Default config directory (`~/.config/apkgit` on Linux)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("apkgit")
}

/// Default asset cache directory (`~/.cache/apkgit` on Linux)
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("apkgit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert!(settings.adb_serial.is_none());
        assert!(settings.cache_dir.is_none());
    }

    #[test]
    fn test_load_from_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "adb_serial = \"emulator-5554\"\ncache_dir = \"/tmp/apkgit-cache\"\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.adb_serial.as_deref(), Some("emulator-5554"));
        assert_eq!(settings.cache_dir(), PathBuf::from("/tmp/apkgit-cache"));
    }

    #[test]
    fn test_corrupt_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "not = [toml").unwrap();
        assert!(Settings::load(dir.path()).is_err());
    }
}
