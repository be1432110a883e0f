//! Persisted config document schema
//!
//! The on-disk document is pretty-printed JSON with camelCase keys and every
//! field always present, so an exported document re-imports to an identical
//! config:
//!
//! ```json
//! {
//!   "apps": [
//!     {
//!       "name": "ApkGit",
//!       "owner": "apkgit-team",
//!       "repo": "apkgit",
//!       "filter": "ApkGit-v*.apk",
//!       "packageName": "com.apkgit",
//!       "installedVersion": "1.1.2",
//!       "latestVersion": "N/A"
//!     }
//!   ]
//! }
//! ```

use crate::registry::NOT_INSTALLED;
use serde::{Deserialize, Serialize};

/// One repository+filter+package tuple under update surveillance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedApp {
    /// Display name
    pub name: String,
    /// GitHub repository owner
    pub owner: String,
    /// GitHub repository name
    pub repo: String,
    /// Asset filename filter (literal text with `*` wildcards)
    pub filter: String,
    /// Installed package identifier, the uniqueness key
    pub package_name: String,
    /// Version reported by the device package registry (`N/A` when absent)
    pub installed_version: String,
    /// Version derived from the most recent matching release
    pub latest_version: String,
}

impl TrackedApp {
    /// Whether the latest known release differs from what is installed
    pub fn update_available(&self) -> bool {
        self.installed_version != NOT_INSTALLED
            && self.latest_version != NOT_INSTALLED
            && self.installed_version != self.latest_version
    }
}

/// Ordered sequence of tracked apps; order is user-significant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tracked apps in display order
    pub apps: Vec<TrackedApp>,
}

impl AppConfig {
    /// Look up an entry by package identifier
    pub fn find(&self, package_name: &str) -> Option<&TrackedApp> {
        self.apps.iter().find(|a| a.package_name == package_name)
    }

    /// Serialize to the pretty-printed document format
    pub fn to_document(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, accepting unknown keys from newer versions
    pub fn from_document(content: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Seed config for first launch: apkgit tracking its own releases
pub fn default_config() -> AppConfig {
    AppConfig {
        apps: vec![TrackedApp {
            name: "ApkGit".to_string(),
            owner: "apkgit-team".to_string(),
            repo: "apkgit".to_string(),
            filter: "ApkGit-v*.apk".to_string(),
            package_name: "com.apkgit".to_string(),
            installed_version: env!("CARGO_PKG_VERSION").to_string(),
            latest_version: NOT_INSTALLED.to_string(),
        }],
    }
}
