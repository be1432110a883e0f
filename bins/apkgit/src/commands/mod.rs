//! Command implementations

pub mod apps;
pub mod backup;
pub mod fetch;
pub mod update;

use anyhow::Context as _;
use apkgit_core::adb::AdbDevice;
use apkgit_core::cache::AssetCache;
use apkgit_core::config::{ConfigStore, TrackedApp};
use apkgit_core::settings::{Settings, default_config_dir};
use apkgit_github::GithubClient;
use std::path::PathBuf;

/// Shared state handed to every command
pub struct Context {
    pub store: ConfigStore,
    pub settings: Settings,
    pub cache: AssetCache,
}

impl Context {
    /// Build the store, settings and cache; loads the persisted config
    pub async fn init(
        config_dir: Option<PathBuf>,
        token_override: Option<String>,
    ) -> anyhow::Result<Self> {
        let dir = config_dir
            .clone()
            .unwrap_or_else(default_config_dir);

        let mut settings = Settings::load(&dir).context("Failed to load settings")?;
        if token_override.is_some() {
            settings.github_token = token_override;
        }

        // an explicit --config-dir keeps the cache under it too, so tests
        // and portable setups stay self-contained
        let cache_dir = settings
            .cache_dir
            .clone()
            .unwrap_or_else(|| match &config_dir {
                Some(dir) => dir.join("cache"),
                None => apkgit_core::settings::default_cache_dir(),
            });
        let cache = AssetCache::open(cache_dir).context("Failed to open asset cache")?;

        let store = ConfigStore::new(&dir);
        store.load().await;

        Ok(Self {
            store,
            settings,
            cache,
        })
    }

    /// GitHub client using the configured token
    pub fn client(&self) -> anyhow::Result<GithubClient> {
        Ok(GithubClient::new(self.settings.github_token.clone())?)
    }

    /// Connected adb device using the configured serial
    pub fn device(&self) -> apkgit_core::Result<AdbDevice> {
        AdbDevice::connect(self.settings.adb_serial.clone())
    }

    /// Tracked app by package identifier
    pub fn find_app(&self, package: &str) -> anyhow::Result<TrackedApp> {
        self.store
            .current()
            .find(package)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Package '{}' is not tracked", package))
    }
}
