//! Canonical config ownership and serialized writes
//!
//! One [`ConfigStore`] is constructed at process start and handed by
//! reference to everything that needs it. All mutations funnel through a
//! single async mutex so concurrent update checks and version refreshes
//! cannot interleave and lose each other's writes. Readers never lock: they
//! take an immutable `Arc` snapshot off a watch channel.
//!
//! The merge semantics are deliberately best-effort: each bulk operation
//! computes its result from the snapshot that was canonical when it started,
//! and the last writer under the lock wins. Two overlapping refreshes that
//! read the same stale snapshot can still drop one update; that window is
//! accepted, not defended against.

use crate::config::schema::{AppConfig, TrackedApp, default_config};
use crate::error::{Error, Result};
use crate::filter::AssetFilter;
use crate::registry::PackageRegistry;
use crate::resolver::ReleaseResolver;
use futures::StreamExt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{debug, warn};

/// Persisted document filename inside the config directory
const CONFIG_FILE: &str = "config.json";

/// Simultaneous in-flight release lookups during a bulk check
const MAX_CONCURRENT_LOOKUPS: usize = 3;

/// Outcome of a bulk update check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Apps examined
    pub checked: usize,
    /// Lookups that failed and kept their prior values
    pub failed: usize,
    /// Whether the merged result differed from the stored config
    pub changed: bool,
}

/// Owner of the canonical tracked-app config
pub struct ConfigStore {
    path: PathBuf,
    lock: Mutex<()>,
    tx: watch::Sender<Arc<AppConfig>>,
}

impl ConfigStore {
    /// Create a store rooted at a config directory; call [`load`](Self::load) next
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(AppConfig::default()));
        Self {
            path: config_dir.into().join(CONFIG_FILE),
            lock: Mutex::new(()),
            tx,
        }
    }

    /// Path of the persisted document
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Current immutable snapshot, without locking
    pub fn current(&self) -> Arc<AppConfig> {
        self.tx.borrow().clone()
    }

    /// Change notifications; the receiver yields a snapshot per committed save
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppConfig>> {
        self.tx.subscribe()
    }

    /// Read the persisted document, seeding or falling back as needed
    ///
    /// A missing file seeds the default single-entry config and persists it.
    /// Corrupt content falls back to an in-memory default without touching
    /// the file, so a later manual export can still recover it. Never fails.
    pub async fn load(&self) -> Arc<AppConfig> {
        let guard = self.lock.lock().await;

        match fs::read_to_string(&self.path) {
            Ok(content) => match AppConfig::from_document(&content) {
                Ok(config) => {
                    debug!(apps = config.apps.len(), "loaded config");
                    self.tx.send_replace(Arc::new(config));
                }
                Err(e) => {
                    warn!(error = %e, path = %self.path.display(), "config unparseable, using in-memory default");
                    self.tx.send_replace(Arc::new(default_config()));
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = default_config();
                if let Err(e) = self.persist(&config) {
                    warn!(error = %e, "failed to persist seeded config");
                }
                self.tx.send_replace(Arc::new(config));
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "config unreadable, using in-memory default");
                self.tx.send_replace(Arc::new(default_config()));
            }
        }

        drop(guard);
        self.current()
    }

    /// Replace the stored config
    ///
    /// Returns `false` without writing or notifying when `new` is
    /// structurally identical to the current config.
    pub async fn save(&self, new: AppConfig) -> Result<bool> {
        let guard = self.lock.lock().await;
        self.save_locked(&guard, new)
    }

    /// Track a new app
    ///
    /// Rejects a duplicate package identifier and a duplicate
    /// (owner, repo, filter) combination, and validates the filter compiles.
    pub async fn add_app(&self, app: TrackedApp) -> Result<()> {
        AssetFilter::parse(&app.filter)?;

        let guard = self.lock.lock().await;
        let current = self.current();

        if current.find(&app.package_name).is_some() {
            return Err(Error::duplicate_app(&app.package_name));
        }
        if current
            .apps
            .iter()
            .any(|a| a.owner == app.owner && a.repo == app.repo && a.filter == app.filter)
        {
            return Err(Error::config(format!(
                "{}/{} with filter '{}' is already tracked",
                app.owner, app.repo, app.filter
            )));
        }

        let mut apps = current.apps.clone();
        apps.push(app);
        self.save_locked(&guard, AppConfig { apps })?;
        Ok(())
    }

    /// Stop tracking a package; returns whether an entry was removed
    pub async fn delete_app(&self, package_name: &str) -> Result<bool> {
        let guard = self.lock.lock().await;
        let current = self.current();

        let apps: Vec<TrackedApp> = current
            .apps
            .iter()
            .filter(|a| a.package_name != package_name)
            .cloned()
            .collect();

        self.save_locked(&guard, AppConfig { apps })
    }

    /// Apply a caller-supplied ordering of package identifiers
    ///
    /// Identifiers no longer present are silently dropped, and only entries
    /// that still exist in canonical state survive; this defends against a
    /// reorder racing a concurrent deletion.
    pub async fn reorder_apps(&self, order: &[String]) -> Result<bool> {
        let guard = self.lock.lock().await;
        let current = self.current();

        let mut remaining: std::collections::HashMap<&str, &TrackedApp> = current
            .apps
            .iter()
            .map(|a| (a.package_name.as_str(), a))
            .collect();

        let apps: Vec<TrackedApp> = order
            .iter()
            .filter_map(|package| remaining.remove(package.as_str()).cloned())
            .collect();

        self.save_locked(&guard, AppConfig { apps })
    }

    /// Re-derive installed versions from the package registry
    ///
    /// Persists only when at least one value changed; returns that fact.
    pub async fn refresh_installed_versions<P: PackageRegistry>(
        &self,
        registry: &P,
    ) -> Result<bool> {
        let guard = self.lock.lock().await;
        let current = self.current();
        if current.apps.is_empty() {
            return Ok(false);
        }

        let apps: Vec<TrackedApp> = current
            .apps
            .iter()
            .map(|app| {
                let installed = registry.cleaned_version(&app.package_name);
                if app.installed_version == installed {
                    app.clone()
                } else {
                    TrackedApp {
                        installed_version: installed,
                        ..app.clone()
                    }
                }
            })
            .collect();

        self.save_locked(&guard, AppConfig { apps })
    }

    /// Resolve the latest release for every tracked app and merge the result
    ///
    /// Lookups run concurrently, at most [`MAX_CONCURRENT_LOOKUPS`] in
    /// flight. A failed lookup keeps that entry's prior values and never
    /// removes it. The merge is computed from the pre-lock snapshot and
    /// committed in one save once all lookups settle.
    pub async fn check_all_updates<R, P>(&self, resolver: &R, registry: &P) -> Result<UpdateSummary>
    where
        R: ReleaseResolver,
        P: PackageRegistry,
    {
        let snapshot = self.current();

        let lookups = snapshot.apps.iter().map(|app| async move {
            match resolver.latest_version(app).await {
                Ok(latest) => {
                    let updated = TrackedApp {
                        latest_version: latest,
                        installed_version: registry.cleaned_version(&app.package_name),
                        ..app.clone()
                    };
                    (updated, false)
                }
                Err(e) => {
                    warn!(app = %app.name, error = %e, "release lookup failed, keeping previous values");
                    (app.clone(), true)
                }
            }
        });

        let results: Vec<(TrackedApp, bool)> = futures::stream::iter(lookups)
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;

        let checked = results.len();
        let failed = results.iter().filter(|(_, failed)| *failed).count();
        let apps = results.into_iter().map(|(app, _)| app).collect();

        let guard = self.lock.lock().await;
        let changed = self.save_locked(&guard, AppConfig { apps })?;

        Ok(UpdateSummary {
            checked,
            failed,
            changed,
        })
    }

    /// Replace the config with an imported document
    pub async fn import(&self, content: &str) -> Result<usize> {
        if content.trim().is_empty() {
            return Err(Error::config("Imported file is empty"));
        }
        let new = AppConfig::from_document(content)?;
        if new.apps.is_empty() {
            return Err(Error::empty_config());
        }

        let count = new.apps.len();
        let guard = self.lock.lock().await;
        self.save_locked(&guard, new)?;
        Ok(count)
    }

    /// Serialize the current config to the exact document format
    pub fn export(&self) -> Result<String> {
        self.current().to_document()
    }

    /// Commit a new config while holding the write lock
    fn save_locked(&self, _guard: &MutexGuard<'_, ()>, new: AppConfig) -> Result<bool> {
        if *self.current() == new {
            return Ok(false);
        }

        self.persist(&new)?;
        debug!(apps = new.apps.len(), "config saved");
        self.tx.send_replace(Arc::new(new));
        Ok(true)
    }

    fn persist(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, config.to_document()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::MapRegistry;
    use crate::registry::{EmptyRegistry, NOT_INSTALLED};
    use tempfile::TempDir;

    fn app(package: &str, repo: &str) -> TrackedApp {
        TrackedApp {
            name: repo.to_string(),
            owner: "octo".to_string(),
            repo: repo.to_string(),
            filter: format!("{repo}-v*.apk"),
            package_name: package.to_string(),
            installed_version: "1.0.0".to_string(),
            latest_version: NOT_INSTALLED.to_string(),
        }
    }

    fn store(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path())
    }

    #[tokio::test]
    async fn test_load_missing_file_seeds_default() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let config = store.load().await;
        assert_eq!(config.apps.len(), 1);
        assert!(store.path().exists());

        let on_disk = AppConfig::from_document(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk, *config);
    }

    #[tokio::test]
    async fn test_load_corrupt_file_falls_back_without_persisting() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "{not json").unwrap();

        let config = store.load().await;
        assert_eq!(config.apps.len(), 1);
        // the corrupt file is left alone
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{not json");
    }

    #[tokio::test]
    async fn test_save_identical_config_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.load().await;
        let mut rx = store.subscribe();

        let changed = store.save((*store.current()).clone()).await.unwrap();
        assert!(!changed);
        assert!(!rx.has_changed().unwrap());

        let mut other = (*store.current()).clone();
        other.apps[0].latest_version = "2.0.0".to_string();
        assert!(store.save(other).await.unwrap());
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_add_app_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(AppConfig::default()).await.unwrap();

        store.add_app(app("com.a", "alpha")).await.unwrap();

        let err = store.add_app(app("com.a", "other")).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::DuplicateApp);

        // same (owner, repo, filter) under a different package id
        let err = store.add_app(app("com.b", "alpha")).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }

    #[tokio::test]
    async fn test_add_app_rejects_invalid_filter() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut bad = app("com.a", "alpha");
        bad.filter = "App-v(.apk".to_string();
        let err = store.add_app(bad).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidFilter);
    }

    #[tokio::test]
    async fn test_delete_app() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(AppConfig::default()).await.unwrap();
        store.add_app(app("com.a", "alpha")).await.unwrap();

        assert!(store.delete_app("com.a").await.unwrap());
        assert!(!store.delete_app("com.a").await.unwrap());
        assert!(store.current().apps.is_empty());
    }

    #[tokio::test]
    async fn test_reorder_drops_unknown_and_missing_entries() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(AppConfig::default()).await.unwrap();
        store.add_app(app("com.a", "alpha")).await.unwrap();
        store.add_app(app("com.b", "beta")).await.unwrap();
        store.add_app(app("com.c", "gamma")).await.unwrap();

        let order = vec![
            "com.c".to_string(),
            "com.ghost".to_string(),
            "com.a".to_string(),
        ];
        assert!(store.reorder_apps(&order).await.unwrap());

        let current = store.current();
        let packages: Vec<&str> = current
            .apps
            .iter()
            .map(|a| a.package_name.as_str())
            .collect();
        // ghost dropped, subset keeps its relative order, com.b not in the
        // supplied order so it is dropped from the result
        assert_eq!(packages, vec!["com.c", "com.a"]);
    }

    #[tokio::test]
    async fn test_refresh_installed_versions_persists_only_changes() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(AppConfig::default()).await.unwrap();
        store.add_app(app("com.a", "alpha")).await.unwrap();

        let registry = MapRegistry::default().with("com.a", "2.0.0-beta");
        assert!(store.refresh_installed_versions(&registry).await.unwrap());
        assert_eq!(store.current().apps[0].installed_version, "2.0.0");

        // unchanged second run is a no-op
        assert!(!store.refresh_installed_versions(&registry).await.unwrap());

        // unknown package collapses to the sentinel
        assert!(
            store
                .refresh_installed_versions(&EmptyRegistry)
                .await
                .unwrap()
        );
        assert_eq!(store.current().apps[0].installed_version, NOT_INSTALLED);
    }

    struct ScriptedResolver;

    impl ReleaseResolver for ScriptedResolver {
        fn latest_version(&self, app: &TrackedApp) -> impl Future<Output = Result<String>> {
            let result = if app.repo == "broken" {
                Err(Error::network("connection refused"))
            } else {
                Ok("9.9.9".to_string())
            };
            async move { result }
        }
    }

    #[tokio::test]
    async fn test_check_all_updates_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(AppConfig::default()).await.unwrap();
        store.add_app(app("com.a", "alpha")).await.unwrap();
        store.add_app(app("com.b", "broken")).await.unwrap();
        store.add_app(app("com.c", "gamma")).await.unwrap();

        let summary = store
            .check_all_updates(&ScriptedResolver, &EmptyRegistry)
            .await
            .unwrap();
        assert_eq!(summary.checked, 3);
        assert_eq!(summary.failed, 1);
        assert!(summary.changed);

        let config = store.current();
        assert_eq!(config.apps[0].latest_version, "9.9.9");
        // the failing entry keeps its prior values and stays tracked
        assert_eq!(config.apps[1].latest_version, NOT_INSTALLED);
        assert_eq!(config.apps[1].installed_version, "1.0.0");
        assert_eq!(config.apps[2].latest_version, "9.9.9");
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(AppConfig::default()).await.unwrap();
        store.add_app(app("com.a", "alpha")).await.unwrap();
        store.add_app(app("com.b", "beta")).await.unwrap();
        let original = store.current();

        let doc = store.export().unwrap();

        let other_dir = TempDir::new().unwrap();
        let other = ConfigStore::new(other_dir.path());
        other.import(&doc).await.unwrap();
        assert_eq!(*other.current(), *original);
    }

    #[tokio::test]
    async fn test_import_rejects_empty_input() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.import("  ").await.is_err());
        let err = store.import(r#"{"apps": []}"#).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::EmptyConfig);
    }
}
