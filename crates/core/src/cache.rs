//! Local cache for downloaded release assets
//!
//! Keyed by asset filename with a plain existence check: a file that is
//! already present is never re-downloaded. There is no TTL and no eviction;
//! the only maintenance operation is an explicit clear against a file
//! extension.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory-backed asset cache
#[derive(Debug, Clone)]
pub struct AssetCache {
    dir: PathBuf,
}

impl AssetCache {
    /// Open (and create if needed) a cache rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a given asset name maps to
    ///
    /// Only the final path component of the asset name is used, so a
    /// hostile asset name cannot escape the cache directory.
    pub fn path_for(&self, asset_name: &str) -> PathBuf {
        let name = Path::new(asset_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "asset".into());
        self.dir.join(name)
    }

    /// Whether an asset of this name has already been downloaded
    pub fn contains(&self, asset_name: &str) -> bool {
        self.path_for(asset_name).is_file()
    }

    /// Delete cached files whose extension matches (case-insensitive)
    ///
    /// Returns the number of files removed; individual delete failures are
    /// skipped rather than aborting the sweep.
    pub fn clear(&self, extension: &str) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension));
            if matches && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        debug!(extension, removed, "cache cleared");
        Ok(removed)
    }

    /// Entry count and total size of the cache
    pub fn stats(&self) -> Result<CacheStats> {
        let mut entries = 0;
        let mut total_bytes = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().is_file() {
                entries += 1;
                total_bytes += entry.metadata()?.len();
            }
        }
        Ok(CacheStats {
            entries,
            total_bytes,
        })
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Number of cached files
    pub entries: usize,
    /// Total size of cached files in bytes
    pub total_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache() -> (AssetCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::open(dir.path()).unwrap();
        (cache, dir)
    }

    #[test]
    fn test_contains_after_write() {
        let (cache, _dir) = cache();
        assert!(!cache.contains("App-v1.0.apk"));

        fs::write(cache.path_for("App-v1.0.apk"), b"apk bytes").unwrap();
        assert!(cache.contains("App-v1.0.apk"));
    }

    #[test]
    fn test_path_for_strips_directories() {
        let (cache, _dir) = cache();
        let path = cache.path_for("../../etc/evil.apk");
        assert_eq!(path.parent().unwrap(), cache.dir());
        assert_eq!(path.file_name().unwrap(), "evil.apk");
    }

    #[test]
    fn test_clear_by_extension() {
        let (cache, _dir) = cache();
        fs::write(cache.path_for("a.apk"), b"a").unwrap();
        fs::write(cache.path_for("b.APK"), b"b").unwrap();
        fs::write(cache.path_for("icon.png"), b"p").unwrap();

        assert_eq!(cache.clear("apk").unwrap(), 2);
        assert!(!cache.contains("a.apk"));
        assert!(cache.contains("icon.png"));
    }

    #[test]
    fn test_stats() {
        let (cache, _dir) = cache();
        fs::write(cache.path_for("a.apk"), b"1234").unwrap();
        fs::write(cache.path_for("b.apk"), b"12").unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.total_bytes, 6);
    }
}
