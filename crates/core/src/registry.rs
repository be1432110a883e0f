//! Installed-package version lookup
//!
//! The config store never talks to a device directly; it asks a
//! [`PackageRegistry`] so tests can substitute a fixed map and production can
//! plug in [`crate::adb::AdbDevice`].

use crate::filter::clean_version;

/// Sentinel version for packages the registry does not know about
pub const NOT_INSTALLED: &str = "N/A";

/// Source of truth for installed package versions
pub trait PackageRegistry {
    /// Raw version name for a package, `None` when not installed
    fn installed_version(&self, package_name: &str) -> Option<String>;

    /// Installed version with build metadata stripped, or the sentinel
    fn cleaned_version(&self, package_name: &str) -> String {
        self.installed_version(package_name)
            .map(|v| clean_version(&v).to_string())
            .unwrap_or_else(|| NOT_INSTALLED.to_string())
    }
}

/// Registry that knows nothing; every package reads as not installed
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRegistry;

impl PackageRegistry for EmptyRegistry {
    fn installed_version(&self, _package_name: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::PackageRegistry;
    use std::collections::HashMap;

    /// Fixed-map registry for store tests
    #[derive(Debug, Default)]
    pub struct MapRegistry {
        versions: HashMap<String, String>,
    }

    impl MapRegistry {
        pub fn with(mut self, package: &str, version: &str) -> Self {
            self.versions.insert(package.to_string(), version.to_string());
            self
        }
    }

    impl PackageRegistry for MapRegistry {
        fn installed_version(&self, package_name: &str) -> Option<String> {
            self.versions.get(package_name).cloned()
        }
    }
}
