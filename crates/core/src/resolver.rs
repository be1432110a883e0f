//! Release resolution seam
//!
//! Bulk update checks need one answer per tracked app: the latest version
//! string derived from the newest matching release. The HTTP client crate
//! implements this; store tests implement it with canned results.

use crate::config::TrackedApp;
use crate::error::Result;

/// Maps a tracked app to the version of its newest matching release asset
pub trait ReleaseResolver {
    /// Resolve the latest version for one app
    ///
    /// Implementations derive the version from the first wildcard capture of
    /// the matched asset filename, falling back to the release tag.
    fn latest_version(&self, app: &TrackedApp) -> impl Future<Output = Result<String>>;
}
