//! Release metadata and asset resolution

use crate::error::{ApiError, ApiResult};
use apkgit_core::filter::AssetFilter;
use serde::Deserialize;

/// Latest-release metadata as returned by the GitHub API
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag, the version fallback when no wildcard capture is possible
    pub tag_name: String,
    /// Files attached to the release
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One file attached to a release
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset filename, what filters match against
    pub name: String,
    /// Public download URL
    pub browser_download_url: String,
}

/// Concrete downloadable asset with its derived version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Asset filename, also the cache key
    pub name: String,
    /// Download URL
    pub download_url: String,
    /// Version from the first wildcard capture, or the release tag
    pub version: String,
}

/// Select the first asset matching the filter and derive its version
pub fn resolve_asset(release: &Release, filter: &AssetFilter) -> ApiResult<ResolvedAsset> {
    let asset = release
        .assets
        .iter()
        .find(|a| filter.matches(&a.name))
        .ok_or_else(|| ApiError::NoMatchingAsset {
            filter: filter.as_str().to_string(),
        })?;

    let version = filter
        .extract_version(&asset.name)
        .unwrap_or_else(|| release.tag_name.clone());

    Ok(ResolvedAsset {
        name: asset.name.clone(),
        download_url: asset.browser_download_url.clone(),
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASE_JSON: &str = r#"{
        "tag_name": "v1.1.2",
        "name": "ApkGit 1.1.2",
        "prerelease": false,
        "assets": [
            {
                "name": "ApkGit-v1.1.2.apk.sha256",
                "browser_download_url": "https://github.com/apkgit-team/apkgit/releases/download/v1.1.2/ApkGit-v1.1.2.apk.sha256"
            },
            {
                "name": "ApkGit-v1.1.2.apk",
                "browser_download_url": "https://github.com/apkgit-team/apkgit/releases/download/v1.1.2/ApkGit-v1.1.2.apk"
            }
        ]
    }"#;

    fn release() -> Release {
        serde_json::from_str(RELEASE_JSON).unwrap()
    }

    #[test]
    fn test_parse_release_tolerates_unknown_keys() {
        let release = release();
        assert_eq!(release.tag_name, "v1.1.2");
        assert_eq!(release.assets.len(), 2);
    }

    #[test]
    fn test_resolve_picks_first_matching_asset() {
        let filter = AssetFilter::parse("ApkGit-v*.apk").unwrap();
        let resolved = resolve_asset(&release(), &filter).unwrap();
        // the .sha256 twin does not fully match, so the APK wins
        assert_eq!(resolved.name, "ApkGit-v1.1.2.apk");
        assert_eq!(resolved.version, "1.1.2");
    }

    #[test]
    fn test_resolve_without_wildcard_falls_back_to_tag() {
        let filter = AssetFilter::parse("ApkGit-v1.1.2.apk").unwrap();
        let resolved = resolve_asset(&release(), &filter).unwrap();
        assert_eq!(resolved.version, "v1.1.2");
    }

    #[test]
    fn test_resolve_no_match_is_an_error() {
        let filter = AssetFilter::parse("Other-*.apk").unwrap();
        let err = resolve_asset(&release(), &filter).unwrap_err();
        assert!(matches!(err, ApiError::NoMatchingAsset { .. }));
    }

    #[test]
    fn test_release_without_assets_parses() {
        let release: Release = serde_json::from_str(r#"{"tag_name": "v2.0"}"#).unwrap();
        assert!(release.assets.is_empty());
    }
}
