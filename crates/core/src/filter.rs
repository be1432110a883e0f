//! Asset filename filters
//!
//! A filter is literal text with `*` wildcards (e.g. `App-v*.apk`). It is used
//! twice: to select the release asset among everything attached to a release,
//! and to pull a version string out of the matched filename via the first
//! wildcard capture.

use crate::error::{Error, Result};
use regex::Regex;

/// Compiled form of a user-supplied asset filter
#[derive(Debug, Clone)]
pub struct AssetFilter {
    raw: String,
    matcher: Regex,
    extractor: Option<Regex>,
}

impl AssetFilter {
    /// Compile a filter pattern
    ///
    /// Literal dots are escaped, each `*` matches any substring. The whole
    /// filename must match; `App-v*.apk` does not match `App-v1.0.apk.bak`.
    pub fn parse(filter: &str) -> Result<Self> {
        let escaped = filter.replace('.', "\\.");

        let matcher = Regex::new(&format!("^{}$", escaped.replace('*', ".*")))
            .map_err(|e| Error::invalid_filter(filter, e))?;

        // Wildcards become capture groups for version extraction; a filter
        // without wildcards has nothing to extract.
        let extractor = if filter.contains('*') {
            Some(
                Regex::new(&format!("^{}$", escaped.replace('*', "(.+)")))
                    .map_err(|e| Error::invalid_filter(filter, e))?,
            )
        } else {
            None
        };

        Ok(Self {
            raw: filter.to_string(),
            matcher,
            extractor,
        })
    }

    /// The original filter text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the filter contains a `*` wildcard
    pub fn has_wildcard(&self) -> bool {
        self.extractor.is_some()
    }

    /// Test a filename against the filter
    pub fn matches(&self, filename: &str) -> bool {
        self.matcher.is_match(filename)
    }

    /// Extract the substring captured by the first `*` in a matching filename
    ///
    /// `App-v*.apk` against `App-v1.2.3.apk` yields `1.2.3`. Returns `None`
    /// when the filter has no wildcard or the filename does not match.
    pub fn extract_version(&self, filename: &str) -> Option<String> {
        self.extractor
            .as_ref()?
            .captures(filename)?
            .get(1)
            .map(|m| m.as_str().to_string())
    }
}

/// Strip build metadata from an installed version string
///
/// Package registries report version names like `1.2.3-debug`; everything
/// after the first `-` is build-tag noise for update comparison.
pub fn clean_version(version: &str) -> &str {
    version.split('-').next().unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_literal_filter_matches_exactly() {
        let filter = AssetFilter::parse("app.apk").unwrap();
        assert!(filter.matches("app.apk"));
        assert!(!filter.matches("app-apk"));
        assert!(!filter.matches("appxapk"));
        assert!(!filter.matches("app.apk.bak"));
    }

    #[test]
    fn test_wildcard_filter_matches() {
        let filter = AssetFilter::parse("App-v*.apk").unwrap();
        assert!(filter.matches("App-v1.0.apk"));
        assert!(filter.matches("App-v1.2.3-beta.apk"));
        assert!(!filter.matches("App-v1.0.apk.bak"));
        assert!(!filter.matches("Other-v1.0.apk"));
    }

    #[test]
    fn test_extract_version() {
        let filter = AssetFilter::parse("ApkGit-v*.apk").unwrap();
        assert_eq!(
            filter.extract_version("ApkGit-v1.1.2.apk"),
            Some("1.1.2".to_string())
        );
    }

    #[test]
    fn test_extract_version_no_wildcard() {
        let filter = AssetFilter::parse("ApkGit.apk").unwrap();
        assert!(!filter.has_wildcard());
        assert_eq!(filter.extract_version("ApkGit.apk"), None);
    }

    #[test]
    fn test_extract_version_no_match() {
        let filter = AssetFilter::parse("App-v*.apk").unwrap();
        assert_eq!(filter.extract_version("Other-v1.0.apk"), None);
    }

    #[test]
    fn test_clean_version() {
        assert_eq!(clean_version("2.0.0-beta"), "2.0.0");
        assert_eq!(clean_version("2.0.0"), "2.0.0");
        assert_eq!(clean_version("1.2.3-debug-arm64"), "1.2.3");
    }

    proptest! {
        // Filters made of word characters, dots, dashes and one wildcard must
        // accept anything substituted for the star and nothing with trailing
        // garbage.
        #[test]
        fn prop_wildcard_roundtrip(
            prefix in "[A-Za-z][A-Za-z0-9.-]{0,8}",
            version in "[0-9]{1,3}(\\.[0-9]{1,3}){0,2}",
            suffix in "\\.[a-z]{2,4}",
        ) {
            let filter = AssetFilter::parse(&format!("{prefix}*{suffix}")).unwrap();
            let name = format!("{prefix}{version}{suffix}");
            prop_assert!(filter.matches(&name));
            prop_assert_eq!(filter.extract_version(&name), Some(version));
            let with_garbage = format!("{name}x");
            prop_assert!(!filter.matches(&with_garbage));
        }
    }
}
