//! GitHub API client
//!
//! Thin wrapper over `reqwest` with the headers and timeouts the releases
//! API wants. Two underlying clients: a short-timeout one for metadata and a
//! long-read-timeout one for asset bodies, which can be large.

use crate::error::{ApiError, ApiResult};
use crate::release::{Release, ResolvedAsset, resolve_asset};
use apkgit_core::config::TrackedApp;
use apkgit_core::filter::AssetFilter;
use apkgit_core::resolver::ReleaseResolver;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default API base, overridable for tests
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const METADATA_TIMEOUT: Duration = Duration::from_secs(15);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// GitHub releases client
#[derive(Clone)]
pub struct GithubClient {
    pub(crate) http: Client,
    pub(crate) download: Client,
    token: Option<String>,
    api_base: String,
}

impl GithubClient {
    /// Create a client, optionally authenticated via a bearer token
    pub fn new(token: Option<String>) -> ApiResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("apkgit/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(METADATA_TIMEOUT)
            .default_headers(default_headers.clone())
            .build()
            .map_err(ApiError::Request)?;

        // asset bodies can take minutes on slow links
        let download = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(DOWNLOAD_TIMEOUT)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            http,
            download,
            token: token.filter(|t| !t.is_empty()),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Fetch the latest release for a repository
    #[instrument(skip(self))]
    pub async fn latest_release(&self, owner: &str, repo: &str) -> ApiResult<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            owner,
            repo
        );

        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
            return Err(ApiError::api_response(status.as_u16(), message));
        }

        let release: Release = response.json().await.map_err(ApiError::from_transport)?;
        debug!(owner, repo, tag = %release.tag_name, assets = release.assets.len(), "fetched latest release");
        Ok(release)
    }

    /// Resolve the newest matching asset for (owner, repo, filter)
    pub async fn resolve(
        &self,
        owner: &str,
        repo: &str,
        filter: &AssetFilter,
    ) -> ApiResult<ResolvedAsset> {
        let release = self.latest_release(owner, repo).await?;
        resolve_asset(&release, filter)
    }
}

impl ReleaseResolver for GithubClient {
    fn latest_version(
        &self,
        app: &TrackedApp,
    ) -> impl Future<Output = apkgit_core::Result<String>> {
        async move {
            let filter = AssetFilter::parse(&app.filter)?;
            let resolved = self.resolve(&app.owner, &app.repo, &filter).await?;
            Ok(resolved.version)
        }
    }
}

/// Pull the `message` field out of a GitHub error body, when it parses
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(GithubClient::new(None).is_ok());
        assert!(GithubClient::new(Some("ghp_token".to_string())).is_ok());
    }

    #[test]
    fn test_empty_token_is_dropped() {
        let client = GithubClient::new(Some(String::new())).unwrap();
        assert!(client.token.is_none());
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"message": "Not Found", "status": "404"}"#),
            Some("Not Found".to_string())
        );
        assert_eq!(extract_error_message("<html>nope</html>"), None);
        assert_eq!(extract_error_message(r#"{"error": "other"}"#), None);
    }
}
