//! Streamed asset downloads into the local cache

use crate::client::GithubClient;
use crate::error::{ApiError, ApiResult};
use crate::release::ResolvedAsset;
use apkgit_core::cache::AssetCache;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Where a requested asset ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Local path of the asset file
    pub path: PathBuf,
    /// True when the cache already held the file and no request was made
    pub from_cache: bool,
    /// Bytes written (0 on a cache hit)
    pub bytes: u64,
}

impl GithubClient {
    /// Fetch an asset into the cache, skipping when already present
    ///
    /// The body is streamed straight to disk; a partial file is deleted on
    /// any failure so the cache never holds a truncated APK.
    pub async fn download_asset(
        &self,
        asset: &ResolvedAsset,
        cache: &AssetCache,
    ) -> ApiResult<DownloadOutcome> {
        let path = cache.path_for(&asset.name);
        if path.is_file() {
            debug!(asset = %asset.name, "cache hit, skipping download");
            return Ok(DownloadOutcome {
                path,
                from_cache: true,
                bytes: 0,
            });
        }

        match self.stream_to_file(&asset.download_url, &path).await {
            Ok(bytes) => {
                debug!(asset = %asset.name, bytes, "download complete");
                Ok(DownloadOutcome {
                    path,
                    from_cache: false,
                    bytes,
                })
            }
            Err(e) => {
                if path.exists() {
                    if let Err(rm) = std::fs::remove_file(&path) {
                        warn!(path = %path.display(), error = %rm, "failed to remove partial download");
                    }
                }
                Err(e)
            }
        }
    }

    async fn stream_to_file(&self, url: &str, path: &std::path::Path) -> ApiResult<u64> {
        let response = self
            .download
            .get(url)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::api_response(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Download failed"),
            ));
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ApiError::from_transport)?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cached_asset_skips_network() {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::open(dir.path()).unwrap();
        std::fs::write(cache.path_for("App-v1.0.apk"), b"cached bytes").unwrap();

        let client = GithubClient::new(None).unwrap();
        let asset = ResolvedAsset {
            name: "App-v1.0.apk".to_string(),
            // unroutable on purpose; a cache hit must not touch it
            download_url: "http://192.0.2.1/App-v1.0.apk".to_string(),
            version: "1.0".to_string(),
        };

        let outcome = client.download_asset(&asset, &cache).await.unwrap();
        assert!(outcome.from_cache);
        assert_eq!(outcome.bytes, 0);
        assert_eq!(std::fs::read(outcome.path).unwrap(), b"cached bytes");
    }
}
