//! Asset download and sideload

use super::Context;
use apkgit_cli::output::{Status, format_size};
use apkgit_cli::progress::{finish_error, finish_success, spinner};
use apkgit_core::filter::AssetFilter;
use apkgit_github::{DownloadOutcome, ResolvedAsset};

/// Download the latest matching asset into the cache
pub async fn download(ctx: &Context, package: &str) -> anyhow::Result<()> {
    let (_, outcome) = fetch_latest(ctx, package).await?;
    if outcome.from_cache {
        Status::info(&format!("Already cached: {}", outcome.path.display()));
    } else {
        Status::success(&format!(
            "Downloaded {} ({})",
            outcome.path.display(),
            format_size(outcome.bytes)
        ));
    }
    Ok(())
}

/// Download the latest matching asset and install it over adb
pub async fn install(ctx: &Context, package: &str) -> anyhow::Result<()> {
    let device = ctx.device()?;
    let (asset, outcome) = fetch_latest(ctx, package).await?;

    let pb = spinner(&format!("Installing {}...", asset.name));
    match device.install(&outcome.path) {
        Ok(()) => finish_success(&pb, &format!("Installed {}", asset.name)),
        Err(e) => {
            finish_error(&pb, "Install failed");
            return Err(e.into());
        }
    }

    // the device is authoritative; re-read what it now reports
    ctx.store.refresh_installed_versions(&device).await?;
    Ok(())
}

/// Resolve and fetch the newest asset for a tracked package
async fn fetch_latest(
    ctx: &Context,
    package: &str,
) -> anyhow::Result<(ResolvedAsset, DownloadOutcome)> {
    let app = ctx.find_app(package)?;
    let filter = AssetFilter::parse(&app.filter)?;
    let client = ctx.client()?;

    let pb = spinner(&format!("Resolving {}/{}...", app.owner, app.repo));
    let asset = match client.resolve(&app.owner, &app.repo, &filter).await {
        Ok(asset) => asset,
        Err(e) => {
            finish_error(&pb, "Resolve failed");
            return Err(apkgit_core::Error::from(e).into());
        }
    };
    pb.set_message(format!("Downloading {}...", asset.name));

    match client.download_asset(&asset, &ctx.cache).await {
        Ok(outcome) => {
            pb.finish_and_clear();
            Ok((asset, outcome))
        }
        Err(e) => {
            finish_error(&pb, "Download failed");
            Err(apkgit_core::Error::from(e).into())
        }
    }
}
