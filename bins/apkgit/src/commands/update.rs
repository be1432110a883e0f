//! Update checking and installed-version refresh

use super::Context;
use apkgit_cli::output::{Status, format_count};
use apkgit_cli::progress::{finish_error, finish_success, spinner};
use apkgit_core::adb::AdbDevice;
use apkgit_core::config::UpdateSummary;
use apkgit_core::registry::EmptyRegistry;

/// Resolve the latest release for every tracked app
pub async fn check(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.store.current();
    if config.apps.is_empty() {
        Status::info("No tracked apps");
        return Ok(());
    }

    let client = ctx.client()?;
    let pb = spinner(&format!(
        "Checking {} for updates...",
        format_count(config.apps.len(), "app", "apps")
    ));

    // no device attached still allows release lookups; installed versions
    // then read as not installed
    let summary: UpdateSummary = match ctx.device() {
        Ok(device) => ctx.store.check_all_updates(&client, &device).await,
        Err(_) => ctx.store.check_all_updates(&client, &EmptyRegistry).await,
    }?;

    if summary.failed == 0 {
        finish_success(&pb, &format!("Checked {}", format_count(summary.checked, "app", "apps")));
    } else {
        finish_error(
            &pb,
            &format!(
                "Checked {}, {} failed (previous values kept)",
                format_count(summary.checked, "app", "apps"),
                summary.failed
            ),
        );
    }

    let updates: Vec<_> = ctx
        .store
        .current()
        .apps
        .iter()
        .filter(|a| a.update_available())
        .cloned()
        .collect();

    if updates.is_empty() {
        Status::info("Everything is up to date");
    } else {
        Status::header(&format!(
            "{} available",
            format_count(updates.len(), "update", "updates")
        ));
        for app in updates {
            println!(
                "  {}: {} -> {}",
                app.name, app.installed_version, app.latest_version
            );
        }
    }
    Ok(())
}

/// Re-read installed versions from the connected device
pub async fn refresh(ctx: &Context) -> anyhow::Result<()> {
    let device = ctx.device()?;
    if ctx.store.refresh_installed_versions(&device).await? {
        Status::success("Installed versions refreshed");
    } else {
        Status::info("Installed versions unchanged");
    }
    Ok(())
}

/// List attached adb devices
pub fn devices() -> anyhow::Result<()> {
    let devices = AdbDevice::attached_devices()?;
    if devices.is_empty() {
        Status::warning("No devices attached");
    } else {
        for serial in devices {
            println!("{serial}");
        }
    }
    Ok(())
}
