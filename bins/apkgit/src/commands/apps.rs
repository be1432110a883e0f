//! Tracked-app management: list, add, remove, move

use super::Context;
use apkgit_cli::output::{Status, format_count};
use apkgit_core::config::TrackedApp;
use apkgit_core::filter::AssetFilter;
use apkgit_core::registry::{NOT_INSTALLED, PackageRegistry};
use owo_colors::OwoColorize;

/// Print every tracked app with its version state
pub fn list(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.store.current();
    if config.apps.is_empty() {
        Status::info("No tracked apps");
        return Ok(());
    }

    Status::header(&format!(
        "Tracked apps ({})",
        format_count(config.apps.len(), "entry", "entries")
    ));
    for app in &config.apps {
        let marker = if app.update_available() {
            format!(" {}", "update available".yellow())
        } else {
            String::new()
        };
        println!(
            "  {} {} {}/{} [{}]",
            app.name.bold(),
            app.package_name.dimmed(),
            app.owner,
            app.repo,
            app.filter
        );
        println!(
            "    installed {} · latest {}{}",
            app.installed_version, app.latest_version, marker
        );
    }
    Ok(())
}

/// Track a new repository
pub async fn add(
    ctx: &Context,
    repository: &str,
    package: &str,
    filter: &str,
    name: Option<String>,
) -> anyhow::Result<()> {
    let (owner, repo) = parse_repo(repository).ok_or_else(|| {
        anyhow::anyhow!("'{repository}' is not an owner/repo pair or github.com URL")
    })?;
    let compiled = AssetFilter::parse(filter)?;

    let installed_version = match ctx.device() {
        Ok(device) => device.cleaned_version(package),
        Err(_) => NOT_INSTALLED.to_string(),
    };

    // best-effort initial lookup; a failure still adds the entry
    let latest_version = match ctx.client()?.resolve(&owner, &repo, &compiled).await {
        Ok(asset) => asset.version,
        Err(e) => {
            Status::warning(&format!("Could not resolve latest release: {e}"));
            NOT_INSTALLED.to_string()
        }
    };

    let app = TrackedApp {
        name: name.unwrap_or_else(|| repo.clone()),
        owner,
        repo,
        filter: filter.to_string(),
        package_name: package.to_string(),
        installed_version,
        latest_version,
    };

    ctx.store.add_app(app).await?;
    Status::success(&format!("Now tracking {package}"));
    Ok(())
}

/// Stop tracking a package
pub async fn remove(ctx: &Context, package: &str) -> anyhow::Result<()> {
    if ctx.store.delete_app(package).await? {
        Status::success(&format!("Removed {package}"));
    } else {
        Status::warning(&format!("Package '{package}' was not tracked"));
    }
    Ok(())
}

/// Move a tracked app to a new position
pub async fn move_app(ctx: &Context, package: &str, position: usize) -> anyhow::Result<()> {
    ctx.find_app(package)?;

    let mut order: Vec<String> = ctx
        .store
        .current()
        .apps
        .iter()
        .map(|a| a.package_name.clone())
        .collect();
    order.retain(|p| p != package);
    order.insert(position.min(order.len()), package.to_string());

    ctx.store.reorder_apps(&order).await?;
    Status::success(&format!("Moved {package} to position {position}"));
    Ok(())
}

/// Accepts `owner/repo` or a github.com URL
fn parse_repo(input: &str) -> Option<(String, String)> {
    let trimmed = input.trim().trim_end_matches('/');
    let path = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .map(|rest| rest.strip_prefix("www.").unwrap_or(rest))
        .map(|rest| rest.strip_prefix("github.com/"))
        .unwrap_or(Some(trimmed))?;

    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}
