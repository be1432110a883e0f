//! Config import/export and cache maintenance

use super::Context;
use apkgit_cli::output::{Status, format_count, format_size};
use std::path::Path;

/// Replace the config with an exported document
pub async fn import(ctx: &Context, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", file.display()))?;
    let count = ctx.store.import(&content).await?;
    Status::success(&format!(
        "Imported {}",
        format_count(count, "app", "apps")
    ));
    Ok(())
}

/// Write the config document to a file or stdout
pub fn export(ctx: &Context, file: Option<&Path>) -> anyhow::Result<()> {
    let doc = ctx.store.export()?;
    match file {
        Some(path) => {
            std::fs::write(path, &doc)
                .map_err(|e| anyhow::anyhow!("Cannot write {}: {e}", path.display()))?;
            Status::success(&format!("Exported to {}", path.display()));
        }
        None => println!("{doc}"),
    }
    Ok(())
}

/// Delete cached downloads by extension
pub fn clear_cache(ctx: &Context, ext: &str) -> anyhow::Result<()> {
    let before = ctx.cache.stats()?;
    let removed = ctx.cache.clear(ext)?;
    let after = ctx.cache.stats()?;

    Status::success(&format!(
        "Removed {} ({} freed)",
        format_count(removed, "file", "files"),
        format_size(before.total_bytes.saturating_sub(after.total_bytes))
    ));
    Ok(())
}
