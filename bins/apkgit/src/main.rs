//! apkgit - GitHub release tracker for sideloaded Android apps
//!
//! Tracks repositories that publish APK releases, checks them against what a
//! connected device reports as installed, and sideloads updates over adb.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{Context, apps, backup, fetch, update};

/// GitHub release tracker for sideloaded Android apps
#[derive(Parser)]
#[command(name = "apkgit")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config directory (default: platform config dir)
    #[arg(long, global = true, env = "APKGIT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// GitHub token (overrides settings and GITHUB_TOKEN)
    #[arg(long, global = true, hide_env_values = true, env = "APKGIT_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked apps and their version state
    List,

    /// Track a new repository
    Add {
        /// Repository as owner/repo or a github.com URL
        repository: String,

        /// Package identifier installed on the device
        #[arg(short, long)]
        package: String,

        /// Asset filename filter, * matches any substring
        #[arg(short, long, default_value = "*.apk")]
        filter: String,

        /// Display name (defaults to the repository name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Stop tracking a package
    Remove {
        /// Package identifier
        package: String,
    },

    /// Move a tracked app to a new position in the list
    Move {
        /// Package identifier
        package: String,

        /// Zero-based target position
        position: usize,
    },

    /// Check all tracked apps for new releases
    Check,

    /// Refresh installed versions from the connected device
    Refresh,

    /// Download the latest matching asset into the cache
    Download {
        /// Package identifier
        package: String,
    },

    /// Download the latest matching asset and sideload it
    Install {
        /// Package identifier
        package: String,
    },

    /// Replace the config with an exported document
    Import {
        /// Path to the document
        file: PathBuf,
    },

    /// Write the config document to a file or stdout
    Export {
        /// Destination path (stdout if omitted)
        file: Option<PathBuf>,
    },

    /// Delete cached downloads by file extension
    ClearCache {
        /// Extension to delete
        #[arg(long, default_value = "apk")]
        ext: String,
    },

    /// List attached adb devices
    Devices,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("apkgit=debug,apkgit_core=debug,apkgit_github=debug")
            .init();
    }

    let ctx = match Context::init(cli.config_dir, cli.token).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::List => apps::list(&ctx),
        Commands::Add {
            repository,
            package,
            filter,
            name,
        } => apps::add(&ctx, &repository, &package, &filter, name).await,
        Commands::Remove { package } => apps::remove(&ctx, &package).await,
        Commands::Move { package, position } => apps::move_app(&ctx, &package, position).await,

        Commands::Check => update::check(&ctx).await,
        Commands::Refresh => update::refresh(&ctx).await,

        Commands::Download { package } => fetch::download(&ctx, &package).await,
        Commands::Install { package } => fetch::install(&ctx, &package).await,

        Commands::Import { file } => backup::import(&ctx, &file).await,
        Commands::Export { file } => backup::export(&ctx, file.as_deref()),
        Commands::ClearCache { ext } => backup::clear_cache(&ctx, &ext),

        Commands::Devices => update::devices(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}

/// Map core error categories onto CLI exit codes
fn exit_code_for(err: &anyhow::Error) -> i32 {
    use apkgit_core::error::exit_codes;

    match err.downcast_ref::<apkgit_core::Error>() {
        Some(core) => match core.code.category() {
            "Configuration" => exit_codes::CONFIG_ERROR,
            "Network" => exit_codes::NETWORK_ERROR,
            "Device" => exit_codes::DEVICE_ERROR,
            "General" if core.code == apkgit_core::ErrorCode::Timeout => exit_codes::TIMEOUT,
            _ => exit_codes::FAILURE,
        },
        None => exit_codes::FAILURE,
    }
}
