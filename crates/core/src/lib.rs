//! Core domain logic for apkgit
//!
//! apkgit tracks GitHub repositories that publish APK releases, resolves the
//! newest release asset matching each tracked app's filename filter, and
//! sideloads it over adb. This crate owns everything except the HTTP client
//! and the CLI front-end:
//!
//! - **Config**: the tracked-app document, its mutex-serialized store, and
//!   snapshot/watch publication
//! - **Filters**: literal-plus-`*` asset filename patterns and version
//!   extraction
//! - **Device access**: installed-version lookup and APK install via adb
//! - **Asset cache**: filename-keyed cache of downloaded assets
//! - **Errors**: structured errors with codes, context, and suggestions
//!
//! # Example
//!
//! ```rust,no_run
//! use apkgit_core::config::ConfigStore;
//! use apkgit_core::settings::default_config_dir;
//!
//! # async fn demo() {
//! let store = ConfigStore::new(default_config_dir());
//! let config = store.load().await;
//! for app in &config.apps {
//!     println!("{} {} -> {}", app.name, app.installed_version, app.latest_version);
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adb;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod process;
pub mod registry;
pub mod resolver;
pub mod settings;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::adb::AdbDevice;
    pub use crate::cache::AssetCache;
    pub use crate::config::{AppConfig, ConfigStore, TrackedApp, UpdateSummary};
    pub use crate::error::{Error, ErrorCode, Result, ResultExt, exit_codes};
    pub use crate::filter::{AssetFilter, clean_version};
    pub use crate::registry::{NOT_INSTALLED, PackageRegistry};
    pub use crate::resolver::ReleaseResolver;
    pub use crate::settings::Settings;
}
