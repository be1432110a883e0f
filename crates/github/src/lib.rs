//! GitHub release client for apkgit
//!
//! Maps (owner, repo, filter) to a concrete downloadable asset and a derived
//! version string, and streams asset bodies into the local cache. Implements
//! [`apkgit_core::resolver::ReleaseResolver`] so the config store can run
//! bulk update checks against it.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
mod download;
mod error;
mod release;

pub use client::{DEFAULT_API_BASE, GithubClient};
pub use download::DownloadOutcome;
pub use error::{ApiError, ApiResult};
pub use release::{Release, ReleaseAsset, ResolvedAsset, resolve_asset};
