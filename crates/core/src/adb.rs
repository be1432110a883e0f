//! Android device access through the adb command line
//!
//! Uses the `adb` binary rather than any protocol implementation, the same
//! way desktop tooling usually does. The device is the authoritative source
//! for installed versions, refreshed before comparisons; sideloading goes
//! through `adb install`.

use crate::error::{Error, Result};
use crate::process::{CommandResult, run_command};
use crate::registry::PackageRegistry;
use std::path::Path;
use tracing::debug;

/// Handle to a connected Android device
pub struct AdbDevice {
    serial: Option<String>,
}

impl AdbDevice {
    /// Connect to a device, optionally by serial
    ///
    /// Only verifies that adb itself is available; per-command errors
    /// surface when the device is actually used.
    pub fn connect(serial: Option<String>) -> Result<Self> {
        which::which("adb").map_err(|_| Error::adb_not_found())?;
        Ok(Self { serial })
    }

    /// Serials of currently attached devices
    pub fn attached_devices() -> Result<Vec<String>> {
        which::which("adb").map_err(|_| Error::adb_not_found())?;
        let result = run_command("adb", &["devices"])?;
        if !result.success {
            return Err(Error::device(result.combined_output()));
        }

        Ok(result
            .stdout
            .lines()
            .skip(1)
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(serial), Some("device")) => Some(serial.to_string()),
                    _ => None,
                }
            })
            .collect())
    }

    fn run(&self, args: &[&str]) -> Result<CommandResult> {
        let mut full: Vec<&str> = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = &self.serial {
            full.push("-s");
            full.push(serial);
        }
        full.extend_from_slice(args);
        run_command("adb", &full)
    }

    /// Version name of an installed package, `None` when not installed
    pub fn version_name(&self, package_name: &str) -> Result<Option<String>> {
        let result = self.run(&["shell", "dumpsys", "package", package_name])?;
        if !result.success {
            return Err(Error::device(format!(
                "dumpsys failed for {}: {}",
                package_name,
                result.combined_output()
            )));
        }
        Ok(parse_version_name(&result.stdout))
    }

    /// Sideload an APK onto the device (replacing an existing install)
    pub fn install(&self, apk: &Path) -> Result<()> {
        debug!(apk = %apk.display(), "installing via adb");
        let path = apk.to_string_lossy();
        let result = self.run(&["install", "-r", &path])?;
        if !result.success || result.combined_output().contains("Failure") {
            return Err(Error::new(
                crate::error::ErrorCode::InstallFailed,
                format!("adb install failed: {}", result.combined_output().trim()),
            ));
        }
        Ok(())
    }
}

impl PackageRegistry for AdbDevice {
    fn installed_version(&self, package_name: &str) -> Option<String> {
        // an unreachable device reads as nothing installed
        self.version_name(package_name).ok().flatten()
    }
}

/// Pull `versionName=` out of dumpsys package output
fn parse_version_name(dumpsys: &str) -> Option<String> {
    dumpsys
        .lines()
        .filter_map(|line| line.trim().strip_prefix("versionName="))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
