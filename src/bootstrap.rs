//! vcpkg tool layout and bootstrap
//!
//! Knows where the vcpkg executable lives and how to build it with the
//! bootstrap script shipped in the checkout.

use crate::error::{VcpkgError, VcpkgResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Whether `platform` (as in `std::env::consts::OS`) is Windows
fn is_windows(platform: &str) -> bool {
    platform == "windows"
}

/// Path of the vcpkg executable inside `vcpkg_root`
pub fn vcpkg_executable(vcpkg_root: &Path, platform: &str) -> PathBuf {
    if is_windows(platform) {
        vcpkg_root.join("vcpkg.exe")
    } else {
        vcpkg_root.join("vcpkg")
    }
}

/// Bootstrap script name for `platform`
pub fn bootstrap_script(platform: &str) -> &'static str {
    if is_windows(platform) {
        "bootstrap-vcpkg.bat"
    } else {
        "bootstrap-vcpkg.sh"
    }
}

/// Paths cached by default: the built tool
pub fn default_cache_paths(vcpkg_root: &Path, platform: &str) -> Vec<String> {
    vec![vcpkg_executable(vcpkg_root, platform)
        .display()
        .to_string()]
}

/// Whether the tool still needs to be built
pub fn needs_bootstrap(vcpkg_root: &Path, platform: &str) -> bool {
    !vcpkg_executable(vcpkg_root, platform).is_file()
}

/// Run the bootstrap script inside `vcpkg_root`
pub async fn bootstrap(vcpkg_root: &Path, platform: &str) -> VcpkgResult<()> {
    if !vcpkg_root.is_dir() {
        return Err(VcpkgError::VcpkgDirNotFound(vcpkg_root.to_path_buf()));
    }

    let script = vcpkg_root.join(bootstrap_script(platform));
    let (program, args) = if is_windows(platform) {
        (
            "cmd",
            vec![
                "/c".to_string(),
                script.display().to_string(),
                "-disableMetrics".to_string(),
            ],
        )
    } else {
        (
            "sh",
            vec![script.display().to_string(), "-disableMetrics".to_string()],
        )
    };

    info!("Bootstrapping vcpkg in {}", vcpkg_root.display());
    debug!("Executing: {} {:?}", program, args);

    let output = Command::new(program)
        .args(&args)
        .current_dir(vcpkg_root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| VcpkgError::BootstrapSpawn {
            command: format!("{} {:?}", program, args),
            source: e,
        })?;

    if !output.status.success() {
        return Err(VcpkgError::BootstrapFailed {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!("{}", String::from_utf8_lossy(&output.stdout).trim());
    Ok(())
}
