//! Error types for vcpkg-cache
//!
//! All modules use `VcpkgResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vcpkg-cache operations
pub type VcpkgResult<T> = Result<T, VcpkgError>;

/// All errors that can occur in vcpkg-cache
#[derive(Error, Debug)]
pub enum VcpkgError {
    // Repository detection errors
    #[error("Failed to query commit id in {dir}: {reason}")]
    CommitQuery { dir: PathBuf, reason: String },

    #[error("Failed to read submodule metadata {path}: {source}")]
    SubmoduleHead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Cache errors
    #[error("Cache save request rejected: {0}")]
    CacheValidation(String),

    #[error("Cache entry is corrupt: {path}: {reason}")]
    CacheEntryCorrupt { path: PathBuf, reason: String },

    // Manifest lookup errors
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    // Bootstrap errors
    #[error("vcpkg directory not found: {0}")]
    VcpkgDirNotFound(PathBuf),

    #[error("Failed to start vcpkg bootstrap: {command}")]
    BootstrapSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("vcpkg bootstrap failed with exit code {code}: {stderr}")]
    BootstrapFailed { code: i32, stderr: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl VcpkgError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheValidation(_) => {
                Some("Check the cache key and that the paths to cache exist")
            }
            Self::VcpkgDirNotFound(_) => {
                Some("Pass --vcpkg-dir or set [vcpkg].directory in vcpkg-cache.toml")
            }
            Self::CommandFailed { .. } => Some("Make sure git is installed and on PATH"),
            Self::BootstrapSpawn { .. } => {
                Some("Make sure sh (or cmd on Windows) is on PATH and the bootstrap script exists")
            }
            _ => None,
        }
    }
}
