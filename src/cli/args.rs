//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// vcpkg-cache - cache vcpkg in CI
///
/// Derives a stable cache key for a vcpkg checkout and restores or saves
/// the bootstrapped tool through a build cache.
#[derive(Parser, Debug)]
#[command(name = "vcpkg-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "VCPKG_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workspace root (defaults to GITHUB_WORKSPACE, then the current directory)
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the detected commit identity of the vcpkg checkout
    Identity(IdentityArgs),

    /// Print the cache keys for the vcpkg checkout
    Key(KeyArgs),

    /// Restore the best matching cache entry
    Restore(KeyArgs),

    /// Save a cache entry unless the restored one already matches
    Save(SaveArgs),

    /// Restore, bootstrap vcpkg if needed, then save
    Run(KeyArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Location of the vcpkg checkout
#[derive(Parser, Debug, Clone)]
pub struct VcpkgDirArgs {
    /// vcpkg directory, relative to the workspace root unless absolute
    #[arg(long)]
    pub vcpkg_dir: Option<PathBuf>,
}

/// Arguments for the identity command
#[derive(Parser, Debug)]
pub struct IdentityArgs {
    #[command(flatten)]
    pub dir: VcpkgDirArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for commands that compute keys
#[derive(Parser, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub dir: VcpkgDirArgs,

    /// vcpkg commit id to use when none is detected
    #[arg(long, env = "VCPKG_GIT_COMMIT_ID")]
    pub commit_id: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the save command
#[derive(Parser, Debug)]
pub struct SaveArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Key returned by the earlier restore, if any
    #[arg(long)]
    pub hit_key: Option<String>,

    /// Paths to cache (defaults to the vcpkg executable plus configured paths)
    #[arg(long = "path")]
    pub paths: Vec<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Output format for reporting commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Bare values, one per line
    Plain,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
