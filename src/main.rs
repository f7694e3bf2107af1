//! vcpkg-cache - cache vcpkg in CI
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vcpkg_cache::cli::{Cli, Commands, Context, LogFormat};
use vcpkg_cache::config::{Config, ConfigManager};
use vcpkg_cache::env::EnvSignals;
use vcpkg_cache::error::{VcpkgError, VcpkgResult};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, format: LogFormat) {
    // 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("vcpkg_cache=warn"),
        1 => EnvFilter::new("vcpkg_cache=info"),
        _ => EnvFilter::new("vcpkg_cache=debug"),
    });

    // Logs go to stderr so stdout stays parseable
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init(),
    }
}

fn log_format(cli: &Cli, config: &Config) -> LogFormat {
    cli.log_format.unwrap_or_else(|| {
        if config.general.log_format.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    })
}

async fn run() -> VcpkgResult<()> {
    let cli = Cli::parse();
    let env = EnvSignals::from_env();

    let workspace = match cli.workspace.clone().or_else(|| env.workspace.clone()) {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|e| VcpkgError::io("getting current directory", e))?,
    };
    let workspace = absolute(workspace)?;

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::discover(&workspace),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, log_format(&cli, &config));
    debug!("Workspace root: {}", workspace.display());
    debug!("Configuration: {}", config_manager.path().display());

    let ctx = Context {
        workspace,
        env,
        config,
        config_path: config_manager.path().to_path_buf(),
    };

    match cli.command {
        Commands::Identity(args) => vcpkg_cache::cli::commands::identity(args, &ctx).await,
        Commands::Key(args) => vcpkg_cache::cli::commands::key(args, &ctx).await,
        Commands::Restore(args) => vcpkg_cache::cli::commands::restore(args, &ctx).await,
        Commands::Save(args) => vcpkg_cache::cli::commands::save(args, &ctx).await,
        Commands::Run(args) => vcpkg_cache::cli::commands::run(args, &ctx).await,
        Commands::Config(args) => vcpkg_cache::cli::commands::config(args, &ctx).await,
    }
}

fn absolute(path: PathBuf) -> VcpkgResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| VcpkgError::io("getting current directory", e))?;
    Ok(cwd.join(path))
}
