//! Run command - restore, bootstrap if needed, save

use crate::bootstrap::{bootstrap, needs_bootstrap};
use crate::cache::{save_cache, CacheKeyEngine, CacheStore, SaveOutcome, SkipReason};
use crate::cli::args::{KeyArgs, OutputFormat};
use crate::cli::commands::key_value;
use crate::cli::commands::save::print_outcome;
use crate::cli::context::Context;
use crate::error::VcpkgResult;
use crate::git::GitCli;
use crate::manifest::find_manifest;
use console::style;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What one run did, for reporting
struct RunReport {
    manifest: Option<PathBuf>,
    primary: String,
    hit_key: Option<String>,
    bootstrapped: bool,
    outcome: SaveOutcome,
}

/// Execute the run command
pub async fn execute(args: KeyArgs, ctx: &Context) -> VcpkgResult<()> {
    let vcpkg_dir = ctx.vcpkg_dir(&args.dir);
    debug!("vcpkg directory: {}", vcpkg_dir.display());

    let manifest = match find_manifest(
        &ctx.workspace,
        &ctx.config.vcpkg.manifest_glob,
        &ctx.config.vcpkg.manifest_ignore,
    ) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("Manifest lookup failed; continuing without one: {}", e);
            None
        }
    };

    let query = GitCli::new();
    let engine = CacheKeyEngine::new(&ctx.workspace, ctx.env.clone(), &query)
        .with_segments(ctx.config.cache.key_segments.clone());
    let (_, keys) = engine
        .compute(&vcpkg_dir, ctx.commit_override(&args))
        .await;

    let store = ctx.store();
    let hit_key = if ctx.config.cache.enabled {
        store.restore(&keys.primary, &keys.restore_keys).await?
    } else {
        info!("Caching is disabled; skipping restore");
        None
    };

    let bootstrapped = needs_bootstrap(&vcpkg_dir, &ctx.env.platform);
    if bootstrapped {
        bootstrap(&vcpkg_dir, &ctx.env.platform).await?;
    }

    let outcome = if ctx.config.cache.enabled {
        let paths = ctx.cache_paths(&vcpkg_dir);
        save_cache(&store, &keys, hit_key.as_deref(), paths.as_slice()).await?
    } else {
        SaveOutcome::Skipped(SkipReason::Disabled)
    };

    let report = RunReport {
        manifest,
        primary: keys.primary,
        hit_key,
        bootstrapped,
        outcome,
    };
    print_report(&report, args.format)
}

fn print_report(report: &RunReport, format: OutputFormat) -> VcpkgResult<()> {
    match format {
        OutputFormat::Table => {
            match &report.manifest {
                Some(path) => key_value("Manifest", path.display()),
                None => key_value("Manifest", style("none").dim()),
            }
            key_value("Primary key", &report.primary);
            key_value("Restored", report.hit_key.as_deref().unwrap_or("-"));
            if report.bootstrapped {
                key_value("Bootstrap", style("done").green());
            } else {
                key_value("Bootstrap", style("up to date").dim());
            }
            print_outcome(&report.outcome, format)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "manifest": report.manifest,
                "primary": report.primary,
                "hit_key": report.hit_key,
                "bootstrapped": report.bootstrapped,
                "outcome": report.outcome.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(())
        }
        OutputFormat::Plain => print_outcome(&report.outcome, format),
    }
}
