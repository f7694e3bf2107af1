//! Save command - persist a cache entry unless the restored one matches

use crate::cache::{save_cache, CacheKeyEngine, SaveOutcome, SkipReason};
use crate::cli::args::{OutputFormat, SaveArgs};
use crate::cli::commands::key_value;
use crate::cli::context::Context;
use crate::error::VcpkgResult;
use crate::git::GitCli;
use console::style;
use tracing::info;

/// Execute the save command
pub async fn execute(args: SaveArgs, ctx: &Context) -> VcpkgResult<()> {
    let outcome = if ctx.config.cache.enabled {
        let vcpkg_dir = ctx.vcpkg_dir(&args.key.dir);
        let query = GitCli::new();
        let engine = CacheKeyEngine::new(&ctx.workspace, ctx.env.clone(), &query)
            .with_segments(ctx.config.cache.key_segments.clone());
        let (_, keys) = engine
            .compute(&vcpkg_dir, ctx.commit_override(&args.key))
            .await;

        let paths = if args.paths.is_empty() {
            ctx.cache_paths(&vcpkg_dir)
        } else {
            args.paths.clone()
        };

        let store = ctx.store();
        save_cache(&store, &keys, args.hit_key.as_deref(), paths.as_slice()).await?
    } else {
        info!("Caching is disabled; skipping save");
        SaveOutcome::Skipped(SkipReason::Disabled)
    };

    print_outcome(&outcome, args.key.format)
}

/// Report a save outcome in the requested format
pub(crate) fn print_outcome(outcome: &SaveOutcome, format: OutputFormat) -> VcpkgResult<()> {
    match format {
        OutputFormat::Table => {
            let styled = match outcome {
                SaveOutcome::Saved => style(outcome.to_string()).green(),
                SaveOutcome::Skipped(_) => style(outcome.to_string()).dim(),
                SaveOutcome::Conflict => style(outcome.to_string()).cyan(),
                SaveOutcome::Other(_) => style(outcome.to_string()).yellow(),
            };
            key_value("Save", styled);
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "outcome": outcome.to_string() });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => println!("{}", outcome),
    }
    Ok(())
}
