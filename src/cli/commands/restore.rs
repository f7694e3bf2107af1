//! Restore command - fetch the best matching cache entry

use crate::cache::{is_exact_match, CacheKeyEngine, CacheStore};
use crate::cli::args::{KeyArgs, OutputFormat};
use crate::cli::commands::key_value;
use crate::cli::context::Context;
use crate::error::VcpkgResult;
use crate::git::GitCli;
use console::style;
use tracing::info;

/// Execute the restore command
pub async fn execute(args: KeyArgs, ctx: &Context) -> VcpkgResult<()> {
    if !ctx.config.cache.enabled {
        info!("Caching is disabled; skipping restore");
        return Ok(());
    }

    let vcpkg_dir = ctx.vcpkg_dir(&args.dir);
    let query = GitCli::new();
    let engine = CacheKeyEngine::new(&ctx.workspace, ctx.env.clone(), &query)
        .with_segments(ctx.config.cache.key_segments.clone());
    let (_, keys) = engine
        .compute(&vcpkg_dir, ctx.commit_override(&args))
        .await;

    let store = ctx.store();
    let hit = store.restore(&keys.primary, &keys.restore_keys).await?;
    let exact = is_exact_match(&keys.primary, hit.as_deref());

    match args.format {
        OutputFormat::Table => {
            key_value("Primary key", &keys.primary);
            match &hit {
                Some(hit) if exact => key_value("Restored", style(hit).green()),
                Some(hit) => key_value("Restored", style(format!("{} (fallback)", hit)).yellow()),
                None => key_value("Restored", style("miss").dim()),
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "primary": keys.primary,
                "hit_key": hit,
                "exact": exact,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => {
            if let Some(hit) = &hit {
                println!("{}", hit);
            }
        }
    }

    Ok(())
}
