//! Key command - print the cache keys

use crate::cache::{CacheKeyEngine, KeySet, RepositoryIdentity};
use crate::cli::args::{KeyArgs, OutputFormat};
use crate::cli::commands::key_value;
use crate::cli::context::Context;
use crate::error::VcpkgResult;
use crate::git::GitCli;
use console::style;

/// Execute the key command
pub async fn execute(args: KeyArgs, ctx: &Context) -> VcpkgResult<()> {
    let vcpkg_dir = ctx.vcpkg_dir(&args.dir);
    let query = GitCli::new();
    let engine = CacheKeyEngine::new(&ctx.workspace, ctx.env.clone(), &query)
        .with_segments(ctx.config.cache.key_segments.clone());

    let (identity, keys) = engine
        .compute(&vcpkg_dir, ctx.commit_override(&args))
        .await;

    match args.format {
        OutputFormat::Table => print_table(&identity, &keys),
        OutputFormat::Json => print_json(&identity, &keys)?,
        OutputFormat::Plain => {
            println!("{}", keys.primary);
            for restore in &keys.restore_keys {
                println!("{}", restore);
            }
        }
    }

    Ok(())
}

fn print_table(identity: &RepositoryIdentity, keys: &KeySet) {
    key_value("Commit", identity.commit_id.as_deref().unwrap_or("-"));
    key_value("Primary key", style(&keys.primary).cyan());
    if keys.restore_keys.is_empty() {
        key_value("Restore keys", style("none").dim());
    } else {
        key_value("Restore keys", &keys.restore_keys[0]);
        for restore in &keys.restore_keys[1..] {
            println!("{:<14} {}", "", restore);
        }
    }
}

fn print_json(identity: &RepositoryIdentity, keys: &KeySet) -> VcpkgResult<()> {
    let json = serde_json::json!({
        "identity": identity,
        "primary": keys.primary,
        "restore_keys": keys.restore_keys,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
