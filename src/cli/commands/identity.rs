//! Identity command - show how the vcpkg checkout was detected

use crate::cache::{CacheKeyEngine, RepositoryIdentity};
use crate::cli::args::{IdentityArgs, OutputFormat};
use crate::cli::commands::key_value;
use crate::cli::context::Context;
use crate::error::VcpkgResult;
use crate::git::GitCli;
use console::style;
use std::path::Path;

/// Execute the identity command
pub async fn execute(args: IdentityArgs, ctx: &Context) -> VcpkgResult<()> {
    let vcpkg_dir = ctx.vcpkg_dir(&args.dir);
    let query = GitCli::new();
    let engine = CacheKeyEngine::new(&ctx.workspace, ctx.env.clone(), &query);

    let identity = engine.identity(&vcpkg_dir).await;

    match args.format {
        OutputFormat::Table => print_table(&vcpkg_dir, &identity),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&identity)?),
        OutputFormat::Plain => {
            if let Some(commit) = &identity.commit_id {
                println!("{}", commit);
            }
        }
    }

    Ok(())
}

fn print_table(vcpkg_dir: &Path, identity: &RepositoryIdentity) {
    let kind = match identity.is_submodule {
        Some(true) => style("submodule").cyan(),
        Some(false) => style("checkout").green(),
        None => style("not a git repository").dim(),
    };

    key_value("Directory", vcpkg_dir.display());
    key_value("Kind", kind);
    key_value(
        "Commit",
        identity.commit_id.as_deref().unwrap_or("-"),
    );
}
