//! Config command - show configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::cli::context::Context;
use crate::error::VcpkgResult;

/// Execute the config command
pub async fn execute(args: ConfigArgs, ctx: &Context) -> VcpkgResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => {
            println!("{}", toml::to_string_pretty(&ctx.config)?);
        }
        Some(ConfigAction::Path) => println!("{}", ctx.config_path.display()),
    }

    Ok(())
}
