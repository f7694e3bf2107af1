//! CLI command implementations

pub mod config;
pub mod identity;
pub mod key;
pub mod restore;
pub mod run;
pub mod save;

pub use config::execute as config;
pub use identity::execute as identity;
pub use key::execute as key;
pub use restore::execute as restore;
pub use run::execute as run;
pub use save::execute as save;

use console::style;
use std::fmt::Display;

/// Print an aligned `label: value` line
pub(crate) fn key_value(label: &str, value: impl Display) {
    println!("{:<14} {}", style(format!("{}:", label)).bold(), value);
}
