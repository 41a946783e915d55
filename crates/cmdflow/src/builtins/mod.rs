//! Builtin `help` and `version` commands.
//!
//! Both are ordinary Shared commands registered by default; they run through
//! the same handler contract as user commands.

mod help;
mod version;

pub use help::render_help;
pub use version::{find_manifest, project_version, read_manifest_version};

use crate::context::Handler;
use crate::schema::SharedCommand;

pub const HELP: &str = "help";
pub const VERSION: &str = "version";

/// Placeholder printed when no manifest version is found.
pub const UNKNOWN_VERSION: &str = "unknown";

/// `--help` / `-h`: print usage and the option list to stdout.
pub fn help_command() -> SharedCommand {
    SharedCommand::new(
        HELP,
        Handler::sync(|cx| {
            cx.console().out(&render_help(&cx.definition()));
            Ok(())
        }),
    )
    .short('h')
    .as_flag()
    .description("Print help")
}

/// `--version` / `-V`: print `<name> <version>` to stdout.
pub fn version_command() -> SharedCommand {
    SharedCommand::new(
        VERSION,
        Handler::sync(|cx| {
            let version =
                project_version(cx.settings()).unwrap_or_else(|| UNKNOWN_VERSION.to_string());
            cx.console().out(&format!("{} {}\n", cx.name(), version));
            Ok(())
        }),
    )
    .short('V')
    .as_flag()
    .description("Print version")
}
