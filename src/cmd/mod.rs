//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`] or [`validate`]. Each handler lives in its
//! own submodule.

pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::WebguardError;

pub async fn dispatch(cli: Cli) -> Result<(), WebguardError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  webguard v{version}: XSRF-guarded request pipeline\n\n  \
         No command provided. To get started:\n\n    \
         webguard run                      Start the demo server (auto-detects ./webguard.yaml)\n    \
         webguard run -c webguard.yaml     Start with a specific config file\n    \
         webguard validate webguard.yaml   Check a config file\n    \
         webguard --help                   See all commands and options\n"
    );
}
