//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`] or [`health`]. Each handler lives in its
//! own submodule.

pub mod health;
pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::ProxyError;

pub async fn dispatch(cli: Cli) -> Result<(), ProxyError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  corsproxy v{version} - CORS forwarding proxy for browser clients\n\n  \
         No command provided. To get started:\n\n    \
         corsproxy run                     Start the proxy on 0.0.0.0:3000\n    \
         corsproxy health                  Check a running instance\n    \
         corsproxy --help                  See all commands and options\n"
    );
}
