//! Built-in subcommands
//!
//! Each command is a unit struct implementing [`crate::command::Command`].

mod init;
mod install;
mod pip;
mod run;
mod uninstall;
mod upgrade;

pub use init::InitCommand;
pub use install::InstallCommand;
pub use pip::PipCommand;
pub use run::RunCommand;
pub use uninstall::UninstallCommand;
pub use upgrade::UpgradeCommand;

use crate::config::{ConfigStore, ConfigUpdate, ProjectConfig};
use crate::runtime::{EnvironmentGateway, EnvironmentHandle, InstallationResult};
use crate::settings::{Context, DEFAULT_ENVIRONMENT_DIR};
use anyhow::Result;
use clap::Arg;
use colored::Colorize;

/// Options key of the package specs given on the command line
const LIBRARIES_KEY: &str = "libraries";

/// Options key of the `-r` requirements file
const REQUIREMENTS_KEY: &str = "requirements";

/// Positional specs plus `-r <file>`, shared by install and upgrade
fn library_arguments(parser: clap::Command, verb: &str) -> clap::Command {
    parser
        .arg(
            Arg::new(LIBRARIES_KEY)
                .value_name("libs")
                .num_args(0..)
                .help(format!("Libraries to {}", verb)),
        )
        .arg(
            Arg::new(REQUIREMENTS_KEY)
                .short('r')
                .value_name("requirements.txt")
                .help(format!("{} from a requirements file", capitalize(verb))),
        )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Provision the configured environment, defaulting and persisting `venv`
async fn prepare_environment(
    store: &ConfigStore,
    config: &mut ProjectConfig,
    gateway: &EnvironmentGateway,
) -> Result<EnvironmentHandle> {
    if config.environment_dir.is_empty() {
        store.update(
            config,
            ConfigUpdate::new().environment_dir(DEFAULT_ENVIRONMENT_DIR),
        )?;
    }
    gateway.ensure_environment(&config.environment_dir).await
}

/// Summary lines after a batch
fn report(ctx: &Context, done: &str, result: &InstallationResult) {
    if !result.succeeded.is_empty() {
        println!("{} {}", format!("{}:", done).green(), result.succeeded.join(", "));
    }
    if !result.is_clean() {
        eprintln!(
            "{} {} (logged to {})",
            "Failed:".red(),
            result.failed.join(", "),
            ctx.settings.failure_log
        );
    }
}
