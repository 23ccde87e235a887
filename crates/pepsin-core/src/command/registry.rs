//! Static name/alias table of the built-in commands

use super::{driver, build_parser, Command, CommandDescriptor};
use crate::commands::{
    InitCommand, InstallCommand, PipCommand, RunCommand, UninstallCommand, UpgradeCommand,
};
use crate::error::PepsinError;
use crate::prompt::LineReader;
use crate::settings::Context;
use anyhow::Result;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use tracing::debug;

/// The closed set of commands shipped with pepsin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCommand {
    Init,
    Install,
    Uninstall,
    Upgrade,
    Run,
    Pip,
}

impl BuiltinCommand {
    /// Registration order, which is also listing order
    pub const ALL: [BuiltinCommand; 6] = [
        BuiltinCommand::Init,
        BuiltinCommand::Install,
        BuiltinCommand::Uninstall,
        BuiltinCommand::Upgrade,
        BuiltinCommand::Run,
        BuiltinCommand::Pip,
    ];

    pub fn descriptor(&self) -> CommandDescriptor {
        match self {
            BuiltinCommand::Init => InitCommand::DESCRIPTOR,
            BuiltinCommand::Install => InstallCommand::DESCRIPTOR,
            BuiltinCommand::Uninstall => UninstallCommand::DESCRIPTOR,
            BuiltinCommand::Upgrade => UpgradeCommand::DESCRIPTOR,
            BuiltinCommand::Run => RunCommand::DESCRIPTOR,
            BuiltinCommand::Pip => PipCommand::DESCRIPTOR,
        }
    }

    /// Rendered `--help` text of the command's parser
    pub fn format_help(&self) -> String {
        let mut parser = match self {
            BuiltinCommand::Init => build_parser(&InitCommand),
            BuiltinCommand::Install => build_parser(&InstallCommand),
            BuiltinCommand::Uninstall => build_parser(&UninstallCommand),
            BuiltinCommand::Upgrade => build_parser(&UpgradeCommand),
            BuiltinCommand::Run => build_parser(&RunCommand),
            BuiltinCommand::Pip => build_parser(&PipCommand),
        };
        parser.render_long_help().to_string()
    }

    pub async fn run(
        &self,
        argv: &[String],
        ctx: &Context,
        reader: &mut dyn LineReader,
    ) -> Result<i32> {
        match self {
            BuiltinCommand::Init => driver::run(&InitCommand, argv, ctx, reader).await,
            BuiltinCommand::Install => driver::run(&InstallCommand, argv, ctx, reader).await,
            BuiltinCommand::Uninstall => driver::run(&UninstallCommand, argv, ctx, reader).await,
            BuiltinCommand::Upgrade => driver::run(&UpgradeCommand, argv, ctx, reader).await,
            BuiltinCommand::Run => driver::run(&RunCommand, argv, ctx, reader).await,
            BuiltinCommand::Pip => driver::run(&PipCommand, argv, ctx, reader).await,
        }
    }
}

static BUILTIN: OnceCell<Registry> = OnceCell::new();

/// Name and alias lookup, built once and never mutated
#[derive(Debug, Clone)]
pub struct Registry {
    commands: Vec<BuiltinCommand>,
    names: BTreeMap<&'static str, BuiltinCommand>,
}

impl Registry {
    /// Index `commands` by name and alias, rejecting any collision
    pub fn build(commands: &[BuiltinCommand]) -> Result<Self, PepsinError> {
        let mut names = BTreeMap::new();
        for command in commands {
            for name in command.descriptor().names() {
                if names.insert(name, *command).is_some() {
                    return Err(PepsinError::DuplicateCommand {
                        name: name.to_string(),
                    });
                }
            }
        }
        debug!(commands = commands.len(), names = names.len(), "registry built");
        Ok(Self {
            commands: commands.to_vec(),
            names,
        })
    }

    /// Process-wide registry of the built-in commands
    pub fn discover() -> Result<&'static Registry> {
        Ok(BUILTIN.get_or_try_init(|| Registry::build(&BuiltinCommand::ALL))?)
    }

    pub fn resolve(&self, name: &str) -> Result<BuiltinCommand, PepsinError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| PepsinError::CommandNotFound {
                name: name.to_string(),
            })
    }

    /// Canonical commands in registration order
    pub fn commands(&self) -> &[BuiltinCommand] {
        &self.commands
    }
}
