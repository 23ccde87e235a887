//! The contract every subcommand fulfils
//!
//! A command is a small value implementing [`Command`]. The shared lifecycle
//! (parse, prompt, format, execute, materialize) lives once in
//! [`driver::run`]; each hook returns a fresh value instead of mutating a
//! collaborator handed to it.

pub mod driver;
pub mod registry;

pub use driver::{build_parser, run, ARGS_KEY, NO_INPUT_KEY};
pub use registry::{BuiltinCommand, Registry};

use crate::options::Options;
use crate::prompt::Question;
use crate::settings::Context;
use crate::templates::TemplateJob;
use anyhow::Result;

/// Static facts about a command, fixed at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Canonical name typed on the command line
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Long help shown by `pepsin help <command>`
    pub help: &'static str,
    /// One-line summary shown in the command listing
    pub short_description: &'static str,
}

impl CommandDescriptor {
    /// Canonical name followed by every alias
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

/// Final options plus the positional pass-through tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub options: Options,
    /// Free trailing tokens, handed over verbatim
    pub args: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait Command {
    const DESCRIPTOR: CommandDescriptor;

    /// Register command-specific arguments on the shared parser
    fn declare_arguments(&self, parser: clap::Command) -> clap::Command {
        parser
    }

    /// Questions to ask; `preset` holds the parsed flag values
    fn declare_questions(&self, _preset: &Options) -> Vec<Question> {
        Vec::new()
    }

    /// Derive or normalize values after flags and answers are merged
    fn format_options(&self, options: Options) -> Options {
        options
    }

    async fn execute(&self, ctx: &Context, invocation: &Invocation) -> Result<()>;

    /// Files to materialize once `execute` has succeeded
    fn declare_templates(&self, _options: &Options) -> Vec<TemplateJob> {
        Vec::new()
    }
}
