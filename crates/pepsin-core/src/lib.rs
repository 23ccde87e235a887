//! Pepsin Core - project-aware wrapper around pip and virtualenv
//!
//! The library holds everything the `pepsin` binary does:
//!
//! - **Config store** - `pepsin.yaml` read-modify-write with library merging
//! - **Environment gateway** - environment provisioning and subprocess delegation
//! - **Prompt engine** - typed questions answered line by line
//! - **Commands** - one contract, one generic driver, a static registry
//! - **Templates** - skip-on-exists file materialization
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-backed terminal prompt reader
//!
//! # Example Usage
//!
//! ```ignore
//! use pepsin_core::{cli, prompt::StdinReader, Context};
//!
//! let ctx = Context::from_env()?;
//! let argv: Vec<String> = std::env::args().collect();
//! let code = cli::execute(&argv, &ctx, &mut StdinReader).await?;
//! ```

pub mod cli;
pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod options;
pub mod prompt;
pub mod runtime;
pub mod settings;
pub mod templates;

// Re-export main types for convenience
pub use command::{BuiltinCommand, Command, CommandDescriptor, Invocation, Registry};
pub use config::{ConfigStore, ConfigUpdate, ProjectConfig};
pub use error::PepsinError;
pub use options::{Options, Value};
pub use runtime::{EnvironmentGateway, EnvironmentHandle, InstallationResult, Platform};
pub use settings::{Context, Settings};
pub use templates::{Materializer, TemplateJob, TemplateSource};

/// CLI version, shown by `--version` and the help banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
