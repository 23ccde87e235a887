//! Domain errors raised by commands, the registry and the collaborators they drive
//!
//! Plumbing failures (I/O, YAML, HTTP) travel as `anyhow::Error` with context.
//! The named conditions below are wrapped into `anyhow::Error` too, and are
//! recovered with [`PepsinError::find`] at the boundary that owns them.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code used when an error does not carry its own
pub const DEFAULT_EXIT_CODE: i32 = 1;

#[derive(Debug, Error)]
pub enum PepsinError {
    /// A user-facing condition raised by command business logic
    #[error("{message}")]
    InvalidCommand { message: String, exit_code: i32 },

    #[error("`{name}` Command not available")]
    CommandNotFound { name: String },

    #[error("Template {} does not exist", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("{} is not a valid config mapping: {reason}", path.display())]
    MalformedConfig { path: PathBuf, reason: String },

    #[error("{program} exited with {}", exit_code.map(|c| format!("status {}", c)).unwrap_or_else(|| "a signal".to_string()))]
    ProcessExecution {
        program: String,
        exit_code: Option<i32>,
    },

    /// Two registry entries claim the same command name or alias
    #[error("command name `{name}` is registered more than once")]
    DuplicateCommand { name: String },
}

impl PepsinError {
    /// Build an `InvalidCommand` error with the default exit code
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidCommand {
            message: message.into(),
            exit_code: DEFAULT_EXIT_CODE,
        }
    }

    /// Label printed in front of the message on the error stream
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCommand { .. } => "InvalidCommandError",
            Self::CommandNotFound { .. } => "CommandNotFoundError",
            Self::TemplateNotFound { .. } => "TemplateNotFoundError",
            Self::MalformedConfig { .. } => "MalformedConfigError",
            Self::ProcessExecution { .. } => "ProcessExecutionError",
            Self::DuplicateCommand { .. } => "DuplicateCommandError",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidCommand { exit_code, .. } => *exit_code,
            Self::ProcessExecution {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => DEFAULT_EXIT_CODE,
        }
    }

    /// `"<ErrorKind>: <message>"`
    pub fn render(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }

    /// Find a domain error anywhere in an `anyhow` chain
    pub fn find(err: &anyhow::Error) -> Option<&PepsinError> {
        err.chain().find_map(|cause| cause.downcast_ref::<PepsinError>())
    }
}
