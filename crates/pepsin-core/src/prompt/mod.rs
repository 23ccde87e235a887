//! Interactive questions asked before a command runs
//!
//! The terminal reader is only available when the `tui` feature is enabled;
//! `StdinReader` and `ScriptedReader` work everywhere.

mod engine;
mod question;

#[cfg(feature = "tui")]
mod terminal;

pub use engine::{AnswerSet, LineReader, PromptEngine, ScriptedReader, StdinReader};
pub use question::{Question, QuestionKind};

#[cfg(feature = "tui")]
pub use terminal::TerminalReader;
