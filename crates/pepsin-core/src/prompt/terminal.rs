//! Inline terminal prompts using cliclack

use super::engine::LineReader;
use std::io;

/// Interactive reader for an attended terminal
#[derive(Debug, Default)]
pub struct TerminalReader;

impl LineReader for TerminalReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        // Empty answers must reach the engine so defaults can apply
        cliclack::input(prompt).required(false).interact::<String>()
    }

    fn intro(&mut self, title: &str) -> io::Result<()> {
        cliclack::intro(title)
    }

    fn outro(&mut self, message: &str) -> io::Result<()> {
        cliclack::outro(message)
    }
}
