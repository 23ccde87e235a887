//! Ordered question queue and the answers it collects

use super::question::Question;
use crate::options::{Options, Value};
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Source of answer lines for the prompt engine
pub trait LineReader {
    /// Show `prompt` and block until one line of input is available
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Banner shown before a prompt session starts
    fn intro(&mut self, _title: &str) -> io::Result<()> {
        Ok(())
    }

    /// Closing line after a prompt session
    fn outro(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Plain line reader over stdin, for piped or non-terminal input
pub struct StdinReader;

impl LineReader for StdinReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn intro(&mut self, title: &str) -> io::Result<()> {
        println!("{}\n{}", title, "-".repeat(10));
        Ok(())
    }
}

/// Replays canned answers, recording every prompt it was shown
#[derive(Debug, Default)]
pub struct ScriptedReader {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedReader {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left"))
    }
}

/// Answers collected during one engine's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    values: Options,
}

impl AnswerSet {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

/// Asks queued questions in order; answers accumulate across runs
#[derive(Debug, Default)]
pub struct PromptEngine {
    preset: Options,
    queue: VecDeque<Question>,
    answers: AnswerSet,
}

impl PromptEngine {
    /// `preset` holds already-parsed flag values consulted for skips
    pub fn new(preset: Options) -> Self {
        Self {
            preset,
            ..Default::default()
        }
    }

    pub fn add_question(&mut self, question: Question) {
        if question.skip_if_preset && self.preset.is_set(&question.name) {
            debug!(question = %question.name, "answered by flag, skipping");
            return;
        }
        self.queue.push_back(question);
    }

    pub fn add_questions(&mut self, questions: impl IntoIterator<Item = Question>) {
        for question in questions {
            self.add_question(question);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Ask every queued question, re-asking until each coerces
    pub fn run(&mut self, reader: &mut dyn LineReader) -> Result<&AnswerSet> {
        while let Some(question) = self.queue.pop_front() {
            let title = question.render_title();
            let value = loop {
                let line = reader
                    .read_line(&title)
                    .with_context(|| format!("Failed to read answer for {}", question.name))?;
                if let Some(value) = question.coerce(&line) {
                    break value;
                }
                debug!(question = %question.name, input = %line, "rejected answer");
            };
            self.answers.values.insert(question.name, value);
        }
        Ok(&self.answers)
    }
}
