//! Typed question descriptors and answer coercion

use crate::options::Value;

/// How an answer is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    Text,
    Integer,
    Boolean,
    /// Pick one entry by typing its 1-based index
    Choice(Vec<String>),
}

/// One interactive question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Answer key
    pub name: String,
    pub title: String,
    pub kind: QuestionKind,
    pub default: Option<Value>,
    pub required: bool,
    /// Drop the question when the options already carry a value for `name`
    pub skip_if_preset: bool,
}

impl Question {
    fn new(name: &str, title: &str, kind: QuestionKind) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            kind,
            default: None,
            required: true,
            skip_if_preset: false,
        }
    }

    pub fn text(name: &str, title: &str) -> Self {
        Self::new(name, title, QuestionKind::Text)
    }

    pub fn integer(name: &str, title: &str) -> Self {
        Self::new(name, title, QuestionKind::Integer)
    }

    pub fn boolean(name: &str, title: &str) -> Self {
        Self::new(name, title, QuestionKind::Boolean)
    }

    pub fn choice<S: Into<String>>(
        name: &str,
        title: &str,
        choices: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            title,
            QuestionKind::Choice(choices.into_iter().map(Into::into).collect()),
        )
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn skip_if_preset(mut self) -> Self {
        self.skip_if_preset = true;
        self
    }

    /// Prompt text: title, `(y/n)` or a numbered list, then the bracketed default
    pub fn render_title(&self) -> String {
        let mut title = self.title.clone();
        match &self.kind {
            QuestionKind::Boolean => title.push_str(" (y/n)"),
            QuestionKind::Choice(choices) => {
                title.push('\n');
                for (index, choice) in choices.iter().enumerate() {
                    title.push_str(&format!("{}. {}\n", index + 1, choice));
                }
            }
            QuestionKind::Text | QuestionKind::Integer => {}
        }

        let default = self
            .default
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        if !title.ends_with('\n') {
            title.push(' ');
        }
        title.push_str(&format!("[{}]:", default));
        title
    }

    /// Coerce one line of input; `None` means the question must be asked again
    pub fn coerce(&self, input: &str) -> Option<Value> {
        let input = input.trim();

        let value = if input.is_empty() {
            match (&self.default, &self.kind) {
                (Some(default), _) => default.clone(),
                (None, QuestionKind::Boolean) => Value::Bool(false),
                (None, _) => Value::Null,
            }
        } else {
            match &self.kind {
                QuestionKind::Text => Value::Text(input.to_string()),
                QuestionKind::Integer => Value::Int(input.parse().ok()?),
                QuestionKind::Boolean => {
                    Value::Bool(matches!(input.to_lowercase().as_str(), "1" | "y"))
                }
                QuestionKind::Choice(choices) => {
                    if !input.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    let index: usize = input.parse().ok()?;
                    if index == 0 || index > choices.len() {
                        return None;
                    }
                    Value::Text(choices[index - 1].clone())
                }
            }
        };

        if self.required && value == Value::Null {
            return None;
        }
        Some(value)
    }
}
