// completion.rs

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

use crate::parser::COMMAND_WORDS;
use crate::token::Operation;

/// Tab completion for command words and operation names.
pub struct WordCompleter {
    words: Vec<&'static str>,
}

impl WordCompleter {
    pub fn new() -> Self {
        let mut words: Vec<&'static str> = COMMAND_WORDS.to_vec();
        words.extend(Operation::ALL.iter().map(|op| op.name()));
        words.sort_unstable();
        words.dedup();
        Self { words }
    }

    fn matches(&self, prefix: &str) -> Vec<&'static str> {
        let prefix = prefix.to_ascii_lowercase();
        self.words
            .iter()
            .copied()
            .filter(|w| w.starts_with(&prefix))
            .collect()
    }
}

impl Default for WordCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for WordCompleter {
    type Candidate = Pair;
    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let head = &line[..pos];
        let start = head
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_alphabetic())
            .last()
            .map(|(i, _)| i)
            .unwrap_or(pos);
        let prefix = &head[start..];
        if prefix.is_empty() {
            return Ok((pos, Vec::new()));
        }
        let completions = self
            .matches(prefix)
            .into_iter()
            .map(|w| Pair {
                display: w.to_string(),
                replacement: format!("{} ", w),
            })
            .collect();
        Ok((start, completions))
    }
}

impl Hinter for WordCompleter {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for WordCompleter {}

impl Validator for WordCompleter {
    fn validate(&self, _ctx: &mut ValidationContext) -> Result<ValidationResult, ReadlineError> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for WordCompleter {}
