// error.rs

use thiserror::Error;

/// Shown for every failure that is not reported by the evaluator itself.
pub const NETWORK_ERROR: &str = "Network Error";

#[derive(Debug, Error)]
pub enum EvalError {
    /// The evaluator answered with an `error` field.
    #[error("{0}")]
    Collaborator(String),
    /// The evaluator could not be reached or its reply could not be decoded.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl EvalError {
    /// Message for the display surface.
    pub fn user_message(&self) -> &str {
        match self {
            EvalError::Collaborator(message) => message,
            EvalError::Transport(_) => NETWORK_ERROR,
        }
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        EvalError::Transport(err.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown operation `{0}`")]
pub struct UnknownOperation(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unknown word `{0}`")]
    UnknownWord(String),
    #[error("`recall` needs a history index")]
    MissingIndex,
    #[error("history index {0} is too large")]
    IndexTooLarge(String),
}
