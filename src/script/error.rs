use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised while parsing or running a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ExecError {
    #[error("SyntaxError: {0}")]
    Syntax(String),
    /// An exception that escaped the snippet, e.g. `ZeroDivisionError`.
    #[error("{kind}{}", detail(.message))]
    Raised { kind: String, message: String },
}

fn detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

pub type ExecResult<T> = Result<T, ExecError>;
