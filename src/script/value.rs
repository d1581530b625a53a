use std::fmt;

use serde::{Deserialize, Serialize};

/// A captured result, detached from the interpreter that produced it.
///
/// Integers that fit in 64 bits and strings keep their value; anything else
/// (floats, bools, containers, big integers) is carried as its `str()` text.
/// `Display` always matches Python's `str()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Int(i64),
    Str(String),
    Object { type_name: String, text: String },
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::Object { text, .. } => f.write_str(text),
        }
    }
}
