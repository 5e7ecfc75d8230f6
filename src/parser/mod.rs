//! Parser module - state table record decoding and token normalization

pub mod field;
pub mod normalize;
pub mod record;

// Re-export key types
pub use field::extract_field;
pub use normalize::{Token, normalize};
pub use record::{StateKind, StateNumber, StateRecord, decode};

use crate::Result;

/// Raw input for one state: a record string or a token list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Record(String),
    Tokens(Vec<Token>),
}

impl Input {
    /// Interpret a text line as a record or a token list.
    ///
    /// A full-length word starting with a state number is a record, even
    /// when its type is `,`. Otherwise several words make a token list.
    pub fn from_line(line: &str) -> Self {
        let line = line.trim();
        if is_record_shaped(line) {
            return Input::Record(line.to_string());
        }

        let tokens = Token::split_line(line);
        if tokens.len() > 1 {
            Input::Tokens(tokens)
        } else {
            Input::Record(line.to_string())
        }
    }

    /// Decode the input, normalizing token lists first
    pub fn decode(&self) -> Result<StateRecord> {
        match self {
            Input::Record(record) => decode(record),
            Input::Tokens(tokens) => decode(&normalize(tokens)?),
        }
    }
}

fn is_record_shaped(line: &str) -> bool {
    line.chars().count() == field::RECORD_LEN
        && !line.chars().any(char::is_whitespace)
        && field::extract_number(line)
            .bytes()
            .all(|b| b.is_ascii_digit())
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Input::Record(value.to_string())
    }
}

impl From<Vec<Token>> for Input {
    fn from(value: Vec<Token>) -> Self {
        Input::Tokens(value)
    }
}
