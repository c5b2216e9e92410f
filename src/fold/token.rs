//! Raw tokens as handed over by an external tokenizer
//!
//!     A raw token is a labeled chunk of text: `data` holds the text and `value` holds the kind
//!     label the tokenizer assigned to it. Tokenizers are outside this crate; anything that can
//!     be iterated as `RawToken`s is a valid token stream, including a JSON array decoded with
//!     [from_json].

use serde::{Deserialize, Serialize};

/// A labeled unit produced by a tokenizer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    /// Raw text of the token
    #[serde(default)]
    pub data: String,
    /// Kind label of the token
    #[serde(default)]
    pub value: String,
}

impl RawToken {
    pub fn new(value: impl Into<String>, data: impl Into<String>) -> Self {
        RawToken {
            data: data.into(),
            value: value.into(),
        }
    }

    /// True when the token carries no text
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Decode a token stream from a JSON array of `{ "value": .., "data": .. }` objects
pub fn from_json(source: &str) -> crate::fold::Result<Vec<RawToken>> {
    Ok(serde_json::from_str(source)?)
}
