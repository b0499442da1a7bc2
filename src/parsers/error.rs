use std::io;

use thiserror::Error;

use super::thread::State;
use super::tokenizer::Token;

/// Fatal errors raised while turning an export into threads
///
/// None of these are recoverable: the state machine has no resynchronization
/// strategy, so the first error aborts the whole parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The byte stream could not be lexed (invalid UTF-8, truncated sequence)
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("failed to read input")]
    Read(#[source] io::Error),

    /// A token the grammar does not allow in the current state
    #[error("line {line}: {state}: unexpected {token}")]
    UnexpectedToken { state: State, token: Token, line: u64 },

    #[error("invalid date {text:?}: {reason}")]
    DateFormat { text: String, reason: String },

    #[error("failed to write output")]
    Output(#[source] io::Error),
}
