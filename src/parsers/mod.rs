//! Streaming parser for chat-history HTML exports
//!
//! # Pipeline
//!
//! bytes → [`tokenizer::TokenStream`] → [`thread::ThreadParser`] → [`crate::output::RecordSink`]
//!
//! - [`tokenizer`] lexes the export incrementally with html5ever's tokenizer and
//!   hands out one [`tokenizer::Token`] at a time; the document tree is never built
//! - [`thread`] is the state machine that recognizes the export schema by tag
//!   name and class attribute and rebuilds threads and messages
//! - [`timestamps`] parses the export's single human-readable date layout
//!
//! # Error Handling Strategy
//!
//! Unlike a best-effort scraper, this parser is **strict**: the export follows
//! one fixed schema, so any deviation is reported as a [`ParseError`] and the
//! whole parse stops. There is no skip-and-continue. The only lenient case is
//! running out of input mid-thread, which ends the parse normally.
//!
//! Errors are a typed `thiserror` enum so library callers can match on the
//! kind; the binary wraps them in `anyhow` with context.

pub mod error;
pub mod thread;
pub mod timestamps;
pub mod tokenizer;

pub use error::ParseError;
pub use thread::{State, ThreadParser, filter_threads, parse_export};
pub use timestamps::parse_timestamp;
pub use tokenizer::{Token, TokenStream, has_attribute};
