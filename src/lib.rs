//! Chat Thread Filter - Pull one person's conversations out of a chat-history export
//!
//! This library reads the HTML page a messaging service produces when you export
//! your chat history, and rebuilds the conversations from it. It supports:
//!
//! - Streaming the export through an HTML tokenizer without building a document tree
//! - Recognizing threads, messages, senders, timestamps and bodies by tag and class
//! - Keeping only threads whose participants line mentions a given person
//! - Printing threads by date with messages oldest-first, or streaming messages as parsed
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use chat_thread_filter::{filter_threads, output::write_transcript};
//!
//! let export = File::open("messages.htm")?;
//! let threads = filter_threads(export, "Alice")?;
//! write_transcript(&mut std::io::stdout(), &threads)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod models;
pub mod output;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use models::{Message, Thread, Timestamp};
pub use output::{BufferingSink, RecordSink, StreamingSink};
pub use parsers::{ParseError, filter_threads, parse_export};
