//! Data models for extracted chat threads.
//!
//! - [`Thread`] - One conversation whose participants line matched the configured person
//! - [`Message`] - One authored entry inside a thread
//! - [`Timestamp`] - A parsed export timestamp (instant plus zone abbreviation)
//!
//! Records are built incrementally by the state machine in
//! [`crate::parsers::thread`] and serialized by the presenters in [`crate::output`].

pub mod thread;
pub mod timestamp;

pub use thread::{Message, Thread};
pub use timestamp::Timestamp;
