//! Where finished records go.
//!
//! The state machine reports every finalized message and thread to a
//! [`RecordSink`]. Two sinks cover the two output contracts:
//!
//! - [`BufferingSink`] keeps whole threads so they can be sorted by date and
//!   printed oldest-first by [`write_transcript`] or [`write_json`]
//! - [`StreamingSink`] prints each message the moment it is finalized, in
//!   document order, without holding anything

pub mod json;
pub mod sink;
pub mod text;

pub use json::write_json;
pub use sink::{BufferingSink, RecordSink, StreamingSink};
pub use text::{sort_by_date, write_message_line, write_thread, write_transcript};
