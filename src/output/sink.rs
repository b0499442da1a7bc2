use std::io::{self, Write};

use super::text::write_message_line;
use crate::models::{Message, Thread};

/// Receives records from the parser as they are completed
pub trait RecordSink {
    /// Called once per finalized message, before it is appended to `thread`
    fn message(&mut self, thread: &Thread, message: &Message) -> io::Result<()>;

    /// Called once per finalized matching thread, handing over ownership
    fn thread(&mut self, thread: Thread) -> io::Result<()>;
}

/// Collects every matching thread in document order
#[derive(Debug, Default)]
pub struct BufferingSink {
    threads: Vec<Thread>,
}

impl BufferingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn into_threads(self) -> Vec<Thread> {
        self.threads
    }
}

impl RecordSink for BufferingSink {
    fn message(&mut self, _thread: &Thread, _message: &Message) -> io::Result<()> {
        Ok(())
    }

    fn thread(&mut self, thread: Thread) -> io::Result<()> {
        self.threads.push(thread);
        Ok(())
    }
}

/// Writes one line per message as soon as it is finalized
pub struct StreamingSink<W: Write> {
    out: W,
    messages: usize,
    threads: usize,
}

impl<W: Write> StreamingSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, messages: 0, threads: 0 }
    }

    /// Messages written so far
    pub fn messages(&self) -> usize {
        self.messages
    }

    /// Matching threads closed so far
    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for StreamingSink<W> {
    fn message(&mut self, _thread: &Thread, message: &Message) -> io::Result<()> {
        write_message_line(&mut self.out, message)?;
        self.messages += 1;
        Ok(())
    }

    fn thread(&mut self, _thread: Thread) -> io::Result<()> {
        self.threads += 1;
        self.out.flush()
    }
}
