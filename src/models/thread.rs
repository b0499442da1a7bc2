use serde::Serialize;

use super::Timestamp;

/// One authored entry within a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// First whitespace-delimited word of the sender line
    pub sender: String,
    /// `None` until the header's meta span has been parsed
    pub timestamp: Option<Timestamp>,
    /// Paragraph text with line breaks flattened to spaces
    pub body: String,
}

impl Message {
    pub fn new() -> Self {
        Self { sender: String::new(), timestamp: None, body: String::new() }
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

/// A conversation whose participants line matched the configured person
///
/// Messages are kept in document order, which the export writes newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    pub participants: String,
    /// Earliest message timestamp seen so far, or the time the thread was opened
    pub date: Timestamp,
    pub messages: Vec<Message>,
}

impl Thread {
    pub fn new(participants: impl Into<String>) -> Self {
        Self::opened_at(participants, Timestamp::now())
    }

    pub fn opened_at(participants: impl Into<String>, date: Timestamp) -> Self {
        Self { participants: participants.into(), date, messages: Vec::new() }
    }

    /// Lower the representative date to `timestamp` if it is earlier
    pub fn observe(&mut self, timestamp: &Timestamp) {
        if timestamp.is_before(&self.date) {
            self.date = timestamp.clone();
        }
    }

    /// Messages oldest-first, the reverse of document order
    pub fn chronological(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().rev()
    }
}
