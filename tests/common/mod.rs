//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Builder for a chat-history export page
pub struct ExportBuilder {
    threads: Vec<ThreadBuilder>,
    wrap_page: bool,
}

impl ExportBuilder {
    /// Create a new builder with no threads, wrapped in a full HTML page
    pub fn new() -> Self {
        Self { threads: Vec::new(), wrap_page: true }
    }

    /// Add a thread
    pub fn with_thread(mut self, thread: ThreadBuilder) -> Self {
        self.threads.push(thread);
        self
    }

    /// Emit only the thread markup, without html/head/body around it
    pub fn bare(mut self) -> Self {
        self.wrap_page = false;
        self
    }

    /// Render the export as HTML
    pub fn to_html(&self) -> String {
        let threads = self.threads.iter().map(|t| t.to_html()).collect::<String>();
        if self.wrap_page {
            format!(
                r#"<!DOCTYPE html><html><head><meta charset="UTF-8"><title>Messages</title></head><body><div class="nav"><h1>Messages</h1></div><div class="contents">{}</div></body></html>"#,
                threads
            )
        } else {
            threads
        }
    }

    /// Write the export to a temp file (kept alive by the returned handle)
    pub fn build(&self) -> NamedTempFile {
        write_temp(self.to_html().as_bytes())
    }
}

impl Default for ExportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `div.thread`
pub struct ThreadBuilder {
    participants: String,
    messages: Vec<MessageBuilder>,
}

impl ThreadBuilder {
    /// Create a thread with the given participants line
    pub fn new(participants: &str) -> Self {
        Self { participants: participants.to_string(), messages: Vec::new() }
    }

    /// Add a message; add them newest-first, as the export does
    pub fn with_message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    /// Render as HTML
    pub fn to_html(&self) -> String {
        let messages = self.messages.iter().map(|m| m.to_html()).collect::<String>();
        format!(r#"<div class="thread">{}{}</div>"#, self.participants, messages)
    }
}

/// Where a message's body paragraph is placed
enum BodyPlacement {
    /// `p` follows the `div.message` in thread scope
    Sibling,
    /// `p` sits inside the `div.message`, after the header
    Nested,
    /// No `p` at all
    Missing,
}

/// Builder for one message
pub struct MessageBuilder {
    user: String,
    meta: String,
    body: String,
    placement: BodyPlacement,
}

impl MessageBuilder {
    /// Create a message with default values
    pub fn new() -> Self {
        Self {
            user: "Alice Smith".to_string(),
            meta: "Monday, January 2, 2023 at 3:04pm PST".to_string(),
            body: "Test message".to_string(),
            placement: BodyPlacement::Sibling,
        }
    }

    /// Set the raw user span text
    pub fn user(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    /// Set the raw meta span text
    pub fn meta(mut self, meta: &str) -> Self {
        self.meta = meta.to_string();
        self
    }

    /// Set the paragraph text
    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Put the paragraph inside the message div
    pub fn nested_body(mut self) -> Self {
        self.placement = BodyPlacement::Nested;
        self
    }

    /// Leave the paragraph out
    pub fn without_body(mut self) -> Self {
        self.placement = BodyPlacement::Missing;
        self
    }

    /// Render as HTML
    pub fn to_html(&self) -> String {
        let header = format!(
            r#"<div class="message_header"><span class="user">{}</span><span class="meta">{}</span></div>"#,
            self.user, self.meta
        );
        match self.placement {
            BodyPlacement::Sibling => {
                format!(r#"<div class="message">{}</div><p>{}</p>"#, header, self.body)
            }
            BodyPlacement::Nested => {
                format!(r#"<div class="message">{}<p>{}</p></div>"#, header, self.body)
            }
            BodyPlacement::Missing => format!(r#"<div class="message">{}</div>"#, header),
        }
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write raw bytes to a temp file
pub fn write_temp(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content).expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Path as a CLI argument
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("temp path is UTF-8")
}

/// Helper to create a realistic export with three threads
///
/// - "Alice Smith, Bob Jones": three messages, earliest January 2, 2023
/// - "Carol White, Bob Jones": one message on December 24, 2022
/// - "Alice Smith, Dave Brown": two messages, earliest March 12, 2023
pub fn realistic_export() -> ExportBuilder {
    ExportBuilder::new()
        .with_thread(
            ThreadBuilder::new("Alice Smith, Bob Jones")
                .with_message(
                    MessageBuilder::new()
                        .user("Bob Jones")
                        .meta("Wednesday, January 4, 2023 at 8:00pm PST")
                        .body("See you then"),
                )
                .with_message(
                    MessageBuilder::new()
                        .user("Alice Smith")
                        .meta("Tuesday, January 3, 2023 at 9:15am PST")
                        .body("Lunch tomorrow?"),
                )
                .with_message(
                    MessageBuilder::new()
                        .user("Bob Jones")
                        .meta("Monday, January 2, 2023 at 3:04pm PST")
                        .body("Happy new year"),
                ),
        )
        .with_thread(
            ThreadBuilder::new("Carol White, Bob Jones").with_message(
                MessageBuilder::new()
                    .user("Carol White")
                    .meta("Saturday, December 24, 2022 at 6:30pm PST")
                    .body("Merry Christmas"),
            ),
        )
        .with_thread(
            ThreadBuilder::new("Alice Smith, Dave Brown")
                .with_message(
                    MessageBuilder::new()
                        .user("Dave Brown")
                        .meta("Monday, March 13, 2023 at 10:00am PDT")
                        .body("Got it"),
                )
                .with_message(
                    MessageBuilder::new()
                        .user("Alice Smith")
                        .meta("Sunday, March 12, 2023 at 4:05pm PDT")
                        .body("Sending the photos"),
                ),
        )
}
