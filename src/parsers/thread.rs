//! State machine that rebuilds threads from the export's token stream.
//!
//! The export nests one conversation per `div.thread`:
//!
//! ```text
//! div.thread
//!   text                       participants line
//!   div.message                repeated, newest first
//!     div.message_header
//!       span.user              sender
//!       span.meta              timestamp
//!     p                        body, when nested in the message
//!   p                          body of the preceding message
//! ```
//!
//! Only one thread and one message can be open at a time, so the parser keeps
//! them as plain `Option`s instead of a stack. Threads whose participants line
//! does not contain the configured person are never built; everything up to
//! the next `div.thread` is skipped.
//!
//! Any token the grammar does not allow in the current state aborts the parse
//! with [`ParseError::UnexpectedToken`]. Running out of input in any state ends
//! the parse cleanly, flushing whatever thread was open.

use std::fmt;
use std::io::Read;

use log::{debug, trace};

use super::error::ParseError;
use super::timestamps::parse_timestamp;
use super::tokenizer::{Token, TokenStream, has_attribute};
use crate::models::{Message, Thread};
use crate::output::{BufferingSink, RecordSink};

const CLASS: &str = "class";
const CLASS_THREAD: &str = "thread";
const CLASS_MESSAGE: &str = "message";
const CLASS_MESSAGE_HEADER: &str = "message_header";
const CLASS_USER: &str = "user";
const CLASS_META: &str = "meta";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Between threads
    Init,
    /// Inside `div.thread`, waiting for the participants line
    ThreadHeader,
    /// Inside a matching thread
    Thread,
    Message,
    MessageHeader,
    User,
    Meta,
    /// Inside a `p` body written directly in thread scope
    MessageParagraph,
    /// Inside a `p` body nested in its `div.message`
    MessageBody,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Init => "init",
            State::ThreadHeader => "thread header",
            State::Thread => "thread",
            State::Message => "message",
            State::MessageHeader => "message header",
            State::User => "user",
            State::Meta => "meta",
            State::MessageParagraph => "message paragraph",
            State::MessageBody => "message body",
        };
        f.write_str(name)
    }
}

fn is_start_with_class(token: &Token, tag: &str, class: &str) -> bool {
    token.is_start(tag) && has_attribute(token, CLASS, class)
}

/// Sender is the first word of the user span
fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// Each CR and LF inside a body becomes one space
fn flatten_body(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Parser context: current state plus the thread and message being built
pub struct ThreadParser {
    person: String,
    state: State,
    thread: Option<Thread>,
    message: Option<Message>,
}

impl ThreadParser {
    /// Parser that keeps threads whose participants line contains `person`
    ///
    /// Matching is a case-sensitive substring test, so an empty `person`
    /// keeps every thread.
    pub fn new(person: impl Into<String>) -> Self {
        Self { person: person.into(), state: State::Init, thread: None, message: None }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Advance the machine by one token
    ///
    /// `line` is only used to locate errors.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedToken`] for a token the current state
    /// does not accept, [`ParseError::DateFormat`] for an unparseable meta
    /// span, and [`ParseError::Output`] if the sink fails.
    pub fn feed<S: RecordSink>(
        &mut self,
        token: Token,
        line: u64,
        sink: &mut S,
    ) -> Result<(), ParseError> {
        let state = self.state;
        let next = match (state, &token) {
            (_, Token::EndOfStream) => {
                self.finish(sink)?;
                return Ok(());
            }

            (State::Init, t) if is_start_with_class(t, "div", CLASS_THREAD) => {
                debug!("{}: begin thread", state);
                State::ThreadHeader
            }
            (State::Init, t) => {
                trace!("{}: skipping {}", state, t);
                State::Init
            }

            (State::ThreadHeader, Token::EndTag(_)) => {
                debug!("{}: end thread without participants", state);
                State::Init
            }
            (State::ThreadHeader, Token::Text(participants)) => {
                if participants.contains(self.person.as_str()) {
                    debug!("{}: keeping thread {:?}", state, participants);
                    self.thread = Some(Thread::new(participants.as_str()));
                    State::Thread
                } else {
                    debug!("{}: skipping thread {:?}", state, participants);
                    State::Init
                }
            }

            (State::Thread, Token::EndTag(_)) => {
                debug!("{}: end thread", state);
                self.close_thread(sink)?;
                State::Init
            }
            (State::Thread, t) if is_start_with_class(t, "div", CLASS_MESSAGE) => {
                debug!("{}: begin message", state);
                self.close_message(sink)?;
                self.message = Some(Message::new());
                State::Message
            }
            (State::Thread, t) if t.is_start("p") => {
                debug!("{}: begin message paragraph", state);
                self.message.get_or_insert_with(Message::new);
                State::MessageParagraph
            }

            (State::Message, Token::EndTag(_)) => {
                debug!("{}: end message", state);
                State::Thread
            }
            (State::Message, t) if is_start_with_class(t, "div", CLASS_MESSAGE_HEADER) => {
                debug!("{}: begin message header", state);
                let message = self.open_message();
                message.sender.clear();
                message.timestamp = None;
                State::MessageHeader
            }
            (State::Message, t) if t.is_start("p") => {
                debug!("{}: begin message body", state);
                State::MessageBody
            }

            (State::MessageHeader, Token::EndTag(_)) => {
                debug!("{}: end message header", state);
                State::Message
            }
            (State::MessageHeader, t) if is_start_with_class(t, "span", CLASS_USER) => {
                debug!("{}: begin user", state);
                State::User
            }
            (State::MessageHeader, t) if is_start_with_class(t, "span", CLASS_META) => {
                debug!("{}: begin meta", state);
                State::Meta
            }

            (State::User, Token::EndTag(_)) => State::MessageHeader,
            (State::User, Token::Text(text)) => {
                let sender = first_word(text).to_string();
                debug!("{}: sender {:?}", state, sender);
                self.open_message().sender = sender;
                State::User
            }

            (State::Meta, Token::EndTag(_)) => State::MessageHeader,
            (State::Meta, Token::Text(text)) => {
                let timestamp = parse_timestamp(text)?;
                debug!("{}: date {}", state, timestamp);
                if let Some(thread) = self.thread.as_mut() {
                    thread.observe(&timestamp);
                }
                self.open_message().timestamp = Some(timestamp);
                State::Meta
            }

            (State::MessageParagraph, Token::EndTag(_)) => {
                debug!("{}: end message paragraph", state);
                self.close_message(sink)?;
                State::Thread
            }
            (State::MessageBody, Token::EndTag(_)) => {
                debug!("{}: end message body", state);
                self.close_message(sink)?;
                State::Message
            }
            (State::MessageParagraph | State::MessageBody, Token::Text(text)) => {
                let body = flatten_body(text);
                trace!("{}: body {:?}", state, body);
                self.open_message().body = body;
                state
            }

            _ => {
                return Err(ParseError::UnexpectedToken { state, token: token.clone(), line });
            }
        };
        self.state = next;
        Ok(())
    }

    /// Flush the open message and thread at end of input
    ///
    /// Ending mid-thread is not an error: the thread already matched, so it is
    /// handed to the sink with whatever messages it has.
    pub fn finish<S: RecordSink>(&mut self, sink: &mut S) -> Result<(), ParseError> {
        if self.state != State::Init {
            debug!("{}: input ended inside a thread", self.state);
        }
        self.close_thread(sink)?;
        self.state = State::Init;
        Ok(())
    }

    fn open_message(&mut self) -> &mut Message {
        self.message.get_or_insert_with(Message::new)
    }

    fn close_message<S: RecordSink>(&mut self, sink: &mut S) -> Result<(), ParseError> {
        let (Some(thread), Some(message)) = (self.thread.as_mut(), self.message.take()) else {
            return Ok(());
        };
        sink.message(thread, &message).map_err(ParseError::Output)?;
        thread.messages.push(message);
        Ok(())
    }

    fn close_thread<S: RecordSink>(&mut self, sink: &mut S) -> Result<(), ParseError> {
        self.close_message(sink)?;
        if let Some(thread) = self.thread.take() {
            debug!("closing thread {:?} with {} messages", thread.participants, thread.messages.len());
            sink.thread(thread).map_err(ParseError::Output)?;
        }
        Ok(())
    }
}

/// Parse an export, handing matching threads and their messages to `sink`
///
/// # Errors
///
/// Fails on the first malformed byte sequence, structural mismatch, or bad
/// timestamp; nothing after that point is parsed.
pub fn parse_export<R: Read, S: RecordSink>(
    reader: R,
    person: &str,
    sink: &mut S,
) -> Result<(), ParseError> {
    let mut tokens = TokenStream::new(reader);
    let mut parser = ThreadParser::new(person);

    loop {
        let token = tokens.next_token()?;
        let done = token == Token::EndOfStream;
        parser.feed(token, tokens.line(), sink)?;
        if done {
            trace!("end of stream at depth {}", tokens.depth());
            return Ok(());
        }
    }
}

/// Parse an export and return the matching threads in document order
///
/// # Examples
///
/// ```
/// use chat_thread_filter::filter_threads;
///
/// let html = r#"<div class="thread">Alice, Bob<div class="message"><div class="message_header"><span class="user">Alice Smith</span><span class="meta">Monday, January 2, 2023 at 3:04pm PST</span></div></div><p>Hi</p></div>"#;
/// let threads = filter_threads(html.as_bytes(), "Alice")?;
/// assert_eq!(threads[0].messages[0].sender, "Alice");
/// # Ok::<(), chat_thread_filter::ParseError>(())
/// ```
pub fn filter_threads<R: Read>(reader: R, person: &str) -> Result<Vec<Thread>, ParseError> {
    let mut sink = BufferingSink::new();
    parse_export(reader, person, &mut sink)?;
    Ok(sink.into_threads())
}
