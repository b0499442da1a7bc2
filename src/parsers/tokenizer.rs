//! Pull-style HTML token stream over any byte reader.
//!
//! Wraps the `html5ever` tokenizer (without its tree builder) so the export is
//! lexed chunk by chunk and never held as a document. The tokenizer pushes
//! tokens into a queue; [`TokenStream::next_token`] pops them one at a time and
//! reads more input only when the queue runs dry.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::io::{ErrorKind, Read};

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token as HtmlToken, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};
use html5ever::TokenizerResult;
use log::trace;

use super::error::ParseError;

const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Character reference fed in place of a raw CR found in text
const CARRIAGE_RETURN_REF: &str = "&#13;";

/// Longest text excerpt shown when a token is displayed in an error
const TEXT_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// Tag name (lowercased by the tokenizer) and attributes in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

/// One lexical event handed to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag(Tag),
    EndTag(Tag),
    /// A full run of character data between two tags
    Text(String),
    EndOfStream,
}

impl Token {
    /// True for a start tag with the given name
    pub fn is_start(&self, name: &str) -> bool {
        matches!(self, Token::StartTag(tag) if tag.name == name)
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Token::StartTag(tag) | Token::EndTag(tag) => &tag.attributes,
            Token::Text(_) | Token::EndOfStream => &[],
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StartTag(tag) => {
                write!(f, "<{}", tag.name)?;
                for attr in &tag.attributes {
                    write!(f, " {}=\"{}\"", attr.key, attr.value)?;
                }
                write!(f, ">")
            }
            Token::EndTag(tag) => write!(f, "</{}>", tag.name),
            Token::Text(text) => {
                let preview: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
                if preview.len() < text.len() {
                    write!(f, "text {:?}...", preview)
                } else {
                    write!(f, "text {:?}", preview)
                }
            }
            Token::EndOfStream => write!(f, "end of stream"),
        }
    }
}

/// Does `token` carry an attribute `key="value"`?
///
/// An empty `key` or `value` means "no constraint" and always matches.
pub fn has_attribute(token: &Token, key: &str, value: &str) -> bool {
    if key.is_empty() || value.is_empty() {
        return true;
    }
    token.attributes().iter().any(|attr| attr.key == key && attr.value == value)
}

#[derive(Debug)]
struct Lexed {
    token: Token,
    line: u64,
}

/// Sink the html5ever tokenizer pushes into
#[derive(Default)]
struct TokenQueue {
    tokens: RefCell<VecDeque<Lexed>>,
}

impl TokenSink for TokenQueue {
    type Handle = ();

    fn process_token(&self, token: HtmlToken, line_number: u64) -> TokenSinkResult<()> {
        let mut tokens = self.tokens.borrow_mut();
        match token {
            HtmlToken::TagToken(tag) => {
                let converted = Tag {
                    name: String::from(&*tag.name),
                    attributes: tag
                        .attrs
                        .iter()
                        .map(|attr| Attribute {
                            key: String::from(&*attr.name.local),
                            value: String::from(&*attr.value),
                        })
                        .collect(),
                };
                let token = match tag.kind {
                    TagKind::StartTag => Token::StartTag(converted),
                    TagKind::EndTag => Token::EndTag(converted),
                };
                tokens.push_back(Lexed { token, line: line_number });
            }
            HtmlToken::CharacterTokens(text) => match tokens.back_mut() {
                Some(Lexed { token: Token::Text(run), .. }) => run.push_str(&text),
                _ => tokens.push_back(Lexed {
                    token: Token::Text(String::from(&*text)),
                    line: line_number,
                }),
            },
            HtmlToken::ParseError(reason) => {
                trace!("line {}: tokenizer notice: {}", line_number, reason);
            }
            other => {
                trace!("line {}: skipping {:?}", line_number, other);
            }
        }
        TokenSinkResult::Continue
    }
}

/// Streams [`Token`]s out of a reader
pub struct TokenStream<R> {
    reader: R,
    tokenizer: Tokenizer<TokenQueue>,
    input: BufferQueue,
    /// Bytes read but not yet decoded (an incomplete UTF-8 sequence)
    undecoded: Vec<u8>,
    consumed: usize,
    /// Whether the last decoded chunk ended between `<` and `>`
    in_markup: bool,
    exhausted: bool,
    depth: i64,
    line: u64,
}

impl<R: Read> TokenStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tokenizer: Tokenizer::new(TokenQueue::default(), TokenizerOpts::default()),
            input: BufferQueue::default(),
            undecoded: Vec::new(),
            consumed: 0,
            in_markup: false,
            exhausted: false,
            depth: 0,
            line: 1,
        }
    }

    /// Start tags seen minus end tags seen; diagnostic only
    pub fn depth(&self) -> i64 {
        self.depth
    }

    /// Source line of the most recently returned token
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Next token, or [`Token::EndOfStream`] once input is exhausted
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Read`] when the reader fails and
    /// [`ParseError::MalformedInput`] when the bytes are not valid UTF-8.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            if let Some(lexed) = self.pop_ready() {
                match lexed.token {
                    Token::StartTag(_) => self.depth += 1,
                    Token::EndTag(_) => self.depth -= 1,
                    _ => {}
                }
                self.line = lexed.line;
                return Ok(lexed.token);
            }
            if self.exhausted {
                return Ok(Token::EndOfStream);
            }
            self.fill()?;
        }
    }

    fn pop_ready(&self) -> Option<Lexed> {
        let mut tokens = self.tokenizer.sink.tokens.borrow_mut();
        // A trailing text run may still grow with the next chunk
        let ready = match tokens.len() {
            0 => false,
            1 => self.exhausted || !matches!(tokens[0].token, Token::Text(_)),
            _ => true,
        };
        if ready { tokens.pop_front() } else { None }
    }

    fn fill(&mut self) -> Result<(), ParseError> {
        let mut chunk = [0u8; READ_CHUNK_BYTES];
        let read = loop {
            match self.reader.read(&mut chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ParseError::Read(e)),
            }
        };

        if read == 0 {
            if !self.undecoded.is_empty() {
                return Err(ParseError::MalformedInput(format!(
                    "input ends inside a UTF-8 sequence at byte {}",
                    self.consumed
                )));
            }
            self.tokenizer.end();
            self.exhausted = true;
            return Ok(());
        }

        self.undecoded.extend_from_slice(&chunk[..read]);
        let valid = match std::str::from_utf8(&self.undecoded) {
            Ok(_) => self.undecoded.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(ParseError::MalformedInput(format!(
                    "invalid UTF-8 at byte {}",
                    self.consumed + e.valid_up_to()
                )));
            }
        };
        if valid == 0 {
            return Ok(());
        }

        let rest = self.undecoded.split_off(valid);
        let decoded = std::mem::replace(&mut self.undecoded, rest);
        let text =
            String::from_utf8(decoded).map_err(|e| ParseError::MalformedInput(e.to_string()))?;
        self.consumed += valid;

        let text = self.escape_carriage_returns(&text);
        self.input.push_back(StrTendril::from_slice(&text));
        match self.tokenizer.feed(&self.input) {
            TokenizerResult::Done => {}
            TokenizerResult::Script(()) => trace!("tokenizer paused on a script end tag"),
        }
        Ok(())
    }

    /// Replace CRs in text content with a character reference
    ///
    /// The tokenizer folds CR and CRLF into LF, but a referenced CR is kept
    /// as is, so each CR in a body stays a separate character. CRs inside
    /// markup are left alone and still count as whitespace there.
    fn escape_carriage_returns(&mut self, text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '<' => self.in_markup = true,
                '>' => self.in_markup = false,
                '\r' if !self.in_markup => {
                    escaped.push_str(CARRIAGE_RETURN_REF);
                    continue;
                }
                _ => {}
            }
            escaped.push(c);
        }
        escaped
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    /// Reader that hands out one byte per call, to split every token across chunks
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((byte, rest)) if !buf.is_empty() => {
                    buf[0] = *byte;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    fn collect<R: Read>(stream: &mut TokenStream<R>) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = stream.next_token().expect("tokenize");
            if token == Token::EndOfStream {
                return tokens;
            }
            tokens.push(token);
        }
    }

    fn start(name: &str, attributes: &[(&str, &str)]) -> Token {
        Token::StartTag(Tag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| Attribute { key: k.to_string(), value: v.to_string() })
                .collect(),
        })
    }

    fn end(name: &str) -> Token {
        Token::EndTag(Tag { name: name.to_string(), attributes: Vec::new() })
    }

    #[test]
    fn test_tokenize_tags_and_text() {
        let mut stream = TokenStream::new(&b"<div class=\"thread\">Alice, Bob</div>"[..]);
        let tokens = collect(&mut stream);

        assert_eq!(
            tokens,
            vec![
                start("div", &[("class", "thread")]),
                Token::Text("Alice, Bob".to_string()),
                end("div"),
            ]
        );
    }

    #[test]
    fn test_tag_names_are_lowercased() {
        let mut stream = TokenStream::new(&b"<DIV CLASS=\"message\"></DIV>"[..]);
        let tokens = collect(&mut stream);
        assert_eq!(tokens, vec![start("div", &[("class", "message")]), end("div")]);
    }

    #[test]
    fn test_text_runs_are_coalesced_across_chunks() {
        let html = "<p>Tom &amp; Jerry, na\u{ef}ve caf\u{e9}</p>";
        let mut stream = TokenStream::new(Trickle(html.as_bytes()));
        let tokens = collect(&mut stream);

        assert_eq!(
            tokens,
            vec![start("p", &[]), Token::Text("Tom & Jerry, na\u{ef}ve caf\u{e9}".to_string()), end("p")]
        );
    }

    #[test]
    fn test_trailing_text_is_returned_at_end_of_input() {
        let mut stream = TokenStream::new(Trickle(b"<span>tail"));
        let tokens = collect(&mut stream);
        assert_eq!(tokens, vec![start("span", &[]), Token::Text("tail".to_string())]);
    }

    #[test]
    fn test_carriage_returns_in_text_are_kept() {
        let mut stream = TokenStream::new(&b"<p>a\r\nb\rc</p>"[..]);
        let tokens = collect(&mut stream);
        assert_eq!(tokens[1], Token::Text("a\r\nb\rc".to_string()));
    }

    #[test]
    fn test_carriage_returns_split_across_chunks() {
        let mut stream = TokenStream::new(Trickle(b"<p>x\r\ny</p>"));
        let tokens = collect(&mut stream);
        assert_eq!(tokens[1], Token::Text("x\r\ny".to_string()));
    }

    #[test]
    fn test_carriage_returns_inside_tags_separate_attributes() {
        let mut stream = TokenStream::new(&b"<div\r\nclass=\"thread\"\r>x</div>"[..]);
        let tokens = collect(&mut stream);
        assert_eq!(tokens[0], start("div", &[("class", "thread")]));
        assert_eq!(tokens[1], Token::Text("x".to_string()));
    }

    #[test]
    fn test_comments_and_doctype_are_skipped() {
        let mut stream = TokenStream::new(&b"<!DOCTYPE html><!-- note --><p>x</p>"[..]);
        let tokens = collect(&mut stream);
        assert_eq!(tokens, vec![start("p", &[]), Token::Text("x".to_string()), end("p")]);
    }

    #[test]
    fn test_end_of_stream_repeats() {
        let mut stream = TokenStream::new(&b""[..]);
        assert_eq!(stream.next_token().unwrap(), Token::EndOfStream);
        assert_eq!(stream.next_token().unwrap(), Token::EndOfStream);
    }

    #[test]
    fn test_depth_tracks_start_and_end_tags() {
        let mut stream = TokenStream::new(&b"<div><div><span></span>"[..]);
        let _ = collect(&mut stream);
        assert_eq!(stream.depth(), 2);
    }

    #[test]
    fn test_line_of_last_token() {
        let mut stream = TokenStream::new(&b"<div>\n\n<span>"[..]);
        let _ = collect(&mut stream);
        assert_eq!(stream.line(), 3);
    }

    #[test]
    fn test_invalid_utf8_is_malformed_input() {
        let mut stream = TokenStream::new(&b"<p>ok \xff\xfe</p>"[..]);
        let result = loop {
            match stream.next_token() {
                Ok(Token::EndOfStream) => break Ok(()),
                Ok(_) => continue,
                Err(e) => break Err(e),
            }
        };
        let err = result.unwrap_err();
        assert!(matches!(err, ParseError::MalformedInput(_)));
        assert!(err.to_string().contains("invalid UTF-8 at byte 6"));
    }

    #[test]
    fn test_truncated_utf8_sequence_is_malformed_input() {
        // First two bytes of a three-byte sequence
        let mut stream = TokenStream::new(&b"<p>x\xe2\x82"[..]);
        let err = (0..4).find_map(|_| stream.next_token().err());
        assert!(matches!(err, Some(ParseError::MalformedInput(_))));
    }

    #[test]
    fn test_read_failure_is_reported() {
        let mut stream = TokenStream::new(Broken);
        let err = stream.next_token().unwrap_err();
        assert!(matches!(err, ParseError::Read(_)));
    }

    #[test]
    fn test_has_attribute_matches_key_and_value() {
        let token = start("div", &[("id", "t1"), ("class", "thread")]);

        assert!(has_attribute(&token, "class", "thread"));
        assert!(!has_attribute(&token, "class", "message"));
        assert!(!has_attribute(&token, "data-class", "thread"));
    }

    #[test]
    fn test_has_attribute_empty_constraint_always_matches() {
        let text = Token::Text("hello".to_string());

        assert!(has_attribute(&text, "", "thread"));
        assert!(has_attribute(&text, "class", ""));
        assert!(!has_attribute(&text, "class", "thread"));
    }

    #[test]
    fn test_display_token() {
        assert_eq!(start("span", &[("class", "user")]).to_string(), "<span class=\"user\">");
        assert_eq!(end("div").to_string(), "</div>");
        assert_eq!(Token::Text("hi".to_string()).to_string(), "text \"hi\"");
        assert_eq!(Token::EndOfStream.to_string(), "end of stream");
    }
}
