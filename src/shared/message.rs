/**
 * Review Message Codec
 *
 * This module defines the `Message` struct used for review annotations and
 * the text framing they are stored in.
 *
 * # Frame Format
 *
 * A message is encoded as a MIME-style header block followed by a
 * dot-stuffed body:
 *
 * ```text
 * Author: Jane Doe <jane@example.com>\r\n
 * Date: Tue, 1 Jul 2025 10:52:37 +0000\r\n
 * Status: open\r\n
 * \r\n
 * needs tests\r\n
 * ..leading dot is doubled\r\n
 * .\r\n
 * ```
 *
 * Header fields are written sorted by canonical name, one line per value.
 * A line holding a single `.` terminates the message, so any number of
 * messages can be concatenated into one buffer and decoded again in order.
 * Lines are written with CRLF endings; the decoder also accepts bare LF.
 */
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Characters allowed in a header field name besides ASCII alphanumerics (RFC 7230 `tchar`)
const TOKEN_PUNCTUATION: &str = "!#$%&'*+-.^_`|~";

/// Canonicalize a header field name the way MIME headers are canonicalized
///
/// The first character and any character following a hyphen are upper-cased,
/// all others lower-cased: `x-review-STATE` becomes `X-Review-State`.
///
/// Returns `None` if the name is empty or contains a character that is not a
/// valid token character (spaces, colons, control characters, non-ASCII).
pub fn canonical_field_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if !(c.is_ascii_alphanumeric() || TOKEN_PUNCTUATION.contains(c)) {
            return None;
        }
        if upper {
            canonical.push(c.to_ascii_uppercase());
        } else {
            canonical.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    Some(canonical)
}

/// Normalize a header value for writing: line breaks become spaces, and
/// surrounding whitespace is trimmed.
fn normalize_value(value: &str) -> String {
    value
        .replace(['\r', '\n'], " ")
        .trim_matches(|c| matches!(c, ' ' | '\t'))
        .to_string()
}

/// Header fields of a review message
///
/// An association list from canonical field name to the values supplied for
/// it, ordered by field name. Lookups are case-insensitive; values of a
/// repeated field keep the order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct Header {
    fields: BTreeMap<String, Vec<String>>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to a field, creating the field if needed
    ///
    /// # Errors
    ///
    /// Returns `SharedError::ValidationError` if `name` is not a valid field name.
    pub fn add(&mut self, name: &str, value: impl Into<String>) -> Result<(), SharedError> {
        let key = Self::key(name)?;
        self.fields.entry(key).or_default().push(value.into());
        Ok(())
    }

    /// Replace all values of a field with a single value
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), SharedError> {
        let key = Self::key(name)?;
        self.fields.insert(key, vec![value.into()]);
        Ok(())
    }

    /// First value of a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// All values of a field, in insertion order
    pub fn get_all(&self, name: &str) -> &[String] {
        canonical_field_name(name)
            .and_then(|key| self.fields.get(&key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.get_all(name).is_empty()
    }

    /// Remove a field, returning its values
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let key = canonical_field_name(name)?;
        self.fields.remove(&key)
    }

    /// Iterate fields in canonical name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn key(name: &str) -> Result<String, SharedError> {
        canonical_field_name(name)
            .ok_or_else(|| SharedError::validation(name, "invalid header field name"))
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for Header {
    type Error = SharedError;

    fn try_from(map: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        let mut header = Header::new();
        for (name, values) in map {
            for value in values {
                header.add(&name, value)?;
            }
        }
        Ok(header)
    }
}

impl From<Header> for BTreeMap<String, Vec<String>> {
    fn from(header: Header) -> Self {
        header.fields
    }
}

/// A single review annotation: header fields plus a free-text body
///
/// The body is opaque text. It may contain blank lines, lines that look like
/// header fields, or lines consisting of a single dot; the framing keeps
/// them intact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Header fields (`Author`, `Date`, `Status`, ...)
    pub header: Header,
    /// Free-text body
    pub body: String,
}

impl Message {
    pub fn new(header: Header, body: impl Into<String>) -> Self {
        Self {
            header,
            body: body.into(),
        }
    }

    /// Write this message as one frame
    ///
    /// Fields are written sorted by canonical name. Line breaks inside values
    /// are replaced by spaces and values are trimmed. The body is dot-stuffed
    /// and followed by the terminator line; an empty body writes only the
    /// terminator.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (name, values) in self.header.iter() {
            for value in values {
                write!(w, "{}: {}\r\n", name, normalize_value(value))?;
            }
        }
        w.write_all(b"\r\n")?;

        if !self.body.is_empty() {
            for line in self.body.split('\n') {
                if line.starts_with('.') {
                    w.write_all(b".")?;
                }
                w.write_all(line.as_bytes())?;
                w.write_all(b"\r\n")?;
            }
        }
        w.write_all(b".\r\n")
    }

    /// Encode this message into a new buffer
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        buf
    }

    /// Read one message from `r`
    ///
    /// Returns `Ok(None)` if the reader is exhausted before any header byte
    /// is read, which is how the end of a frame is detected.
    pub fn read_from<R: BufRead>(r: &mut R) -> Result<Option<Message>, SharedError> {
        MessageReader::new(r).next_message()
    }
}

/// Encode a sequence of messages into a single frame
pub fn encode_frame<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<u8> {
    let mut buf = Vec::new();
    for message in messages {
        buf.extend_from_slice(&message.encode());
    }
    buf
}

/// Decode every message of a frame
///
/// # Errors
///
/// Fails on the first malformed message; messages decoded before it are
/// discarded rather than returned as a partial result.
pub fn decode_frame(frame: &[u8]) -> Result<Vec<Message>, SharedError> {
    MessageReader::new(frame).collect()
}

/// Line outcome of the underlying reader
enum Line {
    Eof,
    Text(String),
}

/// Reads consecutive messages from one buffer
///
/// Tracks line numbers across messages so format errors point at the right
/// line of the whole frame. As an iterator it stops after the first error.
pub struct MessageReader<R> {
    reader: R,
    line: usize,
    failed: bool,
}

impl<R: BufRead> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            failed: false,
        }
    }

    /// Read the next message, or `Ok(None)` at end of input
    pub fn next_message(&mut self) -> Result<Option<Message>, SharedError> {
        let first = match self.read_line()? {
            Line::Eof => return Ok(None),
            Line::Text(line) => line,
        };

        let header = self.read_header(first)?;
        let body = self.read_body()?;
        Ok(Some(Message { header, body }))
    }

    fn read_header(&mut self, first: String) -> Result<Header, SharedError> {
        let mut header = Header::new();
        let mut last: Option<String> = None;
        let mut line = first;

        loop {
            if line.is_empty() {
                return Ok(header);
            }

            if line.starts_with([' ', '\t']) {
                let values = last
                    .as_ref()
                    .and_then(|name| header.fields.get_mut(name))
                    .and_then(|values| values.last_mut())
                    .ok_or_else(|| {
                        SharedError::format(self.line, "continuation line without a preceding field")
                    })?;
                let folded = line.trim_matches(|c| matches!(c, ' ' | '\t'));
                if !folded.is_empty() {
                    if !values.is_empty() {
                        values.push(' ');
                    }
                    values.push_str(folded);
                }
            } else {
                let (name, value) = line
                    .split_once(':')
                    .ok_or_else(|| SharedError::format(self.line, "malformed header line"))?;
                let key = canonical_field_name(name).ok_or_else(|| {
                    SharedError::format(self.line, format!("invalid header field name {:?}", name))
                })?;
                let value = value.trim_matches(|c| matches!(c, ' ' | '\t'));
                header
                    .fields
                    .entry(key.clone())
                    .or_default()
                    .push(value.to_string());
                last = Some(key);
            }

            line = match self.read_line()? {
                Line::Eof => {
                    return Err(SharedError::format(self.line, "unexpected end of input in header"))
                }
                Line::Text(line) => line,
            };
        }
    }

    fn read_body(&mut self) -> Result<String, SharedError> {
        let mut lines: Vec<String> = Vec::new();
        loop {
            let line = match self.read_line()? {
                Line::Eof => {
                    return Err(SharedError::format(self.line, "unterminated message body"))
                }
                Line::Text(line) => line,
            };

            if line == "." {
                return Ok(lines.join("\n"));
            }
            match line.strip_prefix('.') {
                Some(unstuffed) => lines.push(unstuffed.to_string()),
                None => lines.push(line),
            }
        }
    }

    /// Read one line without its terminator
    ///
    /// A line that is not terminated by `\n` means the input was truncated.
    fn read_line(&mut self) -> Result<Line, SharedError> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(Line::Eof);
        }
        self.line += 1;

        if buf.pop() != Some(b'\n') {
            return Err(SharedError::format(self.line, "unexpected end of input"));
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        String::from_utf8(buf)
            .map(Line::Text)
            .map_err(|_| SharedError::format(self.line, "invalid UTF-8"))
    }
}

impl<R: BufRead> Iterator for MessageReader<R> {
    type Item = Result<Message, SharedError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_message() {
            Ok(message) => message.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
