//! Tolerant JSON parsing for frames flushed mid-document.
//!
//! Some producers flush a frame before the JSON document inside it is
//! complete. [`parse`] accepts such a document and returns the deepest value
//! that could be read, closing whatever was still open at the cut:
//!
//! - an open string keeps the characters read so far (a dangling escape is dropped)
//! - open arrays and objects are closed
//! - an object key without a value is dropped
//! - a number ending in `-`, `.`, `e` or a sign is trimmed to its valid prefix
//! - a literal cut short (`tr`, `nul`) is dropped
//!
//! This deliberately deviates from strict JSON, which would reject the whole
//! frame. Input that is malformed rather than cut short is still an error.
//! Raw control characters inside strings are accepted, since multi-line data
//! fields are joined with `\n` before parsing.

use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a document could not be read even tolerantly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartialJsonError {
    #[error("empty document")]
    Empty,
    #[error("document ends before any value")]
    Truncated,
    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },
    #[error("invalid number at offset {offset}")]
    InvalidNumber { offset: usize },
    #[error("trailing characters at offset {offset}")]
    TrailingCharacters { offset: usize },
    #[error("nesting deeper than {MAX_DEPTH} levels at offset {offset}")]
    DepthLimit { offset: usize },
}

/// Maximum nesting of arrays and objects, matching `serde_json`.
pub const MAX_DEPTH: usize = 128;

/// A tolerantly parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Value,
    /// The input ended inside a value and something was closed or dropped.
    pub truncated: bool,
}

/// Parse `input`, accepting a document that is cut short.
pub fn parse(input: &str) -> Result<Value, PartialJsonError> {
    parse_document(input).map(|parsed| parsed.value)
}

/// Like [`parse`], also reporting whether the document was cut short.
pub fn parse_document(input: &str) -> Result<Parsed, PartialJsonError> {
    let mut scanner = Scanner::new(input);
    scanner.skip_whitespace();
    if scanner.at_end() {
        return Err(PartialJsonError::Empty);
    }

    let value = scanner.parse_value()?.ok_or(PartialJsonError::Truncated)?;

    scanner.skip_whitespace();
    if !scanner.at_end() {
        return Err(PartialJsonError::TrailingCharacters {
            offset: scanner.pos,
        });
    }

    Ok(Parsed {
        value,
        truncated: scanner.truncated,
    })
}

struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    truncated: bool,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            depth: 0,
            truncated: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn mark_cut(&mut self) {
        self.pos = self.bytes.len();
        self.truncated = true;
    }

    fn unexpected(&self) -> PartialJsonError {
        let found = self.input[self.pos..].chars().next().unwrap_or('\0');
        PartialJsonError::Unexpected {
            found,
            offset: self.pos,
        }
    }

    /// `Ok(None)` means the input ended before a value could be produced.
    fn parse_value(&mut self) -> Result<Option<Value>, PartialJsonError> {
        self.skip_whitespace();
        match self.peek() {
            None => {
                self.mark_cut();
                Ok(None)
            }
            Some(b'{') => self.nested(Self::parse_object).map(Some),
            Some(b'[') => self.nested(Self::parse_array).map(Some),
            Some(b'"') => self.parse_string().map(|s| Some(Value::String(s))),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Value, PartialJsonError>,
    ) -> Result<Value, PartialJsonError> {
        if self.depth == MAX_DEPTH {
            return Err(PartialJsonError::DepthLimit { offset: self.pos });
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn parse_object(&mut self) -> Result<Value, PartialJsonError> {
        self.pos += 1;
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    self.mark_cut();
                    return Ok(Value::Object(map));
                }
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                Some(b'"') => {}
                Some(_) => return Err(self.unexpected()),
            }

            let key = self.parse_string()?;
            if self.truncated {
                return Ok(Value::Object(map));
            }

            self.skip_whitespace();
            match self.peek() {
                None => {
                    self.mark_cut();
                    return Ok(Value::Object(map));
                }
                Some(b':') => self.pos += 1,
                Some(_) => return Err(self.unexpected()),
            }

            match self.parse_value()? {
                Some(value) => {
                    map.insert(key, value);
                }
                None => return Ok(Value::Object(map)),
            }
            if self.truncated {
                return Ok(Value::Object(map));
            }

            self.skip_whitespace();
            match self.peek() {
                None => {
                    self.mark_cut();
                    return Ok(Value::Object(map));
                }
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                Some(_) => return Err(self.unexpected()),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, PartialJsonError> {
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    self.mark_cut();
                    return Ok(Value::Array(items));
                }
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                _ => {}
            }

            match self.parse_value()? {
                Some(value) => items.push(value),
                None => return Ok(Value::Array(items)),
            }
            if self.truncated {
                return Ok(Value::Array(items));
            }

            self.skip_whitespace();
            match self.peek() {
                None => {
                    self.mark_cut();
                    return Ok(Value::Array(items));
                }
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(_) => return Err(self.unexpected()),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, PartialJsonError> {
        self.pos += 1;
        let mut out = String::new();

        loop {
            // Quote and backslash are ASCII, so runs between them always end
            // on a char boundary.
            let start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' {
                    break;
                }
                self.pos += 1;
            }
            out.push_str(&self.input[start..self.pos]);

            match self.peek() {
                None => {
                    self.mark_cut();
                    return Ok(out);
                }
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(_) => {
                    let escape_at = self.pos;
                    self.pos += 1;
                    match self.parse_escape(escape_at)? {
                        Some(c) => out.push(c),
                        None => {
                            self.mark_cut();
                            return Ok(out);
                        }
                    }
                }
            }
        }
    }

    fn parse_escape(&mut self, escape_at: usize) -> Result<Option<char>, PartialJsonError> {
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        self.pos += 1;
        let c = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.parse_unicode_escape(escape_at),
            _ => return Err(PartialJsonError::InvalidEscape { offset: escape_at }),
        };
        Ok(Some(c))
    }

    fn parse_unicode_escape(&mut self, escape_at: usize) -> Result<Option<char>, PartialJsonError> {
        let Some(first) = self.read_hex4(escape_at)? else {
            return Ok(None);
        };

        if !(0xD800..0xDC00).contains(&first) {
            return Ok(Some(char::from_u32(first as u32).unwrap_or('\u{FFFD}')));
        }

        // High surrogate: the low half must follow as another \u escape.
        let rest = &self.bytes[self.pos..];
        if rest.is_empty() || rest == b"\\" {
            return Ok(None);
        }
        if !rest.starts_with(b"\\u") {
            return Ok(Some('\u{FFFD}'));
        }

        let second_at = self.pos;
        self.pos += 2;
        let Some(second) = self.read_hex4(second_at)? else {
            return Ok(None);
        };
        if !(0xDC00..0xE000).contains(&second) {
            return Ok(Some('\u{FFFD}'));
        }

        let code = 0x10000 + (((first as u32) - 0xD800) << 10) + ((second as u32) - 0xDC00);
        Ok(Some(char::from_u32(code).unwrap_or('\u{FFFD}')))
    }

    fn read_hex4(&mut self, escape_at: usize) -> Result<Option<u16>, PartialJsonError> {
        let available = &self.bytes[self.pos..];
        let digits = &available[..available.len().min(4)];

        if !digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(PartialJsonError::InvalidEscape { offset: escape_at });
        }
        if digits.len() < 4 {
            self.pos = self.bytes.len();
            return Ok(None);
        }

        let mut value: u16 = 0;
        for digit in digits {
            // is_ascii_hexdigit checked above
            let nibble = (*digit as char).to_digit(16).unwrap_or(0) as u16;
            value = (value << 4) | nibble;
        }
        self.pos += 4;
        Ok(Some(value))
    }

    fn parse_literal(&mut self, word: &str, value: Value) -> Result<Option<Value>, PartialJsonError> {
        let rest = &self.bytes[self.pos..];
        if rest.starts_with(word.as_bytes()) {
            self.pos += word.len();
            return Ok(Some(value));
        }
        if word.as_bytes().starts_with(rest) {
            self.mark_cut();
            return Ok(None);
        }
        Err(self.unexpected())
    }

    fn parse_number(&mut self) -> Result<Option<Value>, PartialJsonError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.pos += 1;
        }

        let text = &self.input[start..self.pos];
        if let Some(number) = number_from(text) {
            return Ok(Some(number));
        }

        if self.at_end() {
            self.truncated = true;
            let valid_prefix = (1..text.len()).rev().find_map(|end| number_from(&text[..end]));
            return Ok(valid_prefix);
        }

        Err(PartialJsonError::InvalidNumber { offset: start })
    }
}

fn number_from(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_number)
}
