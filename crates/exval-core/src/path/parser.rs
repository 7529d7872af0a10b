//! Query parser.
//!
//! Hand-written recursive descent over the query text. Offsets in errors are
//! byte offsets into the original query.

use crate::error::PathError;

use super::ast::{Segment, Selector};

/// Parse a query into its segments.
pub fn parse(query: &str) -> Result<Vec<Segment>, PathError> {
    Parser::new(query).parse_query()
}

struct Parser<'q> {
    src: &'q str,
    pos: usize,
}

impl<'q> Parser<'q> {
    fn new(src: &'q str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError {
            query: self.src.to_string(),
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), PathError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}'")))
        }
    }

    fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.pos += 1;
        }
    }

    fn parse_query(mut self) -> Result<Vec<Segment>, PathError> {
        if !self.eat('$') {
            return Err(self.error("query must start with '$'"));
        }

        let mut segments = Vec::new();
        loop {
            self.skip_blank();
            match self.peek() {
                None => break,
                Some('.') => {
                    self.pos += 1;
                    if self.eat('.') {
                        segments.push(Segment::Descendant(self.parse_after_dot(true)?));
                    } else {
                        segments.push(Segment::Child(self.parse_after_dot(false)?));
                    }
                }
                Some('[') => segments.push(Segment::Child(self.parse_bracketed()?)),
                Some(c) => return Err(self.error(format!("unexpected character '{c}'"))),
            }
        }
        Ok(segments)
    }

    /// After `.` or `..`: a member name, `*`, or (descendant only) a bracket.
    fn parse_after_dot(&mut self, descendant: bool) -> Result<Vec<Selector>, PathError> {
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(vec![Selector::Wildcard])
            }
            Some('[') if descendant => self.parse_bracketed(),
            Some(c) if is_name_first(c) => Ok(vec![Selector::Name(self.parse_name())]),
            Some(c) => Err(self.error(format!("unexpected character '{c}' after '.'"))),
            None => Err(self.error("unexpected end of query after '.'")),
        }
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn parse_bracketed(&mut self) -> Result<Vec<Selector>, PathError> {
        self.expect('[')?;
        let mut selectors = Vec::new();
        loop {
            self.skip_blank();
            selectors.push(self.parse_selector()?);
            self.skip_blank();
            if self.eat(',') {
                continue;
            }
            self.expect(']')?;
            return Ok(selectors);
        }
    }

    fn parse_selector(&mut self) -> Result<Selector, PathError> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                Ok(Selector::Name(self.parse_string(quote)?))
            }
            Some('*') => {
                self.pos += 1;
                Ok(Selector::Wildcard)
            }
            Some('?') => Err(self.error("filter expressions are not supported")),
            Some(c) if c == '-' || c == ':' || c.is_ascii_digit() => self.parse_index_or_slice(),
            Some(c) => Err(self.error(format!("unexpected character '{c}' in selector"))),
            None => Err(self.error("unexpected end of query in selector")),
        }
    }

    fn parse_index_or_slice(&mut self) -> Result<Selector, PathError> {
        let start = self.parse_optional_int()?;
        self.skip_blank();
        if !self.eat(':') {
            return start
                .map(Selector::Index)
                .ok_or_else(|| self.error("expected index"));
        }
        self.skip_blank();
        let end = self.parse_optional_int()?;
        self.skip_blank();
        let step = if self.eat(':') {
            self.skip_blank();
            self.parse_optional_int()?
        } else {
            None
        };
        Ok(Selector::Slice { start, end, step })
    }

    fn parse_optional_int(&mut self) -> Result<Option<i64>, PathError> {
        match self.peek() {
            Some('-') => self.parse_int().map(Some),
            Some(c) if c.is_ascii_digit() => self.parse_int().map(Some),
            _ => Ok(None),
        }
    }

    fn parse_int(&mut self) -> Result<i64, PathError> {
        let start = self.pos;
        let negative = self.eat('-');
        let digits_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.src[digits_start..self.pos];
        if digits.is_empty() {
            return Err(self.error("expected digits"));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            self.pos = digits_start;
            return Err(self.error("leading zeros are not allowed"));
        }
        if negative && digits == "0" {
            self.pos = start;
            return Err(self.error("'-0' is not a valid index"));
        }
        self.src[start..self.pos].parse::<i64>().map_err(|_| {
            self.pos = start;
            self.error("integer out of range")
        })
    }

    /// String literal body after the opening quote, through the closing quote.
    fn parse_string(&mut self, quote: char) -> Result<String, PathError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string literal")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape(quote)?),
                Some(c) if u32::from(c) < 0x20 => {
                    return Err(self.error("control character in string literal"))
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, quote: char) -> Result<char, PathError> {
        match self.bump() {
            Some(c) if c == quote => Ok(c),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{08}'),
            Some('f') => Ok('\u{0C}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.parse_unicode_escape(),
            Some(c) => Err(self.error(format!("invalid escape '\\{c}'"))),
            None => Err(self.error("unterminated escape sequence")),
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, PathError> {
        let high = self.parse_hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(u32::from(high))
                .ok_or_else(|| self.error("invalid unicode escape"));
        }
        if !(self.peek() == Some('\\') && self.peek_second() == Some('u')) {
            return Err(self.error("unpaired surrogate in unicode escape"));
        }
        self.pos += 2;
        let low = self.parse_hex4()?;
        char::decode_utf16([high, low])
            .next()
            .and_then(Result::ok)
            .ok_or_else(|| self.error("invalid surrogate pair in unicode escape"))
    }

    fn parse_hex4(&mut self) -> Result<u16, PathError> {
        let end = self.pos + 4;
        let hex = self
            .src
            .get(self.pos..end)
            .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("expected four hex digits"))?;
        let value = u16::from_str_radix(hex, 16).map_err(|_| self.error("invalid hex digits"))?;
        self.pos = end;
        Ok(value)
    }
}

fn is_name_first(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_first(c) || c.is_ascii_digit()
}
