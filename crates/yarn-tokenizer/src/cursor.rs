use std::str::Chars;

use text_size::{TextLen, TextSize};

pub(crate) const EOF_CHAR: char = '\0';

/// Character cursor over the unconsumed tail of the source.
#[derive(Clone)]
pub(crate) struct Cursor<'a> {
    chars: Chars<'a>,
    len: TextSize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(rest: &'a str) -> Self {
        Self { chars: rest.chars(), len: rest.text_len() }
    }

    pub(crate) fn rest(&self) -> &'a str {
        self.chars.as_str()
    }

    fn remaining(&self) -> TextSize {
        self.rest().text_len()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.rest().is_empty()
    }

    pub(crate) fn pos_within_token(&self) -> TextSize {
        self.len - self.remaining()
    }

    pub(crate) fn reset_pos_within_token(&mut self) {
        self.len = self.remaining();
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub(crate) fn advance(&mut self) -> char {
        self.chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn advance_by(&mut self, bytes: usize) {
        let rest = self.rest();
        self.chars = rest[bytes..].chars();
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }

    /// Length of the line break at the cursor, if there is one.
    pub(crate) fn newline_len(&self) -> Option<usize> {
        newline_len(self.rest())
    }

    pub(crate) fn at_line_end(&self) -> bool {
        self.is_eof() || self.newline_len().is_some()
    }

    pub(crate) fn eat_horizontal_whitespace(&mut self) -> bool {
        let before = self.remaining();
        self.advance_while(|c| c == ' ' || c == '\t');
        self.remaining() != before
    }

    /// Consumes `//` up to (not including) the line break.
    pub(crate) fn eat_comment(&mut self) -> bool {
        if !self.starts_with("//") {
            return false;
        }
        self.advance_while(|c| c != '\n' && c != '\r');
        true
    }
}

/// Length of the line break at the start of `text`. `\r\n`, `\n` and a lone
/// `\r` all end a line.
pub(crate) fn newline_len(text: &str) -> Option<usize> {
    if text.starts_with("\r\n") {
        Some(2)
    } else if text.starts_with(['\n', '\r']) {
        Some(1)
    } else {
        None
    }
}
