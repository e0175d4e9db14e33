// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Character cursor over program text.
//!
//! The cursor is `Copy`: grammar rules that need to backtrack keep a copy
//! and restore it, there is no other undo mechanism.

use crate::ast::SourcePosition;

/// Characters separating words within a block.
pub const BLANKS: &[char] = &[' ', '\t'];

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Cursor::starting_at(input, 1)
    }

    /// A cursor whose first line is reported as `line`.
    pub fn starting_at(input: &'a str, line: usize) -> Self {
        Cursor { input, offset: 0, line, column: 1 }
    }

    pub fn position(&self) -> SourcePosition {
        SourcePosition { line: self.line, column: self.column, offset: self.offset }
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// The text consumed between `start` and this cursor.
    pub fn consumed_since(&self, start: &Cursor<'a>) -> &'a str {
        &self.input[start.offset..self.offset]
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume `len` bytes, which must end on a character boundary.
    pub fn advance_by(&mut self, len: usize) -> &'a str {
        let start = *self;
        let end = self.offset + len;
        while self.offset < end && self.advance().is_some() {}
        self.consumed_since(&start)
    }

    /// Consume characters while they are in `allowed`, ignoring ASCII case.
    /// The consumed run may be empty.
    pub fn match_literal_set(&mut self, allowed: &[char]) -> &'a str {
        let start = *self;
        while self.peek().map_or(false, |ch| is_member(allowed, ch)) {
            self.advance();
        }
        self.consumed_since(&start)
    }

    /// Consume exactly one character if it is in `allowed`, ignoring ASCII
    /// case; nothing is consumed otherwise.
    pub fn match_one(&mut self, allowed: &[char]) -> Option<char> {
        match self.peek() {
            Some(ch) if is_member(allowed, ch) => self.advance(),
            _ => None,
        }
    }

    pub fn skip_blanks(&mut self) -> &'a str {
        self.match_literal_set(BLANKS)
    }

    /// Consume an end-of-line marker (`\n` or `\r\n`).  End of input also
    /// counts as end of line.
    pub fn end_of_line(&mut self) -> bool {
        if self.is_eof() || self.match_one(&['\n']).is_some() {
            return true;
        }
        if self.rest().starts_with("\r\n") {
            self.advance_by(2);
            return true;
        }
        false
    }

    /// Skip the remainder of the current line including its terminator.
    pub fn skip_line(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }
}

fn is_member(allowed: &[char], ch: char) -> bool {
    allowed.iter().any(|a| a.eq_ignore_ascii_case(&ch))
}
