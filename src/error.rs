// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use std::fmt;
use pest::error::{Error as PestError, ErrorVariant};
use serde::Serialize;
use thiserror::Error;

use crate::ast::{Letter, SourcePosition};
use crate::parse::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum ErrorKind {
    /// A letter committed to a word, but its number is broken.
    MalformedNumeral,
    /// The same argument letter appeared twice in a block.
    DuplicateLetter,
    /// Unrecognized input where the block should have ended.
    UnterminatedBlock,
    /// A `(` comment without `)` on the same line.
    UnclosedComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum Severity {
    /// The block was rejected.
    Error,
    /// The block was kept.
    Warning,
}

/// The kind of token that was being recognized when a diagnostic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Token {
    LineNumber,
    Command,
    Argument(Letter),
    Comment,
    EndOfBlock,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::LineNumber => write!(f, "line number"),
            Token::Command => write!(f, "command word"),
            Token::Argument(letter) => write!(f, "{} word", letter),
            Token::Comment => write!(f, "comment"),
            Token::EndOfBlock => write!(f, "end of block"),
        }
    }
}

/// A parse failure (or warning) for one block.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{severity} at line {}, column {}: {message}", .position.line, .position.column)]
pub struct Diagnostic {
    pub position: SourcePosition,
    pub kind: ErrorKind,
    pub token: Token,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn error(kind: ErrorKind, token: Token, position: SourcePosition,
                        message: impl Into<String>) -> Self {
        Diagnostic { position, kind, token, severity: Severity::Error, message: message.into() }
    }

    pub(crate) fn into_warning(self) -> Self {
        Diagnostic { severity: Severity::Warning, ..self }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format the diagnostic with a source excerpt and a caret under the
    /// offending column.
    ///
    /// `input` must be the buffer the diagnostic's offset refers to, i.e. the
    /// whole text for `Parser::blocks` or the single line for `Parser::lines`.
    /// In the latter case the excerpt still carries the real line number.
    pub fn render(&self, filename: &str, input: &str) -> String {
        let head = match input.get(..self.position.offset) {
            Some(head) => head,
            None => return format!("{}: {}", filename, self),
        };
        // lines that precede the buffer
        let missing = self.position.line.saturating_sub(head.matches('\n').count() + 1);
        let source = "\n".repeat(missing) + input;
        match pest::Position::new(&source, missing + self.position.offset) {
            Some(pos) => {
                let message = format!("{} ({}): {}", self.severity, self.kind, self.message);
                let err: PestError<Rule> = PestError::new_from_pos(ErrorVariant::CustomError { message }, pos);
                err.with_path(filename).to_string()
            }
            None => format!("{}: {}", filename, self),
        }
    }
}
