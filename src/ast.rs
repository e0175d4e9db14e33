// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use std::fmt::{self, Display, Formatter};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};

use crate::args::Arguments;
use crate::error::Diagnostic;

/// A location in program text.
///
/// Lines and columns are 1-based, columns count characters.  The offset is
/// in bytes, relative to the buffer the position was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Display for SourcePosition {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A word address letter that can carry an argument value.
///
/// `N` and `G` are reserved for line numbers and commands and are never
/// arguments.  Which of these letters a parser accepts is configured through
/// a `LetterSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
         strum_macros::Display, EnumIter, EnumCount, IntoStaticStr)]
pub enum Letter {
    // axis words
    A, B, C,
    U, V, W,
    X, Y, Z,
    // arc offsets
    I, J, K,
    // feed rate
    F,
}

impl Letter {
    /// Look up a letter, ignoring ASCII case.
    pub fn from_char(ch: char) -> Option<Self> {
        let ch = ch.to_ascii_uppercase();
        Letter::iter().find(|l| l.as_char() == ch)
    }

    pub fn as_char(self) -> char {
        let name: &'static str = self.into();
        name.as_bytes()[0] as char
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// A single argument word, such as `X1.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Argument {
    pub letter: Letter,
    pub value: f64,
}

/// Classification of a block's command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum CommandKind {
    /// The block has no command word.
    None,
    /// `G0`, positioning at traverse rate.
    Rapid,
    /// `G1`, motion at the programmed feed rate.
    Feed,
    /// Any other G code.
    Unknown,
}

impl CommandKind {
    /// Classify a G code given in tenths, i.e. `G38.2` is 382.
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => CommandKind::Rapid,
            10 => CommandKind::Feed,
            _ => CommandKind::Unknown,
        }
    }
}

/// One parsed line of a program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub line_number: Option<u32>,
    pub kind: CommandKind,
    /// The G code in tenths; `None` exactly when `kind` is `None`.
    pub code: Option<u16>,
    pub arguments: Arguments,
    pub position: SourcePosition,
    /// Non-fatal diagnostics raised while parsing this block.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
}

impl Block {
    pub fn new(position: SourcePosition) -> Self {
        Block {
            line_number: None,
            kind: CommandKind::None,
            code: None,
            arguments: Arguments::new(),
            position,
            warnings: vec![],
        }
    }

    pub(crate) fn set_command(&mut self, code: u16) {
        self.kind = CommandKind::from_code(code);
        self.code = Some(code);
    }

    /// Value of an argument, if the block has it.
    pub fn get(&self, letter: Letter) -> Option<f64> {
        self.arguments.get(letter)
    }
}

/// The result of parsing a whole named input.
#[derive(Debug, Serialize)]
pub struct Program {
    pub filename: String,
    pub blocks: Vec<Block>,
    /// Errors for rejected blocks and warnings for accepted ones, in input order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for block in &self.blocks {
            writeln!(f, "{}", block)?;
        }
        Ok(())
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let number = self.line_number.map(|n| format!("N{}", n));
        let command = self.code.map(|n| {
            let nf = (n as f64) / 10.;
            format!("G{}", nf)
        });
        let words = number.into_iter()
                          .chain(command)
                          .chain(self.arguments.iter().map(|arg| arg.to_string()));
        write!(f, "{}", words.format(" "))
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.value)
    }
}
