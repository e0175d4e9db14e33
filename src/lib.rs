// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! A line-oriented parser for RS274 (G-code) motion programs.
//!
//! Each line of a program is a *block*: an optional line number (`N10`), an
//! optional command word (`G0` for rapid moves, `G1` for feed moves) and any
//! number of argument words (`X1.5 Y-2`).  The parser turns program text into
//! a lazy sequence of `Block`s, reporting broken blocks as `Diagnostic`s with
//! a source position instead of giving up on the whole program.
//!
//! ## Basic usage
//!
//! Use `rs274::parse::parse_program` for a lazy iterator with the default
//! options, or build a `rs274::parse::Parser` from `ParseOptions` to enable
//! more argument letters or change how duplicates and errors are handled.
//!
//! ```rust
//! use rs274::{parse_program, CommandKind, Letter};
//!
//! for item in parse_program("N220 G0 X1.1 Y2.2 Z3.3\n") {
//!     match item {
//!         Ok(block) => {
//!             assert_eq!(block.line_number, Some(220));
//!             assert_eq!(block.kind, CommandKind::Rapid);
//!             assert_eq!(block.get(Letter::Y), Some(2.2));
//!         }
//!         Err(diag) => eprintln!("{}", diag),
//!     }
//! }
//! ```
//!
//! The "rs274-parse" binary (feature *cli*) parses a file and prints the
//! normalized program text or JSON.
//!
//! ## Unsupported features
//!
//! Parameters, expressions and control flow ("O codes") are not recognized;
//! only line numbers, G words and plain numeric arguments are.

pub mod args;
pub mod ast;
pub mod cursor;
pub mod error;
pub mod options;
pub mod parse;

// internal helpers
pub(crate) mod util;

pub use crate::args::{Arguments, DuplicateLetter};
pub use crate::ast::{Argument, Block, CommandKind, Letter, Program, SourcePosition};
pub use crate::error::{Diagnostic, ErrorKind, Severity, Token};
pub use crate::options::{DuplicatePolicy, LetterSet, ParseOptions, Recovery};
pub use crate::parse::{parse, parse_program, Blocks, Matched, Parser, Production};
