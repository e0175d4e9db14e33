// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! The block grammar and the program parser.
//!
//! A block is `N<digits>? G<code>? (<letter><number>)*` followed by the end
//! of the line.  Blanks and comments may separate words.  Every rule returns
//! `Ok(Some(_))` when it matched, `Ok(None)` when its first character did
//! not fit (nothing is consumed then), and `Err(_)` when it committed to a
//! word that turned out to be broken.

use std::borrow::Cow;
use std::iter::{Enumerate, FusedIterator};
use pest::Parser as _;
use tracing::{debug, trace, warn};

use crate::ast::*;
use crate::cursor::Cursor;
use crate::error::{Diagnostic, ErrorKind, Token};
use crate::options::{DuplicatePolicy, LetterSet, ParseOptions, Recovery};
use crate::util::num_to_int;

#[derive(pest_derive::Parser)]
#[grammar = "gcode.pest"]
pub struct NumeralParser;

type Step<T> = Result<Option<T>, Diagnostic>;

/// G codes are kept in tenths and must stay below G1000.
const MAX_CODE: u16 = 10000;

/// The grammar productions reported to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Production {
    LineNumber,
    Command,
    Argument,
    EndOfBlock,
}

/// A successfully matched production.
#[derive(Debug, Clone, Copy)]
pub struct Matched<'a> {
    pub production: Production,
    pub position: SourcePosition,
    pub text: &'a str,
}

struct Context<'c, 'p> {
    options: &'c ParseOptions,
    observer: Option<&'c mut (dyn FnMut(Matched<'_>) + 'p)>,
}

impl Context<'_, '_> {
    fn matched(&mut self, production: Production, start: &Cursor<'_>, end: &Cursor<'_>) {
        let position = start.position();
        let text = end.consumed_since(start);
        trace!(%production, %position, text, "matched");
        if let Some(observer) = self.observer.as_deref_mut() {
            observer(Matched { production, position, text });
        }
    }
}

/// Characters that can only continue a number, never start the next word.
const NUMERAL_TAIL: &[char] = &['.', 'e', 'E', '+', '-'];

/// Recognize a numeral of the given kind at the cursor.  A numeral directly
/// followed by something that could still belong to a number is refused, so
/// `1.2.3`, `1e+` or `1-2` are never read as a number plus garbage.
fn numeral<'a>(cur: &mut Cursor<'a>, rule: Rule) -> Option<&'a str> {
    let len = NumeralParser::parse(rule, cur.rest()).ok()?.next()?.as_span().end();
    let text = cur.advance_by(len);
    match cur.peek() {
        Some(ch) if ch.is_ascii_digit() || NUMERAL_TAIL.contains(&ch) => None,
        _ => Some(text),
    }
}

/// Convert a recognized numeral; overflow to infinity counts as malformed.
fn finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The raw text of a broken numeral, for messages.
fn raw_numeral(rest: &str) -> &str {
    let end = rest.find(|ch: char| !(ch.is_ascii_digit() || NUMERAL_TAIL.contains(&ch)))
                  .unwrap_or(rest.len());
    &rest[..end]
}

fn malformed(at: &Cursor<'_>, token: Token, word: impl std::fmt::Display) -> Diagnostic {
    let message = match raw_numeral(at.rest()) {
        "" => format!("expected a number after {}", word),
        raw => format!("malformed number '{}' after {}", raw, word),
    };
    Diagnostic::error(ErrorKind::MalformedNumeral, token, at.position(), message)
}

/// Skip blanks and comments.  A `;` comment runs up to (not including) the
/// end of the line.
fn skip_separators(cur: &mut Cursor<'_>) -> Result<(), Diagnostic> {
    loop {
        cur.skip_blanks();
        match cur.peek() {
            Some('(') => {
                let start = *cur;
                cur.advance();
                loop {
                    match cur.peek() {
                        Some(')') => { cur.advance(); break; }
                        Some('\n') | None => return Err(Diagnostic::error(
                            ErrorKind::UnclosedComment, Token::Comment, start.position(),
                            "comment is not closed before the end of the line")),
                        Some(_) => { cur.advance(); }
                    }
                }
            }
            Some(';') => {
                while !matches!(cur.peek(), Some('\n') | None) {
                    cur.advance();
                }
            }
            _ => return Ok(()),
        }
    }
}

fn line_number(cur: &mut Cursor<'_>) -> Step<u32> {
    if cur.match_one(&['N']).is_none() {
        return Ok(None);
    }
    let at = *cur;
    numeral(cur, Rule::integer)
        .and_then(|text| text.parse::<u32>().ok())
        .map(Some)
        .ok_or_else(|| malformed(&at, Token::LineNumber, 'N'))
}

/// A command word: one or more `G` followed directly by the code.  Leading
/// zeros are insignificant, so `G00` and `G0` are the same code.
fn command(cur: &mut Cursor<'_>) -> Step<u16> {
    if cur.match_literal_set(&['G']).is_empty() {
        return Ok(None);
    }
    let at = *cur;
    let value = numeral(cur, Rule::code)
        .and_then(finite)
        .ok_or_else(|| malformed(&at, Token::Command, 'G'))?;
    num_to_int(value, 1, MAX_CODE, |v| Diagnostic::error(
        ErrorKind::MalformedNumeral, Token::Command, at.position(),
        format!("G{} is not a valid code (at most one decimal place, below 1000)", v)))
        .map(Some)
}

/// Recognize one argument word, e.g. `X1.5` or `y -2`.
///
/// Returns `Ok(None)` without consuming anything if the next character is
/// not an enabled letter.  Once the letter matched, a missing or broken
/// number is an error.
pub fn argument(cur: &mut Cursor<'_>, letters: &LetterSet) -> Step<Argument> {
    let letter = match cur.peek().and_then(Letter::from_char) {
        Some(letter) if letters.contains(letter) => letter,
        _ => return Ok(None),
    };
    cur.advance();
    cur.skip_blanks();
    let at = *cur;
    let value = numeral(cur, Rule::real)
        .and_then(finite)
        .ok_or_else(|| malformed(&at, Token::Argument(letter), letter))?;
    Ok(Some(Argument { letter, value }))
}

fn accumulate(block: &mut Block, arg: Argument, position: SourcePosition,
              policy: DuplicatePolicy) -> Result<(), Diagnostic> {
    let dup = match block.arguments.insert(arg) {
        Ok(()) => return Ok(()),
        Err(dup) => dup,
    };
    let diag = Diagnostic::error(ErrorKind::DuplicateLetter, Token::Argument(arg.letter),
                                 position, dup.to_string());
    match policy {
        DuplicatePolicy::Reject => Err(diag),
        DuplicatePolicy::KeepFirst => {
            warn!(%position, letter = %arg.letter, kept = dup.first, "duplicate argument ignored");
            block.warnings.push(diag.into_warning());
            Ok(())
        }
    }
}

fn unterminated(cur: &Cursor<'_>) -> Diagnostic {
    let message = match cur.peek() {
        Some(ch) if ch.eq_ignore_ascii_case(&'N') =>
            "a line number must be the first word of a block".to_string(),
        Some(ch) if ch.eq_ignore_ascii_case(&'G') =>
            "only one command word is allowed per block".to_string(),
        Some(ch) if Letter::from_char(ch).is_some() =>
            format!("argument letter '{}' is not enabled", ch.to_ascii_uppercase()),
        Some(ch) => format!("unexpected '{}', expected an argument word or end of line",
                            ch.escape_debug()),
        None => "unexpected end of input".to_string(),
    };
    Diagnostic::error(ErrorKind::UnterminatedBlock, Token::EndOfBlock, cur.position(), message)
}

/// Parse one block starting at the cursor.  Returns `Ok(None)` after
/// consuming a line without words.
fn block(cur: &mut Cursor<'_>, ctx: &mut Context<'_, '_>) -> Step<Block> {
    skip_separators(cur)?;
    if cur.end_of_line() {
        return Ok(None);
    }
    let mut block = Block::new(cur.position());

    let start = *cur;
    if let Some(n) = line_number(cur)? {
        block.line_number = Some(n);
        ctx.matched(Production::LineNumber, &start, cur);
        skip_separators(cur)?;
    }

    let start = *cur;
    if let Some(code) = command(cur)? {
        block.set_command(code);
        ctx.matched(Production::Command, &start, cur);
        skip_separators(cur)?;
    }

    loop {
        let start = *cur;
        match argument(cur, &ctx.options.letters)? {
            Some(arg) => {
                ctx.matched(Production::Argument, &start, cur);
                accumulate(&mut block, arg, start.position(), ctx.options.duplicates)?;
                skip_separators(cur)?;
            }
            None => break,
        }
    }

    let start = *cur;
    if !cur.end_of_line() {
        return Err(unterminated(cur));
    }
    ctx.matched(Production::EndOfBlock, &start, cur);
    Ok(Some(block))
}

/// A lazy sequence of parsed blocks and diagnostics over one buffer.
///
/// After an error the sequence either resumes at the next line or ends,
/// depending on the configured `Recovery`.
pub struct Blocks<'p, 'a> {
    cursor: Cursor<'a>,
    options: Cow<'p, ParseOptions>,
    observer: Option<Box<dyn FnMut(Matched<'_>) + 'p>>,
    done: bool,
}

impl<'p, 'a> Blocks<'p, 'a> {
    fn new(cursor: Cursor<'a>, options: Cow<'p, ParseOptions>) -> Self {
        Blocks { cursor, options, observer: None, done: false }
    }

    /// Call `observer` for every production that matched.
    pub fn observe(mut self, observer: impl FnMut(Matched<'_>) + 'p) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }
}

impl<'p, 'a> Iterator for Blocks<'p, 'a> {
    type Item = Result<Block, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && !self.cursor.is_eof() {
            let mut ctx = Context {
                options: &self.options,
                observer: self.observer.as_deref_mut(),
            };
            match block(&mut self.cursor, &mut ctx) {
                Ok(Some(block)) => {
                    debug!(position = %block.position, kind = %block.kind,
                           arguments = block.arguments.len(), "parsed block");
                    return Some(Ok(block));
                }
                Ok(None) => continue,
                Err(diag) => {
                    match self.options.recovery {
                        Recovery::SkipLine => {
                            self.cursor.skip_line();
                            debug!(error = %diag, "skipped rest of line");
                        }
                        Recovery::Stop => self.done = true,
                    }
                    return Some(Err(diag));
                }
            }
        }
        None
    }
}

impl FusedIterator for Blocks<'_, '_> {}

/// Blocks from input given line by line.
pub struct Lines<'p, 'a, I> {
    lines: Enumerate<I>,
    current: Option<Blocks<'p, 'a>>,
    options: &'p ParseOptions,
    done: bool,
}

impl<'p, 'a, I: Iterator<Item = &'a str>> Iterator for Lines<'p, 'a, I> {
    type Item = Result<Block, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                if item.is_err() && self.options.recovery == Recovery::Stop {
                    self.done = true;
                }
                return Some(item);
            }
            let (n, line) = self.lines.next()?;
            let cursor = Cursor::starting_at(line, n + 1);
            self.current = Some(Blocks::new(cursor, Cow::Borrowed(self.options)));
        }
        None
    }
}

/// A configured program parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Parser { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Lazily parse a whole buffer.
    pub fn blocks<'p, 'a>(&'p self, input: &'a str) -> Blocks<'p, 'a> {
        Blocks::new(Cursor::new(input), Cow::Borrowed(&self.options))
    }

    /// Lazily parse input that arrives as separate lines.  Line terminators
    /// may be present or not.
    pub fn lines<'p, 'a, I>(&'p self, lines: I) -> Lines<'p, 'a, I::IntoIter>
        where I: IntoIterator<Item = &'a str>
    {
        Lines { lines: lines.into_iter().enumerate(), current: None,
                options: &self.options, done: false }
    }

    /// Parse a whole buffer, collecting blocks and diagnostics.
    pub fn parse(&self, filename: &str, input: &str) -> Program {
        let mut prog = Program { filename: filename.into(), blocks: vec![], diagnostics: vec![] };
        for item in self.blocks(input) {
            match item {
                Ok(block) => {
                    prog.diagnostics.extend(block.warnings.iter().cloned());
                    prog.blocks.push(block);
                }
                Err(diag) => prog.diagnostics.push(diag),
            }
        }
        debug!(filename, blocks = prog.blocks.len(), diagnostics = prog.diagnostics.len(),
               "parsed program");
        prog
    }
}

/// Lazily parse a buffer with the default options.
pub fn parse_program(input: &str) -> Blocks<'static, '_> {
    Blocks::new(Cursor::new(input), Cow::Owned(ParseOptions::default()))
}

/// Parse a buffer with the default options.
pub fn parse(filename: &str, input: &str) -> Program {
    Parser::default().parse(filename, input)
}
