// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Parser configuration.
//!
//! Options deserialize from any serde format; all fields are optional:
//!
//! ```toml
//! letters = ["X", "Y", "Z", "A"]
//! duplicates = "keep-first"
//! recovery = "stop"
//! ```

use std::fmt;
use std::str::FromStr;
use fixedbitset::FixedBitSet as BitSet;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use thiserror::Error;

use crate::ast::Letter;

/// A set of enabled argument letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Letter>", into = "Vec<Letter>")]
pub struct LetterSet(BitSet);

impl LetterSet {
    pub fn empty() -> Self {
        LetterSet(BitSet::with_capacity(Letter::COUNT))
    }

    /// The linear motion axes X, Y and Z.
    pub fn axes() -> Self {
        [Letter::X, Letter::Y, Letter::Z].iter().copied().collect()
    }

    pub fn all() -> Self {
        Letter::iter().collect()
    }

    pub fn insert(&mut self, letter: Letter) {
        self.0.insert(letter.index());
    }

    pub fn contains(&self, letter: Letter) -> bool {
        self.0.contains(letter.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = Letter> + '_ {
        Letter::iter().filter(move |&l| self.contains(l))
    }
}

impl Default for LetterSet {
    fn default() -> Self {
        LetterSet::axes()
    }
}

impl FromIterator<Letter> for LetterSet {
    fn from_iter<I: IntoIterator<Item = Letter>>(iter: I) -> Self {
        let mut set = LetterSet::empty();
        for letter in iter {
            set.insert(letter);
        }
        set
    }
}

impl From<Vec<Letter>> for LetterSet {
    fn from(letters: Vec<Letter>) -> Self {
        letters.into_iter().collect()
    }
}

impl From<LetterSet> for Vec<Letter> {
    fn from(set: LetterSet) -> Self {
        set.iter().collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not an argument letter")]
pub struct UnknownLetter(pub char);

/// Parses a run of letters such as `XYZ` or `xyzabc`.
impl FromStr for LetterSet {
    type Err = UnknownLetter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
         .filter(|ch| !ch.is_whitespace() && *ch != ',')
         .map(|ch| Letter::from_char(ch).ok_or(UnknownLetter(ch)))
         .collect()
    }
}

impl fmt::Display for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for letter in self.iter() {
            write!(f, "{}", letter)?;
        }
        Ok(())
    }
}

/// What to do with a letter given twice in one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Reject the block with a `DuplicateLetter` error.
    #[default]
    Reject,
    /// Keep the first value and attach a warning to the block.
    KeepFirst,
}

/// What to do after a block failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recovery {
    /// Report the failure and continue with the next line.
    #[default]
    SkipLine,
    /// Report the failure and end the sequence.
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub letters: LetterSet,
    pub duplicates: DuplicatePolicy,
    pub recovery: Recovery,
}

impl ParseOptions {
    pub fn with_letters(mut self, letters: LetterSet) -> Self {
        self.letters = letters;
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn with_recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = recovery;
        self
    }
}
