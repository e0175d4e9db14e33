// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Per-block collection of argument words.

use fixedbitset::FixedBitSet as BitSet;
use serde::{Serialize, Serializer};
use strum::EnumCount;
use thiserror::Error;

use crate::ast::{Argument, Letter};

/// The argument words of one block, keyed by letter in insertion order.
///
/// Every letter occurs at most once; a second insertion of the same letter is
/// refused and left to the caller to report.
#[derive(Debug, Clone)]
pub struct Arguments {
    entries: Vec<Argument>,
    seen: BitSet,
}

/// A letter was given twice in the same block.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("{letter} given twice in one block ({first} and {second})")]
pub struct DuplicateLetter {
    pub letter: Letter,
    /// The value that was kept.
    pub first: f64,
    /// The value that was refused.
    pub second: f64,
}

impl Arguments {
    pub fn new() -> Self {
        Arguments {
            entries: Vec::new(),
            seen: BitSet::with_capacity(Letter::COUNT),
        }
    }

    pub fn insert(&mut self, arg: Argument) -> Result<(), DuplicateLetter> {
        if self.seen.put(arg.letter.index()) {
            let first = self.get(arg.letter).unwrap_or_default();
            return Err(DuplicateLetter { letter: arg.letter, first, second: arg.value });
        }
        self.entries.push(arg);
        Ok(())
    }

    /// Presence is decided by the letter alone, so a stored zero is found
    /// like any other value.
    pub fn contains(&self, letter: Letter) -> bool {
        self.seen.contains(letter.index())
    }

    pub fn get(&self, letter: Letter) -> Option<f64> {
        if !self.contains(letter) {
            return None;
        }
        self.entries.iter().find(|arg| arg.letter == letter).map(|arg| arg.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.entries.iter()
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments::new()
    }
}

impl PartialEq for Arguments {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Arguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|arg| (arg.letter, arg.value)))
    }
}
