// Copyright (C) 2017 1aim GmbH
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Digit-sequence matching.

mod dfa;
pub(crate) use self::dfa::Dfa;

use crate::digits::DigitSequence;
use std::sync::Arc;

/// The outcome of matching a digit sequence against a matcher.
///
/// Variants are declared best first, so the derived ordering makes "better"
/// results compare smaller. [`MatchResult::combine`] exploits this: matching
/// against the union of two matchers is the minimum of the individual
/// results.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum MatchResult {
    /// The sequence is exactly one of the matched sequences.
    Matched,

    /// The sequence is a proper prefix of some matched sequence.
    PartialMatch,

    /// Some matched sequence is a proper prefix of this one.
    ExcessDigits,

    /// The sequence cannot match, but its length is one that matched
    /// sequences have.
    PossibleLength,

    /// The sequence cannot match.
    Invalid,
}

impl MatchResult {
    /// Combine two results as if matching against the union of the two
    /// matchers that produced them.
    ///
    /// Commutative and associative, with [`MatchResult::Invalid`] as
    /// identity.
    pub fn combine(self, other: MatchResult) -> MatchResult {
        self.min(other)
    }

    /// Whether this result is strictly better than another.
    pub fn is_better_than(self, other: MatchResult) -> bool {
        self < other
    }
}

/// The outcome of testing only the length of a digit sequence.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LengthResult {
    /// The length matches that of valid numbers.
    Possible,

    /// The sequence is shorter than all valid numbers.
    TooShort,

    /// The sequence is longer than all valid numbers.
    TooLong,

    /// The length falls in a gap: some valid numbers are shorter and some
    /// are longer, but none has exactly this length.
    InvalidLength,
}

/// Classify a length against a bitmask of possible lengths.
pub(crate) fn length_result(mask: u32, len: usize) -> LengthResult {
    let bit = 1u32.checked_shl(len as u32).unwrap_or(0);

    if mask & bit != 0 {
        LengthResult::Possible
    } else if mask & bit.wrapping_sub(1) == 0 {
        LengthResult::TooShort
    } else if mask >> 1 >> len == 0 {
        LengthResult::TooLong
    } else {
        LengthResult::InvalidLength
    }
}

/// A compiled matcher for a set of digit sequences.
///
/// Either a single byte-coded machine, an ordered union of shared
/// sub-matchers, or the empty matcher that accepts nothing. Sub-matchers are
/// reference counted because the metadata shares machines aggressively
/// between the validity matcher and value matchers.
#[derive(Clone, Debug)]
pub(crate) enum Matcher {
    Dfa(Dfa),
    Combined { mask: u32, children: Vec<Arc<Matcher>> },
    Empty,
}

impl Matcher {
    /// Build the union of several matchers. A single child collapses to the
    /// child itself.
    pub fn combined(children: Vec<Arc<Matcher>>) -> Arc<Matcher> {
        match <[_; 1]>::try_from(children) {
            Ok([only]) => only,
            Err(children) => {
                let mask = children.iter().fold(0, |mask, child| mask | child.length_mask());
                Arc::new(Matcher::Combined { mask, children })
            }
        }
    }

    /// Bitmask over 0..=19 of the lengths of matched sequences.
    pub fn length_mask(&self) -> u32 {
        match self {
            Matcher::Dfa(dfa) => dfa.length_mask(),
            Matcher::Combined { mask, .. } => *mask,
            Matcher::Empty => 0,
        }
    }

    /// Match a digit sequence, reporting [`MatchResult::PossibleLength`]
    /// when the machine rejects but the length alone is plausible.
    pub fn match_digits(&self, digits: &DigitSequence) -> MatchResult {
        let raw = match self {
            Matcher::Dfa(dfa) => dfa.match_digits(digits),

            Matcher::Combined { children, .. } => {
                let mut best = MatchResult::Invalid;

                for child in children {
                    best = best.combine(child.match_digits(digits));

                    if best == MatchResult::Matched {
                        break;
                    }
                }

                best
            }

            Matcher::Empty => MatchResult::Invalid,
        };

        if raw == MatchResult::Invalid && self.test_length(digits) == LengthResult::Possible {
            MatchResult::PossibleLength
        } else {
            raw
        }
    }

    /// Whether the sequence matches exactly. Rejects by length before
    /// running any machine.
    pub fn is_match(&self, digits: &DigitSequence) -> bool {
        self.test_length(digits) == LengthResult::Possible
            && self.match_digits(digits) == MatchResult::Matched
    }

    /// Classify the sequence length against the stored mask, without
    /// running the machine.
    pub fn test_length(&self, digits: &DigitSequence) -> LengthResult {
        length_result(self.length_mask(), digits.len())
    }
}
