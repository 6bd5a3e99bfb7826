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

use crate::calling_code::CallingCode;
use crate::digits::DigitSequence;
use crate::error;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A phone number.
///
/// A pair of a country calling code and a national number, both digit
/// sequences. The calling code is always one of the globally recognised
/// values; nothing is implied about whether the national number is valid,
/// that is what the classifier is for.
///
/// The canonical string form is E.164-like: `"+<calling code><national
/// number>"`. Parsing accepts that form with or without the leading `+` and
/// nothing else; free-form human input goes through [`crate::parser`]
/// instead.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PhoneNumber {
    /// The country calling code, e.g. 1 for NANPA countries and 44 for the
    /// United Kingdom and its dependencies.
    code: CallingCode,

    /// The national number: everything after the calling code in canonical
    /// form, leading zeros preserved.
    national: DigitSequence,
}

impl PhoneNumber {
    /// Pair a calling code with a national number.
    pub fn new(code: CallingCode, national: DigitSequence) -> PhoneNumber {
        PhoneNumber { code, national }
    }

    /// Get the calling code.
    pub fn code(&self) -> CallingCode {
        self.code
    }

    /// Get the national number.
    pub fn national(&self) -> DigitSequence {
        self.national
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}{}", self.code, self.national)
    }
}

impl FromStr for PhoneNumber {
    type Err = error::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: DigitSequence = s.strip_prefix('+').unwrap_or(s).parse()?;

        if digits.is_empty() {
            return Err(error::ParseError::NoNumber);
        }

        let code = CallingCode::extract(&digits).ok_or(error::ParseError::InvalidCallingCode)?;
        let national = digits.suffix(digits.len() - code.len());

        if national.is_empty() {
            return Err(error::ParseError::NoNumber);
        }

        Ok(PhoneNumber { code, national })
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        string.parse().map_err(D::Error::custom)
    }
}
