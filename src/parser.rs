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

//! Parsing of free-form, human-written phone numbers.
//!
//! Unlike [`crate::phone_number::PhoneNumber::from_str`], which takes only
//! canonical E.164 text, this parser accepts numbers the way people write
//! them: grouped with separators, with or without a `+`, in national or
//! international form, with full-width digits. It does not attempt to fish
//! numbers out of surrounding prose; one unexpected character fails the
//! parse.

use crate::calling_code::CallingCode;
use crate::classifier::RawClassifier;
use crate::digits::{DigitSequence, MAX_DIGITS};
use crate::error::ParseError;
use crate::formatter::FormatType;
use crate::matcher::{LengthResult, MatchResult};
use crate::phone_number::PhoneNumber;
pub use either::Either;
use itertools::Itertools;
use log::warn;
use nom::branch::alt;
use nom::character::complete::{one_of, satisfy};
use nom::combinator::map;
use nom::multi::many0;
use nom::IResult;

/// Argentinian mobile numbers are written with an infixed "15" nationally
/// but an inserted "9" internationally; the parser rewrites between the two.
const ARGENTINA: u16 = 54;

/// A default calling code for parsing, given either as a CLDR region code
/// or as the calling code itself.
pub type ParseHint<'a> = Either<&'a str, CallingCode>;

/// A successful parse: the number, how well it matched, and whether it was
/// written in national or international form.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PhoneNumberResult {
    pub phone_number: PhoneNumber,
    pub result: MatchResult,
    pub format: FormatType,
}

/// Parse free-form text, keeping only the number itself.
pub fn parse_leniently(
    classifier: &RawClassifier,
    text: &str,
    hint: Option<ParseHint<'_>>,
) -> Option<PhoneNumber> {
    parse_strictly(classifier, text, hint)
        .ok()
        .map(|result| result.phone_number)
}

/// Parse free-form text, reporting match quality and inferred format, or
/// why no interpretation exists.
pub fn parse_strictly(
    classifier: &RawClassifier,
    text: &str,
    hint: Option<ParseHint<'_>>,
) -> Result<PhoneNumberResult, ParseError> {
    let scan = scan(text)?;

    let provided = match hint {
        None => None,
        Some(Either::Left(region)) => classifier.calling_code_for_region(region),
        Some(Either::Right(code)) => Some(code),
    };

    let extracted = CallingCode::extract(&scan.digits);

    let national = provided
        .map(|code| best_result(classifier, code, scan.digits, FormatType::National));

    let international = extracted
        .filter(|&code| classifier.is_supported(code))
        .map(|code| {
            let rest = scan.digits.suffix(scan.digits.len() - code.len());
            best_result(classifier, code, rest, FormatType::International)
        });

    match (national, international) {
        (None, None) => {
            // A recognised calling code the metadata does not cover still
            // deserves an E.164 reading when the text is shaped like one.
            if let (Some(code), true) = (extracted, scan.international_shape) {
                warn!("calling code {} not in metadata, returning raw E.164 parse", code);

                let rest = scan.digits.suffix(scan.digits.len() - code.len());

                return Ok(PhoneNumberResult {
                    phone_number: PhoneNumber::new(code, rest),
                    result: MatchResult::Invalid,
                    format: FormatType::International,
                });
            }

            Err(ParseError::NoInterpretation)
        }

        (Some(only), None) | (None, Some(only)) => Ok(only),

        (Some(national), Some(international)) => {
            if national.result.is_better_than(international.result) {
                Ok(national)
            } else if extracted == provided || scan.international_shape {
                // The one place the *shape* of the input decides: equal
                // quality goes to the international reading only when the
                // text says so.
                Ok(international)
            } else {
                Ok(national)
            }
        }
    }
}

/// Find the best reading of `national` under one calling code, trying the
/// bare number and every national prefix strip.
fn best_result(
    classifier: &RawClassifier,
    code: CallingCode,
    national: DigitSequence,
    format: FormatType,
) -> PhoneNumberResult {
    if !classifier.is_supported(code) {
        return PhoneNumberResult {
            phone_number: PhoneNumber::new(code, national),
            result: MatchResult::Invalid,
            format,
        };
    }

    let national = if code.value() == ARGENTINA {
        adjust_argentina(classifier, code, national)
    } else {
        national
    };

    let prefixes = classifier.national_prefixes(code);

    // When dialling nationally with a mandatory prefix, the bare number is
    // not a legal way to write the number at all.
    let required = format == FormatType::National
        && !prefixes.is_empty()
        && !classifier.national_prefix_optional(code);

    let mut best = if required {
        MatchResult::Invalid
    } else {
        classifier.match_number(code, national)
    };
    let mut best_number = national;

    for prefix in prefixes {
        if !national.starts_with(prefix) {
            continue;
        }

        let candidate = national.suffix(national.len() - prefix.len());
        let result = classifier.match_number(code, candidate);

        if result.is_better_than(best) {
            best = result;
            best_number = candidate;
        }

        if result == MatchResult::Matched {
            break;
        }
    }

    PhoneNumberResult {
        phone_number: PhoneNumber::new(code, best_number),
        result: best,
        format,
    }
}

/// Rewrite an over-long Argentinian national number of the shape
/// `0? <area> 15 <subscriber>` into the `9 <area> <subscriber>` form the
/// numbering plan stores, when that makes its length possible.
fn adjust_argentina(
    classifier: &RawClassifier,
    code: CallingCode,
    national: DigitSequence,
) -> DigitSequence {
    if classifier.test_length(code, national) != LengthResult::TooLong {
        return national;
    }

    let len = national.len();

    // Backtracking order of the reference pattern 0?(\d{2,4})15(\d{6,8}):
    // consume the leading zero first, widest area code first. The first
    // structural match decides; if its rewrite is no better, the number is
    // left alone.
    for skip in [1, 0] {
        if skip == 1 && national.first() != Some(0) {
            continue;
        }

        for area_len in (2..=4).rev() {
            let subscriber_len = match len.checked_sub(skip + area_len + 2) {
                Some(rest) if (6..=8).contains(&rest) => rest,
                _ => continue,
            };

            if national.get(skip + area_len) != Some(1)
                || national.get(skip + area_len + 1) != Some(5)
            {
                continue;
            }

            let area = national.suffix(len - skip).prefix(area_len);
            let subscriber = national.suffix(subscriber_len);
            let rewritten = DigitSequence::EMPTY
                .push(9)
                .append(&area)
                .append(&subscriber);

            if classifier.test_length(code, rewritten) == LengthResult::Possible {
                return rewritten;
            }

            return national;
        }
    }

    national
}

/// What character scanning learned about the input.
struct Scan {
    /// Every digit in the text, in order.
    digits: DigitSequence,

    /// Whether the text is shaped like an international number: exactly one
    /// plus sign, immediately followed by the first digit.
    international_shape: bool,
}

/// One accepted input character.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Token {
    Digit(u8),
    Plus,
    Separator,
}

fn token(i: &str) -> IResult<&str, Token> {
    alt((
        map(satisfy(is_digit), |c| Token::Digit(digit_value(c))),
        map(one_of("+\u{FF0B}"), |_| Token::Plus),
        map(satisfy(is_separator), |_| Token::Separator),
        map(satisfy(char::is_whitespace), |_| Token::Separator),
    ))(i)
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('\u{FF10}'..='\u{FF19}').contains(&c)
}

fn digit_value(c: char) -> u8 {
    if c.is_ascii_digit() {
        c as u8 - b'0'
    } else {
        (c as u32 - 0xFF10) as u8
    }
}

/// The grouping separators people put in phone numbers, including the
/// usual Unicode confusables of each.
fn is_separator(c: char) -> bool {
    matches!(
        c,
        '-' | '/'
            | '.'
            | '('
            | ')'
            | '\u{2010}'..='\u{2015}'
            | '\u{2212}'
            | '\u{FF0D}'
            | '\u{FF0F}'
            | '\u{3000}'
            | '\u{2060}'
            | '\u{FF0E}'
            | '\u{FF08}'
            | '\u{FF09}'
            | '\u{2768}'
            | '\u{2769}'
    )
}

fn scan(text: &str) -> Result<Scan, ParseError> {
    let (rest, tokens): (&str, Vec<Token>) = many0(token)(text)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| ParseError::NoNumber)?;

    if let Some(forbidden) = rest.chars().next() {
        return Err(ParseError::ForbiddenCharacter(forbidden));
    }

    let mut digits = DigitSequence::EMPTY;

    for token in &tokens {
        if let Token::Digit(digit) = token {
            if digits.len() == MAX_DIGITS {
                return Err(ParseError::TooLong);
            }

            digits = digits.push(*digit);
        }
    }

    if digits.is_empty() {
        return Err(ParseError::NoNumber);
    }

    let plus_positions = tokens
        .iter()
        .positions(|token| *token == Token::Plus)
        .collect::<Vec<_>>();
    let first_digit = tokens
        .iter()
        .position(|token| matches!(token, Token::Digit(_)));

    let international_shape = match (&plus_positions[..], first_digit) {
        (&[plus], Some(digit)) => digit == plus + 1,
        _ => false,
    };

    Ok(Scan {
        digits,
        international_shape,
    })
}
