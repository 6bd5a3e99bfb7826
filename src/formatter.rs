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

//! Rendering numbers into human-readable form.
//!
//! Format specifiers travel in the metadata as the *value names* of two
//! pseudo-types, one per format; the value's matcher describes which numbers
//! the specifier applies to. A specifier is a compact byte string: group
//! tokens consume digits from the national number, everything else is
//! emitted literally.

use crate::classifier::RawClassifier;
use crate::digits::DigitSequence;
use crate::matcher::MatchResult;
use crate::metadata::ValueMatcher;
use crate::phone_number::PhoneNumber;
use crate::schema;
use log::warn;

/// The two supported output formats.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FormatType {
    /// The form dialled within the number's own country.
    National,

    /// The form dialled from abroad, prefixed by `+` and the calling code.
    International,
}

/// Group-token type codes, bits 3..=5 of a group byte.
const PLAIN: u8 = 0;
const GROUP_THEN_SPACE: u8 = 1;
const GROUP_THEN_HYPHEN: u8 = 2;
const OPTIONAL: u8 = 4;
const PARENTHESIZED: u8 = 5;
const IGNORED: u8 = 6;

/// The reserved carrier-code marker. Carrier insertion is not implemented;
/// the marker renders as a literal `@` placeholder.
const CARRIER_MARKER: u8 = 0x3E;

/// The escape byte: whatever follows is emitted literally.
const RAW_ASCII: u8 = 0x3F;

/// Render a number in the requested format.
///
/// # Panics
///
/// Panics when the number's calling code is not in the loaded metadata.
pub fn format(classifier: &RawClassifier, number: &PhoneNumber, format: FormatType) -> String {
    let national = number.national();
    let specifier = select_specifier(classifier, number, format);
    let rendered = render(specifier, national);

    match format {
        FormatType::National => rendered,
        FormatType::International => format!("+{} {}", number.code(), rendered),
    }
}

/// Pick the best-matching specifier for the number, or the empty specifier
/// when the metadata assigns none.
fn select_specifier<'a>(
    classifier: &'a RawClassifier,
    number: &PhoneNumber,
    format: FormatType,
) -> &'a str {
    let national = number.national();
    let mut matcher = specifiers(classifier, number, format);

    if format == FormatType::National && matcher.map_or(true, |m| m.values.is_empty()) {
        warn!(
            "no national format specifiers for calling code {}, using international",
            number.code()
        );
        matcher = specifiers(classifier, number, FormatType::International);
    }

    let matcher = match matcher {
        Some(matcher) => matcher,
        None => return "",
    };

    let mut best = MatchResult::Invalid;
    let mut specifier = "";

    for (name, value_matcher) in &matcher.values {
        let result = value_matcher.match_digits(&national);

        if result.is_better_than(best) {
            best = result;
            specifier = name;
        }

        if best == MatchResult::Matched {
            break;
        }
    }

    // A valid number that no specifier claimed renders as bare digits
    // rather than through a specifier meant for different numbers.
    if best != MatchResult::Matched && !specifier.is_empty() {
        let validity = classifier
            .record(number.code())
            .validity
            .match_digits(&national);

        if validity.is_better_than(best) {
            specifier = "";
        }
    }

    specifier
}

fn specifiers<'a>(
    classifier: &'a RawClassifier,
    number: &PhoneNumber,
    format: FormatType,
) -> Option<&'a ValueMatcher> {
    let type_name = match format {
        FormatType::National => schema::NATIONAL_FORMAT,
        FormatType::International => schema::INTERNATIONAL_FORMAT,
    };

    let index = classifier.registry().type_index(type_name)?;

    Some(&classifier.record(number.code()).type_matchers[index])
}

/// Interpret a specifier over the digits of a national number.
///
/// The specifier is carried as a string, but only the low eight bits of
/// each character matter. Once the specifier is exhausted any digits left
/// over are appended verbatim; an empty specifier renders the plain decimal
/// form.
fn render(specifier: &str, national: DigitSequence) -> String {
    if specifier.is_empty() {
        return national.to_string();
    }

    let bytes: Vec<u8> = specifier.chars().map(|c| (c as u32 & 0xFF) as u8).collect();

    // Optional groups soak up the digits the mandatory groups leave over,
    // so their budget needs a scan of the whole specifier up front.
    let mut group_digits = 0usize;
    let mut optional_digits = 0usize;
    let mut cursor = 0;

    while cursor < bytes.len() {
        let byte = bytes[cursor];
        cursor += 1;

        if byte == RAW_ASCII {
            cursor += 1;
        } else if is_group(byte) {
            group_digits += group_length(byte);

            if group_type(byte) == OPTIONAL {
                optional_digits += group_length(byte);
            }
        }
    }

    let mut budget = national
        .len()
        .saturating_sub(group_digits - optional_digits);

    let mut out = String::new();
    let mut digits = national.iter();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let byte = bytes[cursor];
        cursor += 1;

        if byte == RAW_ASCII {
            if let Some(&literal) = bytes.get(cursor) {
                out.push(char::from(literal));
                cursor += 1;
            }
        } else if byte == CARRIER_MARKER {
            out.push('@');
        } else if is_group(byte) {
            let length = group_length(byte);

            match group_type(byte) {
                PLAIN => take(&mut out, &mut digits, length),

                GROUP_THEN_SPACE | GROUP_THEN_HYPHEN => {
                    take(&mut out, &mut digits, length);

                    if digits.clone().next().is_some() {
                        out.push(if group_type(byte) == GROUP_THEN_SPACE { ' ' } else { '-' });
                    }
                }

                OPTIONAL => {
                    let taken = length.min(budget);
                    budget -= taken;
                    take(&mut out, &mut digits, taken);
                }

                PARENTHESIZED => {
                    out.push('(');
                    take(&mut out, &mut digits, length);
                    out.push(')');
                }

                IGNORED => {
                    for _ in 0..length {
                        digits.next();
                    }
                }

                code => panic!("corrupt format specifier: group type {}", code),
            }
        } else {
            out.push(char::from(byte));
        }
    }

    for digit in digits {
        out.push(char::from(b'0' + digit));
    }

    out
}

fn is_group(byte: u8) -> bool {
    byte & 0xC0 == 0x40
}

fn group_type(byte: u8) -> u8 {
    byte >> 3 & 0x07
}

fn group_length(byte: u8) -> usize {
    usize::from(byte & 0x07) + 1
}

fn take(out: &mut String, digits: &mut impl Iterator<Item = u8>, count: usize) {
    for digit in digits.take(count) {
        out.push(char::from(b'0' + digit));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn seq(s: &str) -> DigitSequence {
        s.parse().unwrap()
    }

    /// Build a group byte from its type code and digit count.
    fn group(kind: u8, length: usize) -> char {
        char::from(0x40 | kind << 3 | (length as u8 - 1))
    }

    #[test]
    fn empty_specifier_renders_plain_digits() {
        assert_eq!("2087438000", render("", seq("2087438000")));
    }

    #[test]
    fn plain_groups_and_literals() {
        let spec = format!("0{} {}", group(PLAIN, 2), group(PLAIN, 4));

        assert_eq!("020 8743", render(&spec, seq("208743")));
    }

    #[test]
    fn space_and_hyphen_groups_separate_only_inside_the_number() {
        let spec = format!("{}{}", group(GROUP_THEN_SPACE, 2), group(GROUP_THEN_HYPHEN, 4));

        assert_eq!("20 8743-8000", render(&spec, seq("2087438000")));
        // Nothing follows, so no trailing separators.
        assert_eq!("20 8743", render(&spec, seq("208743")));
        assert_eq!("20", render(&spec, seq("20")));
    }

    #[test]
    fn parenthesized_group() {
        let spec = format!("{} {}", group(PARENTHESIZED, 3), group(PLAIN, 4));

        assert_eq!("(650) 2123", render(&spec, seq("6502123")));
    }

    #[test]
    fn ignored_group_discards_digits() {
        let spec = format!("{}0{}", group(IGNORED, 1), group(PLAIN, 2));

        assert_eq!("011", render(&spec, seq("911")));
    }

    #[test]
    fn optional_group_takes_only_surplus_digits() {
        // One optional digit ahead of two mandatory pairs.
        let spec = format!(
            "{}{}{}",
            group(OPTIONAL, 1),
            group(GROUP_THEN_SPACE, 2),
            group(PLAIN, 2)
        );

        // Five digits: the optional group gets its one.
        assert_eq!("912 34", render(&spec, seq("91234")));
        // Four digits: no surplus, the optional group consumes nothing.
        assert_eq!("12 34", render(&spec, seq("1234")));
    }

    #[test]
    fn carrier_marker_renders_a_placeholder() {
        let spec = format!("{}\u{3E}{}", group(PLAIN, 2), group(PLAIN, 2));

        assert_eq!("12@34", render(&spec, seq("1234")));
    }

    #[test]
    fn raw_ascii_escape_emits_the_next_byte() {
        // An escaped 'A' (0x41) must not be decoded as a group token.
        let spec = format!("{}\u{3F}A{}", group(PLAIN, 2), group(PLAIN, 2));

        assert_eq!("12A34", render(&spec, seq("1234")));
    }

    #[test]
    fn leftover_digits_are_appended_verbatim() {
        let spec = format!("{} ", group(PLAIN, 2));

        assert_eq!("12 3456", render(&spec, seq("123456")));
    }

    #[test]
    fn short_input_stops_mid_specifier() {
        let spec = format!("{} {}", group(PLAIN, 3), group(PLAIN, 4));

        assert_eq!("12 ", render(&spec, seq("12")));
    }

    #[test]
    #[should_panic(expected = "corrupt format specifier")]
    fn unknown_group_type_aborts() {
        render(&format!("{}", group(3, 2)), seq("1234"));
    }
}
