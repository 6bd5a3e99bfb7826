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

//! Classification of national numbers.

pub mod typed;

use crate::calling_code::CallingCode;
use crate::digits::DigitSequence;
use crate::error::ParseError;
use crate::formatter::{self, FormatType};
use crate::matcher::{LengthResult, MatchResult};
use crate::metadata::{CallingCodeRecord, Registry, ValueMatcher};
use crate::parser::{self, ParseHint, PhoneNumberResult};
use crate::phone_number::PhoneNumber;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The string-level classifier over a loaded registry.
///
/// All queries are keyed by `(calling code, national number)`; the typed
/// wrappers in [`typed`] sit on top of this and deal in enums instead of raw
/// value strings.
///
/// Cloning is cheap: clones share the registry.
///
/// # Panics
///
/// Methods taking a calling code or a type name treat an unsupported calling
/// code or an unknown type as a caller bug and panic with a diagnostic;
/// check [`RawClassifier::is_supported`] and
/// [`RawClassifier::supported_types`] first when the input is not known to
/// be good. Outcomes that depend on the *number* are never panics.
#[derive(Clone, Debug)]
pub struct RawClassifier {
    registry: Arc<Registry>,
}

impl RawClassifier {
    /// Wrap a loaded registry.
    pub fn new(registry: Arc<Registry>) -> RawClassifier {
        RawClassifier { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The calling codes the loaded metadata covers.
    pub fn supported_calling_codes(&self) -> &[CallingCode] {
        self.registry.calling_codes()
    }

    /// Whether the loaded metadata covers a calling code.
    pub fn is_supported(&self, code: CallingCode) -> bool {
        self.registry.record(code).is_some()
    }

    /// The classifier types the loaded metadata carries, in declaration
    /// order.
    pub fn supported_types(&self) -> &[String] {
        self.registry.types()
    }

    /// Whether a type assigns at most one value to any number.
    pub fn is_single_valued(&self, type_name: &str) -> bool {
        self.registry.is_single_valued(self.type_index(type_name))
    }

    /// Whether a type supports matching individual values. Classifier-only
    /// types do not: their largest matcher was elided from the data.
    pub fn supports_value_matcher(&self, type_name: &str) -> bool {
        !self.registry.is_classifier_only(self.type_index(type_name))
    }

    /// Match a national number against the calling code's validity matcher.
    pub fn match_number(&self, code: CallingCode, national: DigitSequence) -> MatchResult {
        self.record(code).validity.match_digits(&national)
    }

    /// Classify only the length of a national number.
    pub fn test_length(&self, code: CallingCode, national: DigitSequence) -> LengthResult {
        self.record(code).validity.test_length(&national)
    }

    /// The values of the given type assigned to a national number.
    ///
    /// Empty unless the number fully matches the validity matcher. For
    /// single-valued types the result holds at most one value.
    pub fn classify(
        &self,
        code: CallingCode,
        national: DigitSequence,
        type_name: &str,
    ) -> BTreeSet<String> {
        let index = self.type_index(type_name);
        let record = self.record(code);

        if !record.validity.is_match(&national) {
            return BTreeSet::new();
        }

        let matcher = &record.type_matchers[index];

        if self.registry.is_single_valued(index) {
            self.assigned_value(matcher, national).into_iter().collect()
        } else {
            let matched: BTreeSet<String> = matcher
                .values
                .iter()
                .filter(|(_, matcher)| matcher.is_match(&national))
                .map(|(name, _)| name.clone())
                .collect();

            if matched.is_empty() {
                matcher.default_value.iter().cloned().collect()
            } else {
                matched
            }
        }
    }

    /// The single value of a single-valued type assigned to a national
    /// number, if any.
    ///
    /// # Panics
    ///
    /// Panics when the type is not single-valued.
    pub fn classify_uniquely(
        &self,
        code: CallingCode,
        national: DigitSequence,
        type_name: &str,
    ) -> Option<String> {
        let index = self.type_index(type_name);

        assert!(
            self.registry.is_single_valued(index),
            "type {:?} is not single-valued",
            type_name
        );

        let record = self.record(code);

        if !record.validity.is_match(&national) {
            return None;
        }

        self.assigned_value(&record.type_matchers[index], national)
    }

    /// The first explicitly matching value, or the default.
    fn assigned_value(&self, matcher: &ValueMatcher, national: DigitSequence) -> Option<String> {
        matcher
            .values
            .iter()
            .find(|(_, matcher)| matcher.is_match(&national))
            .map(|(name, _)| name.clone())
            .or_else(|| matcher.default_value.clone())
    }

    /// A handle for matching individual values of a type under one calling
    /// code.
    ///
    /// # Panics
    ///
    /// Panics when the type is classifier-only, since partial matching is
    /// undefined once a matcher has been elided from the data.
    pub fn value_matcher(&self, code: CallingCode, type_name: &str) -> ValueMatcherHandle<'_> {
        let index = self.type_index(type_name);

        assert!(
            !self.registry.is_classifier_only(index),
            "type {:?} is classifier-only and cannot match values",
            type_name
        );

        ValueMatcherHandle {
            matcher: &self.record(code).type_matchers[index],
            type_name: self.registry.types()[index].as_str(),
        }
    }

    /// The union of a type's values over every supported calling code.
    pub fn possible_values(&self, type_name: &str) -> &BTreeSet<String> {
        self.registry.possible_values(self.type_index(type_name))
    }

    /// The regions of a calling code, the main region first.
    pub fn regions(&self, code: CallingCode) -> &[String] {
        &self.record(code).regions
    }

    /// The main region of a calling code.
    pub fn main_region(&self, code: CallingCode) -> Option<&str> {
        self.record(code).regions.first().map(String::as_str)
    }

    /// The calling code a region belongs to, or `None` for unknown regions
    /// and for the synthetic world region "001".
    pub fn calling_code_for_region(&self, region: &str) -> Option<CallingCode> {
        self.registry.code_for_region(region)
    }

    /// The national prefixes of a calling code.
    pub fn national_prefixes(&self, code: CallingCode) -> &[DigitSequence] {
        &self.record(code).national_prefixes
    }

    /// Whether the calling code's national prefixes may be omitted when
    /// dialling nationally.
    pub fn national_prefix_optional(&self, code: CallingCode) -> bool {
        self.record(code).national_prefix_optional
    }

    /// An example number for a calling code, when the metadata carries one.
    pub fn example_number(&self, code: CallingCode) -> Option<PhoneNumber> {
        self.record(code)
            .example_number
            .map(|national| PhoneNumber::new(code, national))
    }

    /// Parse free-form text, discarding the reason on failure.
    pub fn parse_leniently(&self, text: &str, hint: Option<ParseHint<'_>>) -> Option<PhoneNumber> {
        parser::parse_leniently(self, text, hint)
    }

    /// Parse free-form text into a number, its match quality and the format
    /// it was written in.
    pub fn parse_strictly(
        &self,
        text: &str,
        hint: Option<ParseHint<'_>>,
    ) -> Result<PhoneNumberResult, ParseError> {
        parser::parse_strictly(self, text, hint)
    }

    /// Render a number in the requested format.
    pub fn format(&self, number: &PhoneNumber, format: FormatType) -> String {
        formatter::format(self, number, format)
    }

    pub(crate) fn record(&self, code: CallingCode) -> &CallingCodeRecord {
        match self.registry.record(code) {
            Some(record) => record,
            None => panic!("calling code {} is not in the loaded metadata", code),
        }
    }

    fn type_index(&self, type_name: &str) -> usize {
        match self.registry.type_index(type_name) {
            Some(index) => index,
            None => panic!(
                "unknown classifier type {:?}, supported types are {:?}",
                type_name,
                self.registry.types()
            ),
        }
    }
}

/// Value-level matching for one `(calling code, type)` pair.
#[derive(Clone, Copy, Debug)]
pub struct ValueMatcherHandle<'a> {
    matcher: &'a ValueMatcher,
    type_name: &'a str,
}

impl<'a> ValueMatcherHandle<'a> {
    /// Match a national number against the matcher of one value.
    ///
    /// # Panics
    ///
    /// Panics when `value` is not a possible value of the type under this
    /// calling code.
    pub fn match_value(&self, national: DigitSequence, value: &str) -> MatchResult {
        match self.matcher.get(value) {
            Some(matcher) => matcher.match_digits(&national),
            None => panic!(
                "{:?} is not a possible value of type {:?} here",
                value, self.type_name
            ),
        }
    }

    /// The values this matcher can produce, in declaration order.
    pub fn possible_values(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.matcher.possible_values()
    }
}
