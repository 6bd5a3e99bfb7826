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

//! Typed views over the raw string classifier.
//!
//! A typed wrapper pairs one classifier type with a caller-supplied value
//! type `V`, converting through a `(to_value, to_string)` function pair that
//! is checked for bijectivity against the metadata once, at construction.
//! After that the wrapper holds a dense table of `(raw string, V)` pairs and
//! never hashes or converts again.
//!
//! Which wrapper can be built depends on the metadata: value matching needs
//! a type that is not classifier-only, and identification needs a
//! single-valued type. The checks run at construction so a handed-out
//! wrapper can always deliver its whole API.

use crate::classifier::RawClassifier;
use crate::matcher::MatchResult;
use crate::phone_number::PhoneNumber;
use std::collections::BTreeSet;

/// Classification into typed values.
pub trait Classifier<V> {
    /// The values assigned to a number; empty unless the number is valid.
    fn classify(&self, number: &PhoneNumber) -> BTreeSet<V>;
}

/// Value-level matching on top of classification.
pub trait Matcher<V>: Classifier<V> {
    /// The values whose matchers accept the number or could still accept an
    /// extension of it.
    fn possible_values(&self, number: &PhoneNumber) -> BTreeSet<V>;

    /// Match the number against the union of the given values' matchers.
    /// Values the metadata does not know are permitted and never match.
    fn match_values(&self, number: &PhoneNumber, values: &[V]) -> MatchResult;
}

/// Identification for types that assign at most one value.
pub trait SingleValuedClassifier<V>: Classifier<V> {
    /// The single value assigned to the number, if any.
    fn identify(&self, number: &PhoneNumber) -> Option<V>;
}

/// The conversion table shared by every wrapper shape.
#[derive(Clone, Debug)]
struct Core<V> {
    classifier: RawClassifier,
    type_name: String,
    values: Vec<(String, V)>,
}

impl<V: Clone + Ord> Core<V> {
    fn new(
        classifier: &RawClassifier,
        type_name: &str,
        to_value: impl Fn(&str) -> Option<V>,
        to_string: impl Fn(&V) -> String,
    ) -> Core<V> {
        let values = classifier
            .possible_values(type_name)
            .iter()
            .map(|raw| {
                let value = match to_value(raw) {
                    Some(value) => value,
                    None => panic!(
                        "type {:?}: metadata value {:?} has no typed counterpart",
                        type_name, raw
                    ),
                };

                assert!(
                    to_string(&value) == *raw,
                    "type {:?}: conversion of {:?} does not round-trip",
                    type_name,
                    raw
                );

                (raw.clone(), value)
            })
            .collect();

        Core {
            classifier: classifier.clone(),
            type_name: type_name.to_owned(),
            values,
        }
    }

    fn typed(&self, raw: &str) -> V {
        match self.values.iter().find(|(name, _)| name == raw) {
            Some((_, value)) => value.clone(),
            None => panic!(
                "type {:?}: classifier produced unknown value {:?}",
                self.type_name, raw
            ),
        }
    }

    fn raw(&self, value: &V) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, typed)| typed == value)
            .map(|(name, _)| name.as_str())
    }

    fn classify(&self, number: &PhoneNumber) -> BTreeSet<V> {
        self.classifier
            .classify(number.code(), number.national(), &self.type_name)
            .iter()
            .map(|raw| self.typed(raw))
            .collect()
    }

    fn possible_values(&self, number: &PhoneNumber) -> BTreeSet<V> {
        let handle = self
            .classifier
            .value_matcher(number.code(), &self.type_name);

        self.values
            .iter()
            .filter(|(raw, _)| {
                // Defaults are absent from the handle: their matcher was
                // never in the data.
                handle.possible_values().any(|name| name == raw.as_str())
                    && handle.match_value(number.national(), raw) <= MatchResult::PartialMatch
            })
            .map(|(_, value)| value.clone())
            .collect()
    }

    fn match_values(&self, number: &PhoneNumber, values: &[V]) -> MatchResult {
        let handle = self
            .classifier
            .value_matcher(number.code(), &self.type_name);

        values
            .iter()
            .filter_map(|value| self.raw(value))
            // Values the metadata does not carry under this calling code
            // contribute nothing, like values outside the metadata entirely.
            .filter(|raw| handle.possible_values().any(|name| name == *raw))
            .fold(MatchResult::Invalid, |best, raw| {
                best.combine(handle.match_value(number.national(), raw))
            })
    }

    fn identify(&self, number: &PhoneNumber) -> Option<V> {
        self.classifier
            .classify_uniquely(number.code(), number.national(), &self.type_name)
            .map(|raw| self.typed(&raw))
    }
}

macro_rules! constructor {
    ($name:ident) => {
        /// Build the wrapper, checking the conversion pair against every
        /// value the metadata can produce for this type.
        ///
        /// # Panics
        ///
        /// Panics when the type is unknown, when the metadata does not
        /// support this wrapper shape, or when the conversion pair fails to
        /// round-trip some metadata value.
        pub fn new(
            classifier: &RawClassifier,
            type_name: &str,
            to_value: impl Fn(&str) -> Option<V>,
            to_string: impl Fn(&V) -> String,
        ) -> $name<V> {
            Self::check(classifier, type_name);

            $name {
                core: Core::new(classifier, type_name, to_value, to_string),
            }
        }
    };
}

/// A classifier for any type; the least capable wrapper shape.
#[derive(Clone, Debug)]
pub struct TypedClassifier<V> {
    core: Core<V>,
}

impl<V: Clone + Ord> TypedClassifier<V> {
    constructor!(TypedClassifier);

    fn check(_classifier: &RawClassifier, _type_name: &str) {}
}

impl<V: Clone + Ord> Classifier<V> for TypedClassifier<V> {
    fn classify(&self, number: &PhoneNumber) -> BTreeSet<V> {
        self.core.classify(number)
    }
}

/// A classifier that can also match individual values. Requires a type that
/// is not classifier-only.
#[derive(Clone, Debug)]
pub struct TypedMatcher<V> {
    core: Core<V>,
}

impl<V: Clone + Ord> TypedMatcher<V> {
    constructor!(TypedMatcher);

    fn check(classifier: &RawClassifier, type_name: &str) {
        assert!(
            classifier.supports_value_matcher(type_name),
            "type {:?} does not support value matching",
            type_name
        );
    }
}

impl<V: Clone + Ord> Classifier<V> for TypedMatcher<V> {
    fn classify(&self, number: &PhoneNumber) -> BTreeSet<V> {
        self.core.classify(number)
    }
}

impl<V: Clone + Ord> Matcher<V> for TypedMatcher<V> {
    fn possible_values(&self, number: &PhoneNumber) -> BTreeSet<V> {
        self.core.possible_values(number)
    }

    fn match_values(&self, number: &PhoneNumber, values: &[V]) -> MatchResult {
        self.core.match_values(number, values)
    }
}

/// A classifier that can identify the unique value of a number. Requires a
/// single-valued type.
#[derive(Clone, Debug)]
pub struct TypedSingleValued<V> {
    core: Core<V>,
}

impl<V: Clone + Ord> TypedSingleValued<V> {
    constructor!(TypedSingleValued);

    fn check(classifier: &RawClassifier, type_name: &str) {
        assert!(
            classifier.is_single_valued(type_name),
            "type {:?} is not single-valued",
            type_name
        );
    }
}

impl<V: Clone + Ord> Classifier<V> for TypedSingleValued<V> {
    fn classify(&self, number: &PhoneNumber) -> BTreeSet<V> {
        self.core.classify(number)
    }
}

impl<V: Clone + Ord> SingleValuedClassifier<V> for TypedSingleValued<V> {
    fn identify(&self, number: &PhoneNumber) -> Option<V> {
        self.core.identify(number)
    }
}

/// The most capable wrapper shape: identification and value matching in
/// one. Requires a single-valued type that is not classifier-only.
#[derive(Clone, Debug)]
pub struct TypedSingleValuedMatcher<V> {
    core: Core<V>,
}

impl<V: Clone + Ord> TypedSingleValuedMatcher<V> {
    constructor!(TypedSingleValuedMatcher);

    fn check(classifier: &RawClassifier, type_name: &str) {
        TypedSingleValued::<V>::check(classifier, type_name);
        TypedMatcher::<V>::check(classifier, type_name);
    }
}

impl<V: Clone + Ord> Classifier<V> for TypedSingleValuedMatcher<V> {
    fn classify(&self, number: &PhoneNumber) -> BTreeSet<V> {
        self.core.classify(number)
    }
}

impl<V: Clone + Ord> Matcher<V> for TypedSingleValuedMatcher<V> {
    fn possible_values(&self, number: &PhoneNumber) -> BTreeSet<V> {
        self.core.possible_values(number)
    }

    fn match_values(&self, number: &PhoneNumber, values: &[V]) -> MatchResult {
        self.core.match_values(number, values)
    }
}

impl<V: Clone + Ord> SingleValuedClassifier<V> for TypedSingleValuedMatcher<V> {
    fn identify(&self, number: &PhoneNumber) -> Option<V> {
        self.core.identify(number)
    }
}
