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

//! The conventional classifier schema.
//!
//! Metadata is free to carry any set of classifier types, but blobs built by
//! the standard pipeline use a small conventional vocabulary; this module
//! names it and offers ready-made typed views for it.

use crate::classifier::typed::{TypedMatcher, TypedSingleValued};
use crate::classifier::RawClassifier;
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString};

/// The semantic category of a number, e.g. mobile or toll-free.
pub const TYPE: &str = "TYPE";

/// The CLDR region a number belongs to.
pub const REGION: &str = "REGION";

/// The pseudo-type whose value names are national format specifiers.
pub const NATIONAL_FORMAT: &str = "NATIONAL_FORMAT";

/// The pseudo-type whose value names are international format specifiers.
pub const INTERNATIONAL_FORMAT: &str = "INTERNATIONAL_FORMAT";

/// The conventional values of the [`TYPE`] classifier.
///
/// The string forms are the raw metadata values, e.g.
/// `FIXED_LINE_OR_MOBILE` for [`NumberType::FixedLineOrMobile`].
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, AsRefStr, EnumIter, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberType {
    /// Traditional landline numbers, tied to a geographic location.
    FixedLine,

    /// Numbers assigned to wireless devices.
    Mobile,

    /// Used in regions (e.g. the USA) where fixed-line and mobile numbers
    /// cannot be told apart by the number alone.
    FixedLineOrMobile,

    /// Freephone lines, paid for by the recipient.
    TollFree,

    /// Lines charged above standard rate.
    PremiumRate,

    /// Calls whose cost is shared between caller and recipient.
    SharedCost,

    /// A number tied to a person rather than a line, routed to a mobile or
    /// fixed line as configured.
    PersonalNumber,

    /// Voice over IP numbers.
    Voip,

    /// Pager numbers.
    Pager,

    /// Universal access numbers, routed onward by a company.
    Uan,

    /// Voicemail access numbers.
    Voicemail,
}

/// A typed view of the [`TYPE`] classifier.
///
/// Identification-only: standard blobs elide the largest `TYPE` matcher in
/// favour of a default value, which rules out value-level matching.
///
/// # Panics
///
/// Panics when the loaded metadata carries no `TYPE` classifier, carries a
/// value outside [`NumberType`], or does not treat it as single-valued.
pub fn number_type(classifier: &RawClassifier) -> TypedSingleValued<NumberType> {
    TypedSingleValued::new(
        classifier,
        TYPE,
        |raw| NumberType::from_str(raw).ok(),
        |value| value.as_ref().to_owned(),
    )
}

/// A typed view of the [`REGION`] classifier, with regions as plain
/// strings.
///
/// # Panics
///
/// Panics when the loaded metadata carries no `REGION` classifier or treats
/// it as classifier-only.
pub fn region(classifier: &RawClassifier) -> TypedMatcher<String> {
    TypedMatcher::new(
        classifier,
        REGION,
        |raw| Some(raw.to_owned()),
        String::clone,
    )
}
