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

//! The wire form of the metadata blob.
//!
//! The offline metadata compiler emits these structures; the runtime decodes
//! them and immediately lifts them into the checked [`super::Registry`].
//! Strings are interned in a single token table and referenced everywhere
//! else by index, with index zero reserved for the empty string so that an
//! unset token can never collide with a real one.
//!
//! The framing is bincode with varint integers. Both directions go through
//! the same options so a writer and a reader cannot drift apart.

use crate::error;
use bincode::Options;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// The schema this build of the library reads.
pub const SCHEMA_URI: &str = "dialplan/compact-classifier";

/// The schema revision this build of the library was written against.
pub const SCHEMA_VERSION: u32 = 1;

/// The oldest data version this build of the library accepts.
pub const MAJOR_DATA_VERSION: u32 = 1;
pub const MINOR_DATA_VERSION: u32 = 0;

/// The version a blob must satisfy to be loaded by this build.
pub fn required_version() -> VersionInfo {
    VersionInfo {
        schema_uri: SCHEMA_URI.into(),
        schema_version: SCHEMA_VERSION,
        major_data: MAJOR_DATA_VERSION,
        minor_data: MINOR_DATA_VERSION,
    }
}

/// Versioning of a metadata blob.
///
/// The schema identifies the layout of the data; the data version identifies
/// the snapshot of the world's numbering plans it was compiled from.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default, Debug)]
pub struct VersionInfo {
    pub schema_uri: String,
    pub schema_version: u32,
    pub major_data: u32,
    pub minor_data: u32,
}

impl VersionInfo {
    /// Whether data of this version can be consumed by code requiring
    /// `required`: same schema URI, same major data version, and at least the
    /// required schema and minor data versions.
    pub fn satisfies(&self, required: &VersionInfo) -> bool {
        self.schema_uri == required.schema_uri
            && self.schema_version >= required.schema_version
            && self.major_data == required.major_data
            && self.minor_data >= required.minor_data
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} data {}.{}",
            self.schema_uri, self.schema_version, self.major_data, self.minor_data
        )
    }
}

/// A complete metadata blob as it appears on the wire.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct MetadataBlob {
    pub version: VersionInfo,

    /// Token indices naming the classifier types, e.g. "TYPE" or "REGION".
    /// At most 32, so the two masks below fit a word.
    pub types: Vec<u32>,

    /// Bit `n` set when type `n` assigns at most one value to a number.
    pub single_valued_mask: u32,

    /// Bit `n` set when type `n` can only classify complete numbers, not
    /// match partial ones. Such types had their largest sub-matcher elided
    /// and replaced by a default value.
    pub classifier_only_mask: u32,

    pub calling_codes: Vec<CallingCodeBlob>,

    /// The token table. Index zero must hold the empty string.
    pub tokens: Vec<String>,
}

/// Per-calling-code data.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct CallingCodeBlob {
    /// The calling code, 1..=999, from the global assignment set.
    pub calling_code: u16,

    /// Pool indices making up the validity matcher. Empty means `[0]`; by
    /// convention the pool's first entry is always the validity matcher, so
    /// single-matcher records need not spell it out.
    pub validity: Vec<u32>,

    /// Per-type value matchers, index-aligned with `MetadataBlob::types`.
    pub type_values: Vec<TypeValuesBlob>,

    /// The matcher pool shared by the validity and value matchers above.
    pub pool: Vec<MatcherBlob>,

    /// Region-name token indices, the main region first. The synthetic world
    /// region "001" must stand alone.
    pub regions: Vec<u32>,

    /// National-prefix token indices, each a plain digit string.
    pub national_prefixes: Vec<u32>,

    /// Whether a national prefix may be omitted when dialling nationally.
    /// Meaningless (and treated as set) when there are no prefixes.
    pub national_prefix_optional: bool,

    /// Token index of an example national number; zero when absent.
    pub example_number: u32,
}

/// The values of one classifier type for one calling code.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct TypeValuesBlob {
    /// Token index of the default value assigned when the validity matcher
    /// accepts a number that no explicit value matches; zero when absent.
    /// Present only for classifier-only types.
    pub default_value: u32,

    /// Explicit values in declaration order.
    pub values: Vec<ValueBlob>,
}

/// One value of a classifier type and the matchers recognising it.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct ValueBlob {
    /// Token index of the value name.
    pub name: u32,

    /// Pool indices of the matchers for this value; more than one forms a
    /// union.
    pub matchers: Vec<u32>,
}

/// A single compiled matcher.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct MatcherBlob {
    /// Bit `n` set when some accepted sequence has length `n`.
    pub length_mask: u32,

    /// Byte-coded machine; empty means the matcher that accepts nothing.
    pub bytes: Vec<u8>,
}

fn options() -> impl Options {
    bincode::options().with_varint_encoding()
}

/// Decode a blob from its wire form.
pub fn from_bytes(bytes: &[u8]) -> Result<MetadataBlob, error::LoadError> {
    Ok(options().deserialize(bytes)?)
}

/// Encode a blob to its wire form.
pub fn to_bytes(blob: &MetadataBlob) -> Result<Vec<u8>, error::LoadError> {
    Ok(options().serialize(blob)?)
}
