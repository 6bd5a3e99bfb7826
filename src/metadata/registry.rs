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
use crate::error::LoadError;
use crate::matcher::{Dfa, Matcher};
use crate::metadata::loader::{self, MetadataBlob, VersionInfo};
use fnv::FnvHashMap;
use itertools::Itertools;
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The synthetic region for calling codes not tied to a country, such as
/// international toll-free numbers. It never appears in the region lookup
/// and never coexists with real regions on one calling code.
pub const WORLD_REGION: &str = "001";

/// The in-memory registry decoded from a metadata blob.
///
/// Built once, validated in full, and immutable afterwards; every classifier
/// and parser shares it by reference. A failed build leaves nothing behind.
#[derive(Debug)]
pub struct Registry {
    version: VersionInfo,
    types: Vec<String>,
    single_valued_mask: u32,
    classifier_only_mask: u32,
    codes: Vec<CallingCode>,
    records: FnvHashMap<u16, CallingCodeRecord>,
    type_index: FnvHashMap<String, usize>,
    region_to_code: FnvHashMap<String, CallingCode>,
    possible_values: Vec<BTreeSet<String>>,
}

/// Everything the runtime knows about one calling code.
#[derive(Debug)]
pub(crate) struct CallingCodeRecord {
    /// Matcher for the union of all valid national numbers.
    pub(crate) validity: Arc<Matcher>,

    /// Per-type value matchers, index-aligned with the registry's type list.
    pub(crate) type_matchers: Vec<ValueMatcher>,

    /// Region codes, the main region first.
    pub(crate) regions: Vec<String>,

    /// Prefixes dialled in front of the national number domestically.
    pub(crate) national_prefixes: Vec<DigitSequence>,

    /// Whether the prefixes above may be omitted. Always set when there are
    /// no prefixes.
    pub(crate) national_prefix_optional: bool,

    /// An example valid national number.
    pub(crate) example_number: Option<DigitSequence>,
}

/// The value-to-matcher mapping of one classifier type for one calling code.
#[derive(Debug)]
pub(crate) struct ValueMatcher {
    /// Values in declaration order, each with the matcher recognising it.
    pub(crate) values: Vec<(String, Arc<Matcher>)>,

    /// The value assigned when the number is valid but no explicit value
    /// matches. Its matcher was elided from the data.
    pub(crate) default_value: Option<String>,
}

impl ValueMatcher {
    /// The matcher for a specific value, if that value is explicit.
    pub fn get(&self, value: &str) -> Option<&Matcher> {
        self.values
            .iter()
            .find(|(name, _)| name == value)
            .map(|(_, matcher)| &**matcher)
    }

    /// All values this matcher can produce, explicit ones first in
    /// declaration order, then the default.
    pub fn possible_values(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(self.default_value.as_deref())
    }
}

/// The token table with bounds-checked access.
struct Tokens<'a>(&'a [String]);

impl<'a> Tokens<'a> {
    fn get(&self, index: u32, context: &'static str) -> Result<&'a str, LoadError> {
        self.0
            .get(index as usize)
            .map(String::as_str)
            .ok_or(LoadError::BadTokenIndex { context, index })
    }
}

impl Registry {
    /// Decode and validate a metadata blob from its wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Registry, LoadError> {
        Registry::from_blob(loader::from_bytes(bytes)?)
    }

    /// Validate an already decoded metadata blob.
    pub fn from_blob(blob: MetadataBlob) -> Result<Registry, LoadError> {
        let required = loader::required_version();

        if !blob.version.satisfies(&required) {
            return Err(LoadError::UnsupportedVersion {
                got: blob.version.to_string(),
                need: required.to_string(),
            });
        }

        let MetadataBlob {
            version,
            types: type_tokens,
            single_valued_mask,
            classifier_only_mask,
            calling_codes,
            tokens: token_table,
        } = blob;

        match token_table.first() {
            Some(first) if !first.is_empty() => {
                return Err(LoadError::ReservedToken(first.clone()))
            }
            None => {
                return Err(LoadError::BadTokenIndex {
                    context: "token table",
                    index: 0,
                })
            }
            _ => {}
        }

        if let Some(duplicate) = token_table.iter().duplicates().next() {
            return Err(LoadError::DuplicateToken(duplicate.clone()));
        }

        if type_tokens.len() > 32 {
            return Err(LoadError::TooManyTypes(type_tokens.len()));
        }

        let tokens = Tokens(&token_table);

        let types = type_tokens
            .iter()
            .map(|&index| tokens.get(index, "type list").map(str::to_owned))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(duplicate) = types.iter().duplicates().next() {
            return Err(LoadError::DuplicateToken(duplicate.clone()));
        }

        let mut codes = Vec::with_capacity(calling_codes.len());
        let mut records = FnvHashMap::default();
        let mut region_to_code = FnvHashMap::default();
        let mut possible_values = vec![BTreeSet::new(); types.len()];

        for entry in calling_codes {
            let cc = entry.calling_code;
            let code =
                CallingCode::new(cc).map_err(|_| LoadError::UnknownCallingCode(cc))?;

            let pool = entry
                .pool
                .into_iter()
                .map(|matcher| {
                    Arc::new(if matcher.bytes.is_empty() {
                        Matcher::Empty
                    } else {
                        Matcher::Dfa(Dfa::new(matcher.length_mask, matcher.bytes))
                    })
                })
                .collect::<Vec<_>>();

            if pool.is_empty() {
                return Err(LoadError::EmptyPool { calling_code: cc });
            }

            let resolve = |indices: &[u32]| {
                indices
                    .iter()
                    .map(|&index| {
                        pool.get(index as usize).cloned().ok_or(
                            LoadError::BadMatcherIndex {
                                calling_code: cc,
                                index,
                            },
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()
            };

            // The pool's first entry is the validity matcher by convention,
            // which is how single-value classifiers share its machine.
            let validity = if entry.validity.is_empty() {
                pool[0].clone()
            } else {
                Matcher::combined(resolve(&entry.validity)?)
            };

            if entry.type_values.len() != types.len() {
                return Err(LoadError::TypeCountMismatch {
                    calling_code: cc,
                    expected: types.len(),
                    found: entry.type_values.len(),
                });
            }

            let mut type_matchers = Vec::with_capacity(types.len());

            for (index, type_values) in entry.type_values.into_iter().enumerate() {
                let mut values = Vec::with_capacity(type_values.values.len());

                for value in type_values.values {
                    let name = tokens.get(value.name, "value name")?.to_owned();
                    let matcher = Matcher::combined(resolve(&value.matchers)?);

                    possible_values[index].insert(name.clone());
                    values.push((name, matcher));
                }

                let default_value = match type_values.default_value {
                    0 => None,
                    token => Some(tokens.get(token, "default value")?.to_owned()),
                };

                if let Some(default) = &default_value {
                    if values.iter().any(|(name, _)| name == default) {
                        return Err(LoadError::DefaultValueListed {
                            calling_code: cc,
                            type_name: types[index].clone(),
                            value: default.clone(),
                        });
                    }

                    possible_values[index].insert(default.clone());
                }

                type_matchers.push(ValueMatcher {
                    values,
                    default_value,
                });
            }

            // Classifier-only types have their largest matcher elided, so no
            // single type needs to cover the validity matcher on its own, but
            // taken together the explicit values must reproduce its lengths.
            let union = type_matchers
                .iter()
                .flat_map(|matcher| matcher.values.iter())
                .fold(0u32, |mask, (_, matcher)| mask | matcher.length_mask());

            if union != 0 && union != validity.length_mask() {
                return Err(LoadError::LengthMaskMismatch {
                    calling_code: cc,
                    validity: validity.length_mask(),
                    union,
                });
            }

            let regions = entry
                .regions
                .iter()
                .map(|&index| tokens.get(index, "region").map(str::to_owned))
                .collect::<Result<Vec<_>, _>>()?;

            if regions.len() > 1 && regions.iter().any(|region| region == WORLD_REGION) {
                return Err(LoadError::WorldRegionMix { calling_code: cc });
            }

            for region in &regions {
                if region == WORLD_REGION {
                    continue;
                }

                if let Some(previous) = region_to_code.insert(region.clone(), code) {
                    return Err(LoadError::RegionConflict {
                        region: region.clone(),
                        first: previous.value(),
                        second: cc,
                    });
                }
            }

            let national_prefixes = entry
                .national_prefixes
                .iter()
                .map(|&index| {
                    let token = tokens.get(index, "national prefix")?;

                    if token.is_empty() {
                        return Err(LoadError::BadNationalPrefix {
                            calling_code: cc,
                            prefix: token.to_owned(),
                        });
                    }

                    token.parse().map_err(|_| LoadError::BadNationalPrefix {
                        calling_code: cc,
                        prefix: token.to_owned(),
                    })
                })
                .collect::<Result<Vec<DigitSequence>, _>>()?;

            let example_number = match entry.example_number {
                0 => None,
                token => {
                    let example = tokens.get(token, "example number")?;

                    Some(example.parse().map_err(|_| LoadError::BadExampleNumber {
                        calling_code: cc,
                        example: example.to_owned(),
                    })?)
                }
            };

            let national_prefix_optional =
                entry.national_prefix_optional || national_prefixes.is_empty();

            let record = CallingCodeRecord {
                validity,
                type_matchers,
                regions,
                national_prefixes,
                national_prefix_optional,
                example_number,
            };

            if records.insert(cc, record).is_some() {
                return Err(LoadError::DuplicateCallingCode(cc));
            }

            codes.push(code);
        }

        codes.sort();

        let type_index = types
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();

        debug!(
            "loaded metadata {}: {} calling codes, {} types",
            version,
            codes.len(),
            types.len()
        );

        Ok(Registry {
            version,
            types,
            single_valued_mask,
            classifier_only_mask,
            codes,
            records,
            type_index,
            region_to_code,
            possible_values,
        })
    }

    /// The version of the loaded data.
    pub fn version(&self) -> &VersionInfo {
        &self.version
    }

    /// The classifier types carried by the data, in declaration order.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// The calling codes carried by the data, ascending.
    pub fn calling_codes(&self) -> &[CallingCode] {
        &self.codes
    }

    pub(crate) fn type_index(&self, type_name: &str) -> Option<usize> {
        self.type_index.get(type_name).copied()
    }

    pub(crate) fn is_single_valued(&self, type_index: usize) -> bool {
        self.single_valued_mask >> type_index & 1 != 0
    }

    pub(crate) fn is_classifier_only(&self, type_index: usize) -> bool {
        self.classifier_only_mask >> type_index & 1 != 0
    }

    pub(crate) fn record(&self, code: CallingCode) -> Option<&CallingCodeRecord> {
        self.records.get(&code.value())
    }

    /// The calling code a region belongs to. The world region "001" has no
    /// calling code by definition.
    pub(crate) fn code_for_region(&self, region: &str) -> Option<CallingCode> {
        self.region_to_code.get(region).copied()
    }

    /// The union of a type's values across every calling code.
    pub(crate) fn possible_values(&self, type_index: usize) -> &BTreeSet<String> {
        &self.possible_values[type_index]
    }
}
