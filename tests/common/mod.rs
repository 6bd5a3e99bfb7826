//! A hand-assembled metadata blob for the integration tests.
//!
//! The plans are deliberately small caricatures of the real ones, but they
//! exercise the same machinery: shared matcher pools, combined validity
//! matchers, classifier-only defaults, multi-region calling codes, national
//! prefixes and format specifiers.
//!
//! Covered calling codes:
//!
//! - `1` (US/CA): `[2-9]` + 6 digits, optionally + 3 more; optional
//!   national prefix `1`.
//! - `44` (GB/GG/JE/IM): `[27]` + 9 digits; mandatory national prefix `0`.
//! - `54` (AR): `11` + 8 digits or `9` + 10 digits; optional prefix `0`;
//!   subject to the mobile rewrite.
//! - `7` (RU): `86` + 9 digits; optional prefixes `8` and `810`.
//! - `800` (world service): any 8 digits, region `001`.

#![allow(dead_code)]

use dialplan::metadata::loader::{
    self, CallingCodeBlob, MatcherBlob, MetadataBlob, TypeValuesBlob, ValueBlob,
};
use dialplan::{RawClassifier, Registry};
use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    static ref CLASSIFIER: RawClassifier =
        RawClassifier::new(Arc::new(Registry::from_blob(blob()).unwrap()));
}

/// The shared classifier over the test metadata.
pub fn classifier() -> &'static RawClassifier {
    &CLASSIFIER
}

/// One `Single` instruction: consume one digit, accept iff it equals
/// `digit`.
pub fn single(digit: u8) -> Vec<u8> {
    vec![0x20 | digit]
}

/// One `Any` instruction: consume exactly `count` digits.
pub fn any(count: u8) -> Vec<u8> {
    vec![0x40 | (count - 1)]
}

/// One two-byte `Range` instruction accepting the given digits.
pub fn range(digits: &[u8]) -> Vec<u8> {
    let set = digits.iter().fold(0u16, |set, &digit| set | 1 << digit);

    (0x6000 | set).to_be_bytes().to_vec()
}

/// A `TMap` accepting every digit with jump index 1: the machine accepts
/// when input ends here, otherwise consumes one digit and jumps by
/// `offset` (relative to the jump table, which holds the single entry).
pub fn tmap_any(offset: u8) -> Vec<u8> {
    vec![0xB5, 0x24, 0x91, 0x11, offset]
}

/// Assemble instruction fragments into a terminated machine.
pub fn machine(lengths: &[usize], parts: &[Vec<u8>]) -> MatcherBlob {
    let mut bytes = parts.concat();
    bytes.push(0x00);

    MatcherBlob {
        length_mask: lengths.iter().fold(0, |mask, &len| mask | 1 << len),
        bytes,
    }
}

/// A format-specifier group token.
pub fn group(kind: u8, length: usize) -> char {
    char::from(0x40 | kind << 3 | (length as u8 - 1))
}

/// Interning token table; index 0 is the reserved empty string.
pub struct TokenTable {
    tokens: Vec<String>,
}

impl TokenTable {
    pub fn new() -> TokenTable {
        TokenTable {
            tokens: vec![String::new()],
        }
    }

    pub fn intern(&mut self, token: &str) -> u32 {
        match self.tokens.iter().position(|existing| existing == token) {
            Some(index) => index as u32,
            None => {
                self.tokens.push(token.to_owned());
                (self.tokens.len() - 1) as u32
            }
        }
    }

    pub fn value(&mut self, name: &str, matchers: Vec<u32>) -> ValueBlob {
        ValueBlob {
            name: self.intern(name),
            matchers,
        }
    }
}

/// The test metadata blob.
pub fn blob() -> MetadataBlob {
    let mut tokens = TokenTable::new();

    let types = vec![
        tokens.intern("TYPE"),
        tokens.intern("REGION"),
        tokens.intern("NATIONAL_FORMAT"),
        tokens.intern("INTERNATIONAL_FORMAT"),
    ];

    let nanpa = CallingCodeBlob {
        calling_code: 1,
        validity: vec![],
        pool: vec![
            // 0: [2-9]\d{6}(\d{3})?
            machine(&[7, 10], &[range(&[2, 3, 4, 5, 6, 7, 8, 9]), any(6), tmap_any(1), any(2)]),
            // 1: [2-8]\d{6}(\d{3})?
            machine(&[7, 10], &[range(&[2, 3, 4, 5, 6, 7, 8]), any(6), tmap_any(1), any(2)]),
            // 2: 9\d{6}(\d{3})?
            machine(&[7, 10], &[single(9), any(6), tmap_any(1), any(2)]),
            // 3: [2-9]\d{9}, the numbers the display formats apply to
            machine(&[10], &[range(&[2, 3, 4, 5, 6, 7, 8, 9]), any(9)]),
        ],
        type_values: vec![
            TypeValuesBlob {
                default_value: tokens.intern("FIXED_LINE_OR_MOBILE"),
                values: vec![],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value("US", vec![1]), tokens.value("CA", vec![2])],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value(
                    &format!("{} {}{}", group(5, 3), group(2, 3), group(0, 4)),
                    vec![3],
                )],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value(
                    &format!("{}{}{}", group(2, 3), group(2, 3), group(0, 4)),
                    vec![3],
                )],
            },
        ],
        regions: vec![tokens.intern("US"), tokens.intern("CA")],
        national_prefixes: vec![tokens.intern("1")],
        national_prefix_optional: true,
        example_number: tokens.intern("6502123456"),
    };

    let uk = CallingCodeBlob {
        calling_code: 44,
        validity: vec![],
        pool: vec![
            // 0: [27]\d{9}
            machine(&[10], &[range(&[2, 7]), any(9)]),
            // 1: 7691\d{6}, shared by Guernsey and Jersey
            machine(&[10], &[single(7), single(6), single(9), single(1), any(6)]),
            // 2: 7924\d{6}
            machine(&[10], &[single(7), single(9), single(2), single(4), any(6)]),
            // 3: 7\d{9}
            machine(&[10], &[single(7), any(9)]),
            // 4: 2\d{9}, shared by both display formats
            machine(&[10], &[single(2), any(9)]),
        ],
        type_values: vec![
            TypeValuesBlob {
                default_value: tokens.intern("FIXED_LINE"),
                values: vec![tokens.value("MOBILE", vec![3])],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![
                    tokens.value("GB", vec![0]),
                    tokens.value("GG", vec![1]),
                    tokens.value("JE", vec![1]),
                    tokens.value("IM", vec![2]),
                ],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value(
                    &format!("0{}{}{}", group(1, 2), group(1, 4), group(0, 4)),
                    vec![4],
                )],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value(
                    &format!("{}{}{}", group(1, 2), group(1, 4), group(0, 4)),
                    vec![4],
                )],
            },
        ],
        regions: vec![
            tokens.intern("GB"),
            tokens.intern("GG"),
            tokens.intern("JE"),
            tokens.intern("IM"),
        ],
        national_prefixes: vec![tokens.intern("0")],
        national_prefix_optional: false,
        example_number: tokens.intern("2087438000"),
    };

    let argentina = CallingCodeBlob {
        calling_code: 54,
        validity: vec![0, 1],
        pool: vec![
            // 0: 11\d{8}, Buenos Aires fixed lines
            machine(&[10], &[single(1), single(1), any(8)]),
            // 1: 9\d{10}, mobiles in their stored form
            machine(&[11], &[single(9), any(10)]),
        ],
        type_values: vec![
            TypeValuesBlob {
                default_value: 0,
                values: vec![
                    tokens.value("FIXED_LINE", vec![0]),
                    tokens.value("MOBILE", vec![1]),
                ],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value("AR", vec![0, 1])],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value(
                    &format!("{}0{} 15-{}{}", group(6, 1), group(0, 2), group(2, 4), group(0, 4)),
                    vec![1],
                )],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value(
                    &format!("{}{}{}{}", group(1, 1), group(1, 2), group(2, 4), group(0, 4)),
                    vec![1],
                )],
            },
        ],
        regions: vec![tokens.intern("AR")],
        national_prefixes: vec![tokens.intern("0")],
        national_prefix_optional: true,
        example_number: tokens.intern("91133295195"),
    };

    let russia = CallingCodeBlob {
        calling_code: 7,
        validity: vec![],
        pool: vec![
            // 0: 86\d{9}
            machine(&[11], &[single(8), single(6), any(9)]),
        ],
        type_values: vec![
            TypeValuesBlob {
                default_value: tokens.intern("FIXED_LINE"),
                values: vec![],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value("RU", vec![0])],
            },
            TypeValuesBlob::default(),
            TypeValuesBlob::default(),
        ],
        regions: vec![tokens.intern("RU")],
        // Trunk prefix alone, and combined with the international escape.
        national_prefixes: vec![tokens.intern("8"), tokens.intern("810")],
        national_prefix_optional: true,
        example_number: tokens.intern("86309390906"),
    };

    let world = CallingCodeBlob {
        calling_code: 800,
        validity: vec![],
        pool: vec![
            // 0: \d{8}
            machine(&[8], &[any(8)]),
        ],
        type_values: vec![
            TypeValuesBlob {
                default_value: tokens.intern("TOLL_FREE"),
                values: vec![],
            },
            TypeValuesBlob {
                default_value: 0,
                values: vec![tokens.value("001", vec![0])],
            },
            TypeValuesBlob::default(),
            TypeValuesBlob::default(),
        ],
        regions: vec![tokens.intern("001")],
        national_prefixes: vec![],
        national_prefix_optional: true,
        example_number: tokens.intern("12345678"),
    };

    MetadataBlob {
        version: loader::required_version(),
        types,
        // TYPE and the two format pseudo-types are single-valued.
        single_valued_mask: 0b1101,
        // Only TYPE had a matcher elided in favour of a default.
        classifier_only_mask: 0b0001,
        calling_codes: vec![nanpa, uk, argentina, russia, world],
        tokens: tokens.tokens,
    }
}
