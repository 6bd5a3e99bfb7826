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

//! Data-driven phone number classification, parsing and formatting.
//!
//! All knowledge about the world's numbering plans lives in a precompiled
//! metadata blob; this crate only interprets it. Number matching runs on
//! compact byte-coded machines shipped inside the blob, so there is no
//! regular-expression engine, no lazy compilation and no per-query
//! allocation on the validation paths.
//!
//! Load a [`metadata::Registry`] from blob bytes once, wrap it in a
//! [`classifier::RawClassifier`] (or the typed views in
//! [`classifier::typed`]), and share it freely: everything after loading is
//! immutable.

pub mod error;
pub use crate::error::{LoadError, ParseError};

pub mod digits;
pub use crate::digits::DigitSequence;

pub mod calling_code;
pub use crate::calling_code::CallingCode;

pub mod phone_number;
pub use crate::phone_number::PhoneNumber;

pub mod matcher;
pub use crate::matcher::{LengthResult, MatchResult};

pub mod metadata;
pub use crate::metadata::{Registry, VersionInfo};

pub mod classifier;
pub use crate::classifier::RawClassifier;

pub mod schema;
pub use crate::schema::NumberType;

pub mod parser;
pub use crate::parser::{ParseHint, PhoneNumberResult};

pub mod formatter;
pub use crate::formatter::FormatType;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
