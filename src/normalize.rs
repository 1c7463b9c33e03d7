//! Normalization of string-or-list request fields
//!
//! Several session fields arrive either as a single string or as an array
//! of strings, and an upstream producer signals "no data" with the literal
//! `"character(0)"`. Everything downstream works on plain `Vec<String>`.

use serde::{Deserialize, Serialize};

/// Sentinel emitted by the upstream session recorder when a field is empty
const EMPTY_SENTINEL: &str = "character(0)";

/// A request field that may be a single string or a sequence of strings
///
/// Deserializes from either JSON shape via the untagged representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    /// Normalize into a uniform list of strings
    ///
    /// Rules, in priority order:
    /// - a list passes through unchanged
    /// - an empty string becomes an empty list
    /// - the `"character(0)"` sentinel becomes an empty list
    /// - any other string is wrapped in a one-element list
    ///
    /// Total over the input domain; idempotent on already-list inputs.
    pub fn normalize(self) -> Vec<String> {
        match self {
            StringOrList::Many(list) => list,
            StringOrList::One(s) if s.is_empty() => Vec::new(),
            StringOrList::One(s) if s == EMPTY_SENTINEL => Vec::new(),
            StringOrList::One(s) => vec![s],
        }
    }
}

impl From<&str> for StringOrList {
    fn from(s: &str) -> Self {
        StringOrList::One(s.to_string())
    }
}

impl From<Vec<String>> for StringOrList {
    fn from(list: Vec<String>) -> Self {
        StringOrList::Many(list)
    }
}
