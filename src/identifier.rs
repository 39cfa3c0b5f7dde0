//! Concept identifiers - stable identity for every thing in a scheme
//!
//! Providers hand out identifiers either as integers or as numerals in
//! text form. Both normalize to the same [`ConceptId`], so `"333"` and
//! `333` name the same thing.
//!
//! Examples:
//! - `RawId::Int(333)` -> `ConceptId(333)`
//! - `RawId::Text(" 0333 ")` -> `ConceptId(333)`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized identifier of a thing within its concept scheme.
///
/// Together with the scheme id this is the lookup key for concepts and
/// collections alike; the two variants share one identity space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConceptId(pub i64);

impl ConceptId {
    /// Parse a numeral in text form
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        trimmed
            .parse::<i64>()
            .map(ConceptId)
            .map_err(|_| Error::InvalidId(format!("Not a numeric concept id: {:?}", s)))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConceptId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<i64> for ConceptId {
    fn from(value: i64) -> Self {
        ConceptId(value)
    }
}

impl Serialize for ConceptId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for ConceptId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawId::deserialize(deserializer)?
            .normalize()
            .map_err(serde::de::Error::custom)
    }
}

/// Identifier as supplied by a provider, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    /// Normalize to the canonical identity
    pub fn normalize(&self) -> Result<ConceptId> {
        match self {
            RawId::Int(value) => Ok(ConceptId(*value)),
            RawId::Text(text) => ConceptId::parse(text),
        }
    }
}

impl From<i64> for RawId {
    fn from(value: i64) -> Self {
        RawId::Int(value)
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        RawId::Text(value.to_string())
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(value) => write!(f, "{}", value),
            RawId::Text(text) => write!(f, "{:?}", text),
        }
    }
}
