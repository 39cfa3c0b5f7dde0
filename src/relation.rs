//! Relation types - links between things and out of the scheme
//!
//! - `Broader` / `Narrower`: hierarchical, inverse of each other
//! - `Related`: associative, symmetric
//! - `Match`: mapping from a concept to an external vocabulary URI
//! - `Membership`: ordered collection member

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Semantic relation kinds between two things of one scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Subject has the more general object as parent
    Broader,
    /// Subject has the more specific object as child
    Narrower,
    /// Associative, non-hierarchical
    Related,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Broader => "broader",
            RelationKind::Narrower => "narrower",
            RelationKind::Related => "related",
        }
    }

    pub fn all() -> &'static [RelationKind] {
        &[RelationKind::Broader, RelationKind::Narrower, RelationKind::Related]
    }

    /// The kind seen from the other endpoint
    pub fn inverse(&self) -> RelationKind {
        match self {
            RelationKind::Broader => RelationKind::Narrower,
            RelationKind::Narrower => RelationKind::Broader,
            RelationKind::Related => RelationKind::Related,
        }
    }
}

impl FromStr for RelationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "broader" => Ok(RelationKind::Broader),
            "narrower" => Ok(RelationKind::Narrower),
            "related" => Ok(RelationKind::Related),
            _ => Err(Error::Parse(format!("Unknown relation kind: {}", s))),
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A relation between two stored things, by row id.
///
/// Declarations arrive from either endpoint, so a relation is reduced to a
/// canonical form before it is stored: hierarchical relations always read
/// "narrower thing `broader` broader thing", related relations put the
/// lower row id first. Two declarations of the same logical edge share
/// one canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub subject_id: i64,
    pub object_id: i64,
    pub kind: RelationKind,
}

impl Relation {
    pub fn new(subject_id: i64, object_id: i64, kind: RelationKind) -> Self {
        Self {
            subject_id,
            object_id,
            kind,
        }
    }

    /// The same fact declared from the other endpoint
    pub fn reversed(&self) -> Self {
        Self {
            subject_id: self.object_id,
            object_id: self.subject_id,
            kind: self.kind.inverse(),
        }
    }

    pub fn is_self_relation(&self) -> bool {
        self.subject_id == self.object_id
    }

    /// Reduce to the stored form
    pub fn canonical(&self) -> Self {
        match self.kind {
            RelationKind::Broader => *self,
            RelationKind::Narrower => self.reversed(),
            RelationKind::Related => Self {
                subject_id: self.subject_id.min(self.object_id),
                object_id: self.subject_id.max(self.object_id),
                kind: RelationKind::Related,
            },
        }
    }
}

/// Match strength of a mapping to an external vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Close,
    Broad,
    Narrow,
    Related,
}

impl MatchType {
    /// Name stored in the `match_types` reference table
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exactMatch",
            MatchType::Close => "closeMatch",
            MatchType::Broad => "broadMatch",
            MatchType::Narrow => "narrowMatch",
            MatchType::Related => "relatedMatch",
        }
    }

    pub fn all() -> &'static [MatchType] {
        &[
            MatchType::Exact,
            MatchType::Close,
            MatchType::Broad,
            MatchType::Narrow,
            MatchType::Related,
        ]
    }
}

impl FromStr for MatchType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "exact" | "exactmatch" => Ok(MatchType::Exact),
            "close" | "closematch" => Ok(MatchType::Close),
            "broad" | "broadmatch" => Ok(MatchType::Broad),
            "narrow" | "narrowmatch" => Ok(MatchType::Narrow),
            "related" | "relatedmatch" => Ok(MatchType::Related),
            _ => Err(Error::Parse(format!("Unknown match type: {}", s))),
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A mapping assertion from a concept to an external URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub thing_id: i64,
    pub match_type: MatchType,
    pub uri: String,
}

/// A member of a collection at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub collection_id: i64,
    pub member_id: i64,
    pub position: u32,
}
