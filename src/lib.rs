//! # skosdb - SKOS concept schemes in a relational store
//!
//! skosdb provides:
//! - A provider interface for in-memory concept graphs
//! - A two-phase import engine that loads a provider into a scheme
//! - SQLite-backed storage for concepts, collections, labels, notes and relations
//! - A visitation calculator that nested-set encodes a scheme's hierarchy

pub mod identifier;
pub mod thing;
pub mod relation;
pub mod storage;
pub mod provider;
pub mod import;
pub mod graph;
pub mod visitation;
pub mod config;

#[cfg(test)]
mod test_fixtures;

// Re-exports for convenient access
pub use identifier::{ConceptId, RawId};
pub use thing::{pick_label, ConceptScheme, Label, LabelType, Note, NoteType, Thing, ThingKind};
pub use relation::{Match, MatchType, Membership, Relation, RelationKind};
pub use storage::{SchemeStats, Session, SqliteStore, UnitOfWork};
pub use provider::{DictionaryProvider, Provider, ProviderItem, ProviderMetadata};
pub use import::{import_provider, ImportStats};
pub use graph::Hierarchy;
pub use visitation::{visit_hierarchy, VisitationCalculator, VisitationLimits, VisitationRow};

/// Result type alias for skosdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for skosdb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate id {concept_id} in scheme {scheme_id}")]
    DuplicateId { scheme_id: i64, concept_id: ConceptId },

    #[error("Dangling reference to {concept_id} in scheme {scheme_id}: {context}")]
    DanglingReference {
        scheme_id: i64,
        concept_id: ConceptId,
        context: String,
    },

    #[error("Thing {concept_id} in scheme {scheme_id} is {kind} of itself")]
    SelfRelation {
        scheme_id: i64,
        concept_id: ConceptId,
        kind: RelationKind,
    },

    #[error("Cycle detected at {concept_id}")]
    CycleDetected { concept_id: ConceptId },

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Scheme not found: {0}")]
    SchemeNotFound(i64),

    #[error("Thing not found: {0}")]
    ThingNotFound(i64),

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
