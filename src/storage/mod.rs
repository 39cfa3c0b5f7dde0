//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - concept_schemes(id, uri)
//! - things(id, scheme_id, concept_id, kind, uri)
//! - labels / notes (thing_id, type, language, text)
//! - relations(subject_id, object_id, kind) in canonical form
//! - matches(thing_id, match_type, uri)
//! - members(collection_id, member_id, position)
//! - label_types / note_types / match_types reference tables

pub mod schema;
pub mod sqlite;

pub use sqlite::{SchemeStats, Session, SqliteStore, UnitOfWork};
