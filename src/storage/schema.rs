//! Database schema definitions

use crate::relation::MatchType;
use crate::thing::{LabelType, NoteType};

/// Enforce REFERENCES clauses on every connection
pub const ENABLE_FOREIGN_KEYS: &str = "PRAGMA foreign_keys = ON";

pub const CREATE_CONCEPT_SCHEMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS concept_schemes (
    id INTEGER PRIMARY KEY,
    uri TEXT
)
"#;

pub const CREATE_LABEL_TYPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS label_types (
    name TEXT PRIMARY KEY
)
"#;

pub const CREATE_NOTE_TYPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS note_types (
    name TEXT PRIMARY KEY
)
"#;

pub const CREATE_MATCH_TYPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS match_types (
    name TEXT PRIMARY KEY
)
"#;

/// Concepts and collections share one table, so `concept_id` is unique
/// across both variants within a scheme
pub const CREATE_THINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS things (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scheme_id INTEGER NOT NULL REFERENCES concept_schemes(id),
    concept_id INTEGER NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('concept', 'collection')),
    uri TEXT,
    UNIQUE(scheme_id, concept_id)
)
"#;

pub const CREATE_LABELS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS labels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    thing_id INTEGER NOT NULL REFERENCES things(id),
    label_type TEXT NOT NULL REFERENCES label_types(name),
    language TEXT NOT NULL,
    label TEXT NOT NULL
)
"#;

pub const CREATE_NOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    thing_id INTEGER NOT NULL REFERENCES things(id),
    note_type TEXT NOT NULL REFERENCES note_types(name),
    language TEXT NOT NULL,
    note TEXT NOT NULL
)
"#;

/// Relations in canonical form only: hierarchical rows are
/// (narrower, broader, 'broader'), related rows are (lower id, higher id)
pub const CREATE_RELATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id INTEGER NOT NULL REFERENCES things(id),
    object_id INTEGER NOT NULL REFERENCES things(id),
    kind TEXT NOT NULL CHECK (kind IN ('broader', 'related')),
    CHECK (subject_id <> object_id),
    UNIQUE(subject_id, object_id, kind)
)
"#;

pub const CREATE_MATCHES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    thing_id INTEGER NOT NULL REFERENCES things(id),
    match_type TEXT NOT NULL REFERENCES match_types(name),
    uri TEXT NOT NULL,
    UNIQUE(thing_id, match_type, uri)
)
"#;

pub const CREATE_MEMBERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    collection_id INTEGER NOT NULL REFERENCES things(id),
    member_id INTEGER NOT NULL REFERENCES things(id),
    position INTEGER NOT NULL,
    PRIMARY KEY(collection_id, position)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_things_scheme ON things(scheme_id)",
    "CREATE INDEX IF NOT EXISTS idx_labels_thing ON labels(thing_id)",
    "CREATE INDEX IF NOT EXISTS idx_notes_thing ON notes(thing_id)",
    "CREATE INDEX IF NOT EXISTS idx_relations_subject ON relations(subject_id)",
    "CREATE INDEX IF NOT EXISTS idx_relations_object ON relations(object_id)",
    "CREATE INDEX IF NOT EXISTS idx_matches_thing ON matches(thing_id)",
    "CREATE INDEX IF NOT EXISTS idx_members_member ON members(member_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_CONCEPT_SCHEMES_TABLE,
        CREATE_LABEL_TYPES_TABLE,
        CREATE_NOTE_TYPES_TABLE,
        CREATE_MATCH_TYPES_TABLE,
        CREATE_THINGS_TABLE,
        CREATE_LABELS_TABLE,
        CREATE_NOTES_TABLE,
        CREATE_RELATIONS_TABLE,
        CREATE_MATCHES_TABLE,
        CREATE_MEMBERS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Reference rows every store starts with, as (table, name) pairs
pub fn reference_data() -> Vec<(&'static str, &'static str)> {
    let labels = LabelType::all().iter().map(|t| ("label_types", t.as_str()));
    let notes = NoteType::all().iter().map(|t| ("note_types", t.as_str()));
    let matches = MatchType::all().iter().map(|t| ("match_types", t.as_str()));
    labels.chain(notes).chain(matches).collect()
}
