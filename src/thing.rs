//! Thing types - concepts and collections of a concept scheme
//!
//! Every entry of a thesaurus is a thing of one of two variants:
//! - `Concept`: a unit of meaning with relations and matches
//! - `Collection`: an ordered grouping of other things
//!
//! Both carry labels and notes and share one identity space per scheme.

use crate::identifier::ConceptId;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Top-level container of a thesaurus. Created by the caller before import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptScheme {
    pub id: i64,
    pub uri: Option<String>,
}

impl ConceptScheme {
    pub fn new(id: i64) -> Self {
        Self { id, uri: None }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// The variant discriminator of a thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThingKind {
    #[default]
    Concept,
    Collection,
}

impl ThingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThingKind::Concept => "concept",
            ThingKind::Collection => "collection",
        }
    }

    pub fn all() -> &'static [ThingKind] {
        &[ThingKind::Concept, ThingKind::Collection]
    }
}

impl FromStr for ThingKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "concept" => Ok(ThingKind::Concept),
            "collection" => Ok(ThingKind::Collection),
            _ => Err(Error::Parse(format!("Unknown thing kind: {}", s))),
        }
    }
}

impl std::fmt::Display for ThingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored concept or collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thing {
    /// Row id assigned by the store
    pub id: i64,
    pub scheme_id: i64,
    pub concept_id: ConceptId,
    pub kind: ThingKind,
    pub uri: Option<String>,
}

impl Thing {
    pub fn is_concept(&self) -> bool {
        self.kind == ThingKind::Concept
    }

    pub fn is_collection(&self) -> bool {
        self.kind == ThingKind::Collection
    }
}

impl PartialEq for Thing {
    fn eq(&self, other: &Self) -> bool {
        self.scheme_id == other.scheme_id && self.concept_id == other.concept_id
    }
}

impl Eq for Thing {}

impl std::hash::Hash for Thing {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.scheme_id.hash(state);
        self.concept_id.hash(state);
    }
}

/// Lexical label types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LabelType {
    /// Preferred label for display, one per language
    #[default]
    #[serde(rename = "prefLabel")]
    Pref,
    /// Synonyms and abbreviations
    #[serde(rename = "altLabel")]
    Alt,
    /// Search-only forms such as misspellings
    #[serde(rename = "hiddenLabel")]
    Hidden,
}

impl LabelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelType::Pref => "prefLabel",
            LabelType::Alt => "altLabel",
            LabelType::Hidden => "hiddenLabel",
        }
    }

    pub fn all() -> &'static [LabelType] {
        &[LabelType::Pref, LabelType::Alt, LabelType::Hidden]
    }
}

impl FromStr for LabelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "preflabel" | "pref_label" | "pref" => Ok(LabelType::Pref),
            "altlabel" | "alt_label" | "alt" => Ok(LabelType::Alt),
            "hiddenlabel" | "hidden_label" | "hidden" => Ok(LabelType::Hidden),
            _ => Err(Error::Parse(format!("Unknown label type: {}", s))),
        }
    }
}

impl std::fmt::Display for LabelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Documentation note types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum NoteType {
    Definition,
    ScopeNote,
    Example,
    HistoryNote,
    EditorialNote,
    ChangeNote,
    #[default]
    Note,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Definition => "definition",
            NoteType::ScopeNote => "scopeNote",
            NoteType::Example => "example",
            NoteType::HistoryNote => "historyNote",
            NoteType::EditorialNote => "editorialNote",
            NoteType::ChangeNote => "changeNote",
            NoteType::Note => "note",
        }
    }

    pub fn all() -> &'static [NoteType] {
        &[
            NoteType::Definition,
            NoteType::ScopeNote,
            NoteType::Example,
            NoteType::HistoryNote,
            NoteType::EditorialNote,
            NoteType::ChangeNote,
            NoteType::Note,
        ]
    }
}

impl FromStr for NoteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "definition" => Ok(NoteType::Definition),
            "scopenote" | "scope_note" => Ok(NoteType::ScopeNote),
            "example" => Ok(NoteType::Example),
            "historynote" | "history_note" => Ok(NoteType::HistoryNote),
            "editorialnote" | "editorial_note" => Ok(NoteType::EditorialNote),
            "changenote" | "change_note" => Ok(NoteType::ChangeNote),
            "note" => Ok(NoteType::Note),
            _ => Err(Error::Parse(format!("Unknown note type: {}", s))),
        }
    }
}

impl std::fmt::Display for NoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A label attached to a thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "type", default)]
    pub label_type: LabelType,
    pub language: String,
    pub label: String,
}

impl Label {
    pub fn new(label_type: LabelType, language: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label_type,
            language: language.into(),
            label: label.into(),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// A documentation note attached to a thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "type", default)]
    pub note_type: NoteType,
    pub language: String,
    pub note: String,
}

impl Note {
    pub fn new(note_type: NoteType, language: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            note_type,
            language: language.into(),
            note: note.into(),
        }
    }
}

/// Pick the label to display for a thing.
///
/// Preference order: prefLabel in `language`, any prefLabel, altLabel in
/// `language`, any altLabel, then whatever is left (hidden labels).
/// Without a language only the type order applies.
pub fn pick_label<'a>(labels: &'a [Label], language: Option<&str>) -> Option<&'a Label> {
    let in_language = |l: &&Label| language.is_some_and(|lang| l.language == lang);

    for label_type in [LabelType::Pref, LabelType::Alt] {
        let mut of_type = labels.iter().filter(|l| l.label_type == label_type);
        if let Some(found) = of_type.clone().find(in_language) {
            return Some(found);
        }
        if let Some(found) = of_type.next() {
            return Some(found);
        }
    }

    labels.iter().find(in_language).or_else(|| labels.first())
}
