//! Provider interface
//!
//! Providers hand the import engine a complete in-memory concept graph.
//! Where the graph comes from (files, remote services, dictionaries) is
//! the provider's business; the engine only reads [`ProviderItem`]s.

use crate::identifier::RawId;
use crate::relation::MatchType;
use crate::thing::{Label, Note, ThingKind};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Descriptive data about a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub id: String,
}

/// One concept or collection as a provider describes it.
///
/// Identifiers may be integers or numerals in text form; they are
/// normalized during import. `id` is required, everything else defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderItem {
    pub id: RawId,
    #[serde(rename = "type", default)]
    pub kind: ThingKind,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub broader: Vec<RawId>,
    #[serde(default)]
    pub narrower: Vec<RawId>,
    #[serde(default)]
    pub related: Vec<RawId>,
    #[serde(default)]
    pub matches: BTreeMap<MatchType, Vec<String>>,
    /// Only meaningful for collections, in declaration order
    #[serde(default)]
    pub members: Vec<RawId>,
}

impl ProviderItem {
    pub fn new(id: impl Into<RawId>, kind: ThingKind) -> Self {
        Self {
            id: id.into(),
            kind,
            uri: None,
            labels: Vec::new(),
            notes: Vec::new(),
            broader: Vec::new(),
            narrower: Vec::new(),
            related: Vec::new(),
            matches: BTreeMap::new(),
            members: Vec::new(),
        }
    }

    pub fn concept(id: impl Into<RawId>) -> Self {
        Self::new(id, ThingKind::Concept)
    }

    pub fn collection(id: impl Into<RawId>) -> Self {
        Self::new(id, ThingKind::Collection)
    }

    /// Whether the item declares any relation or match
    pub fn declares_relations(&self) -> bool {
        !(self.broader.is_empty()
            && self.narrower.is_empty()
            && self.related.is_empty()
            && self.matches.values().all(Vec::is_empty))
    }
}

/// Trait for concept graph providers
///
/// The import engine walks the items twice, so `items` must return the
/// same sequence on every call.
pub trait Provider {
    fn metadata(&self) -> &ProviderMetadata;

    fn items(&self) -> Result<Vec<ProviderItem>>;
}

/// Provider backed by an in-memory list of items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryProvider {
    #[serde(flatten)]
    metadata: ProviderMetadata,
    #[serde(default)]
    items: Vec<ProviderItem>,
}

impl DictionaryProvider {
    pub fn new(metadata: ProviderMetadata, items: Vec<ProviderItem>) -> Self {
        Self { metadata, items }
    }

    /// Parse `{"id": "...", "items": [...]}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Provider for DictionaryProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn items(&self) -> Result<Vec<ProviderItem>> {
        Ok(self.items.clone())
    }
}
