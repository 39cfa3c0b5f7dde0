//! Import engine - loads a provider's concept graph into a scheme
//!
//! Runs in two phases because relations may point forward to items the
//! provider has not enumerated yet:
//! 1. Materialize every thing with its labels and notes
//! 2. Resolve and store relations, matches and collection members
//!
//! The engine never commits. All writes go through the caller's session,
//! and the caller's unit of work decides whether they are kept.

use crate::identifier::{ConceptId, RawId};
use crate::provider::{Provider, ProviderItem};
use crate::relation::RelationKind;
use crate::storage::Session;
use crate::thing::{ConceptScheme, Thing};
use crate::{Error, Result};
use std::fmt;
use tracing::{debug, info, warn};

/// Counts of what an import created
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportStats {
    pub concepts: usize,
    pub collections: usize,
    pub labels: usize,
    pub notes: usize,
    /// Distinct relations stored (duplicate declarations collapse)
    pub relations: usize,
    pub matches: usize,
    pub members: usize,
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import Stats:")?;
        writeln!(f, "  Concepts: {}", self.concepts)?;
        writeln!(f, "  Collections: {}", self.collections)?;
        writeln!(f, "  Labels: {}", self.labels)?;
        writeln!(f, "  Notes: {}", self.notes)?;
        writeln!(f, "  Relations: {}", self.relations)?;
        writeln!(f, "  Matches: {}", self.matches)?;
        writeln!(f, "  Members: {}", self.members)
    }
}

/// Import every item of `provider` into the empty `scheme`.
///
/// Fails fast on the first duplicate id, dangling reference or self
/// relation. Whatever was written before the failure stays in the
/// session's unit of work; discard the whole unit on error.
pub fn import_provider<P: Provider + ?Sized>(
    provider: &P,
    scheme: &ConceptScheme,
    session: &Session<'_>,
) -> Result<ImportStats> {
    let items = provider.items()?;
    info!(
        "Importing {} items from provider {} into scheme {}",
        items.len(),
        provider.metadata().id,
        scheme.id
    );

    if session.get_scheme(scheme.id)?.is_none() {
        return Err(Error::SchemeNotFound(scheme.id));
    }

    let existing = session.count_things(scheme.id)?;
    if existing > 0 {
        warn!(
            "Scheme {} already holds {} things; importing into a non-empty scheme is unsupported",
            scheme.id, existing
        );
    }

    let importer = Importer { scheme, session };
    let mut stats = ImportStats::default();

    // Phase 1: things, labels, notes
    let mut things = Vec::with_capacity(items.len());
    for item in &items {
        let thing = importer.materialize(item, &mut stats)?;
        things.push(thing);
    }
    debug!(
        "Phase 1 complete: {} concepts, {} collections",
        stats.concepts, stats.collections
    );

    // Phase 2: relations, matches, members
    for (item, thing) in items.iter().zip(&things) {
        if thing.is_collection() {
            if item.declares_relations() {
                warn!(
                    "Collection {} declares relations or matches; collections have none of their own, ignoring",
                    thing.concept_id
                );
            }
            importer.link_members(item, thing, &mut stats)?;
        } else {
            importer.link_relations(item, thing, &mut stats)?;
            importer.link_matches(item, thing, &mut stats)?;
        }
    }

    info!(
        "Imported {} things into scheme {} ({} relations, {} matches, {} members)",
        things.len(),
        scheme.id,
        stats.relations,
        stats.matches,
        stats.members
    );
    Ok(stats)
}

struct Importer<'s, 'c> {
    scheme: &'s ConceptScheme,
    session: &'s Session<'c>,
}

impl Importer<'_, '_> {
    fn materialize(&self, item: &ProviderItem, stats: &mut ImportStats) -> Result<Thing> {
        let concept_id = item.id.normalize()?;
        let thing = self
            .session
            .create_thing(self.scheme, concept_id, item.kind, item.uri.as_deref())?;

        for label in &item.labels {
            self.session.add_label(&thing, label)?;
        }
        for note in &item.notes {
            self.session.add_note(&thing, note)?;
        }

        if thing.is_collection() {
            stats.collections += 1;
        } else {
            stats.concepts += 1;
        }
        stats.labels += item.labels.len();
        stats.notes += item.notes.len();
        Ok(thing)
    }

    fn link_relations(&self, item: &ProviderItem, thing: &Thing, stats: &mut ImportStats) -> Result<()> {
        let declared = [
            (RelationKind::Broader, &item.broader),
            (RelationKind::Narrower, &item.narrower),
            (RelationKind::Related, &item.related),
        ];

        for (kind, targets) in declared {
            for raw in targets {
                let target = self.resolve(raw, thing, kind.as_str())?;
                if self.session.create_relation(thing, &target, kind)? {
                    stats.relations += 1;
                } else {
                    debug!(
                        "{} {} {} already recorded from the other side",
                        thing.concept_id, kind, target.concept_id
                    );
                }
            }
        }
        Ok(())
    }

    fn link_matches(&self, item: &ProviderItem, thing: &Thing, stats: &mut ImportStats) -> Result<()> {
        for (match_type, uris) in &item.matches {
            for uri in uris {
                if self.session.create_match(thing, *match_type, uri)? {
                    stats.matches += 1;
                }
            }
        }
        Ok(())
    }

    fn link_members(&self, item: &ProviderItem, collection: &Thing, stats: &mut ImportStats) -> Result<()> {
        for (position, raw) in item.members.iter().enumerate() {
            let member = self.resolve(raw, collection, "member")?;
            self.session.add_member(collection, &member, position as u32)?;
            stats.members += 1;
        }
        Ok(())
    }

    /// Look up the target of a declaration within the scheme
    fn resolve(&self, raw: &RawId, declared_by: &Thing, list: &str) -> Result<Thing> {
        let concept_id: ConceptId = raw.normalize()?;
        self.session
            .find_thing(self.scheme.id, concept_id)?
            .ok_or_else(|| Error::DanglingReference {
                scheme_id: self.scheme.id,
                concept_id,
                context: format!("{} of {}", list, declared_by.concept_id),
            })
    }
}
