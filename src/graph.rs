//! Hierarchy - in-memory broader/narrower adjacency of one scheme
//!
//! Loaded from storage before visitation so traversal does not go back
//! to the database for every node.

use crate::identifier::ConceptId;
use crate::storage::Session;
use crate::thing::Thing;
use crate::Result;
use std::collections::HashMap;

/// Broader/narrower graph of a concept scheme.
///
/// The hierarchy is a DAG in well-formed data: a thing may have several
/// broader things. Children lists are kept sorted by concept id so every
/// walk over the graph is deterministic.
#[derive(Debug, Default)]
pub struct Hierarchy {
    /// All things of the scheme indexed by row id
    things: HashMap<i64, Thing>,
    /// Narrower things per thing (outgoing edges)
    children: HashMap<i64, Vec<i64>>,
    /// Broader things per thing (incoming edges)
    parents: HashMap<i64, Vec<i64>>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the hierarchy of a scheme from storage
    pub fn load(session: &Session<'_>, scheme_id: i64) -> Result<Self> {
        let mut hierarchy = Self::new();
        for thing in session.things_in_scheme(scheme_id)? {
            hierarchy.add_thing(thing);
        }
        for (parent, child) in session.hierarchy_edges(scheme_id)? {
            hierarchy.add_edge(parent, child);
        }
        hierarchy.sort();
        Ok(hierarchy)
    }

    pub fn add_thing(&mut self, thing: Thing) {
        self.things.insert(thing.id, thing);
    }

    /// Record `parent` broader than `child`
    pub fn add_edge(&mut self, parent: i64, child: i64) {
        let children = self.children.entry(parent).or_default();
        if !children.contains(&child) {
            children.push(child);
            self.parents.entry(child).or_default().push(parent);
        }
    }

    /// Order adjacency lists by concept id
    pub fn sort(&mut self) {
        let things = &self.things;
        let key = |id: &i64| things.get(id).map(|t| t.concept_id).unwrap_or(ConceptId(i64::MAX));
        for list in self.children.values_mut().chain(self.parents.values_mut()) {
            list.sort_by_key(key);
        }
    }

    pub fn get(&self, id: i64) -> Option<&Thing> {
        self.things.get(&id)
    }

    pub fn children(&self, id: i64) -> &[i64] {
        self.children.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn parents(&self, id: i64) -> &[i64] {
        self.parents.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether the thing has at least one broader or narrower edge
    pub fn is_connected(&self, id: i64) -> bool {
        !self.children(id).is_empty() || !self.parents(id).is_empty()
    }

    /// Starting points of a visitation, ordered by concept id.
    ///
    /// A root has no broader thing. Concepts without any edge are roots of
    /// their own one-node tree; collections without any edge are left out.
    pub fn roots(&self) -> Vec<&Thing> {
        let mut roots: Vec<&Thing> = self
            .things
            .values()
            .filter(|t| self.parents(t.id).is_empty())
            .filter(|t| t.is_concept() || !self.children(t.id).is_empty())
            .collect();
        roots.sort_by_key(|t| t.concept_id);
        roots
    }

    /// Things with at least one hierarchical edge, ordered by concept id
    pub fn connected(&self) -> Vec<&Thing> {
        let mut connected: Vec<&Thing> = self
            .things
            .values()
            .filter(|t| self.is_connected(t.id))
            .collect();
        connected.sort_by_key(|t| t.concept_id);
        connected
    }

    pub fn len(&self) -> usize {
        self.things.len()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thing::ThingKind;

    fn thing(id: i64, concept_id: i64, kind: ThingKind) -> Thing {
        Thing {
            id,
            scheme_id: 1,
            concept_id: ConceptId(concept_id),
            kind,
            uri: None,
        }
    }

    #[test]
    fn test_children_sorted_by_concept_id() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.add_thing(thing(1, 1, ThingKind::Concept));
        hierarchy.add_thing(thing(2, 30, ThingKind::Concept));
        hierarchy.add_thing(thing(3, 20, ThingKind::Concept));
        hierarchy.add_edge(1, 2);
        hierarchy.add_edge(1, 3);
        hierarchy.add_edge(1, 3);
        hierarchy.sort();

        assert_eq!(hierarchy.children(1), &[3, 2]);
        assert_eq!(hierarchy.parents(2), &[1]);
        assert_eq!(hierarchy.edge_count(), 2);
    }

    #[test]
    fn test_roots() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.add_thing(thing(1, 5, ThingKind::Concept));
        hierarchy.add_thing(thing(2, 6, ThingKind::Concept));
        hierarchy.add_thing(thing(3, 1, ThingKind::Concept));
        hierarchy.add_thing(thing(4, 333, ThingKind::Collection));
        hierarchy.add_thing(thing(5, 400, ThingKind::Collection));
        hierarchy.add_thing(thing(6, 2, ThingKind::Concept));
        hierarchy.add_edge(1, 2);
        hierarchy.add_edge(5, 3);
        hierarchy.sort();

        let roots: Vec<i64> = hierarchy.roots().iter().map(|t| t.concept_id.value()).collect();
        // Isolated concept 2 is a root, isolated collection 333 is not,
        // collection 400 has a narrower thing and is one
        assert_eq!(roots, vec![2, 5, 400]);

        let connected: Vec<i64> = hierarchy.connected().iter().map(|t| t.concept_id.value()).collect();
        assert_eq!(connected, vec![1, 5, 6, 400]);
    }
}
