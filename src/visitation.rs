//! Visitation calculator - nested-set encoding of a scheme's hierarchy
//!
//! Flattens the broader/narrower graph into `[lft, rght]` intervals with a
//! depth, so "A is an ancestor of B" becomes `A.lft < B.lft && B.rght < A.rght`.
//!
//! The hierarchy is a DAG, not a tree. A thing with two broader things is
//! visited once per parent, together with its whole subtree, so the output
//! can hold more rows than the scheme holds things.

use crate::graph::Hierarchy;
use crate::identifier::ConceptId;
use crate::storage::Session;
use crate::thing::ConceptScheme;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// One occurrence of a thing in the nested-set encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitationRow {
    /// Row id of the visited thing
    pub thing_id: i64,
    pub concept_id: ConceptId,
    pub lft: u64,
    pub rght: u64,
    /// 1 for roots
    pub depth: u32,
}

impl VisitationRow {
    /// Whether `other` lies strictly inside this row's interval
    pub fn contains(&self, other: &VisitationRow) -> bool {
        self.lft < other.lft && other.rght < self.rght
    }

    /// Number of rows nested inside this one
    pub fn subtree_size(&self) -> u64 {
        (self.rght - self.lft - 1) / 2
    }

    pub fn is_leaf(&self) -> bool {
        self.rght == self.lft + 1
    }
}

/// Bounds on a visitation; polyhierarchies can multiply rows quickly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitationLimits {
    pub max_depth: Option<u32>,
    pub max_rows: Option<usize>,
}

/// Traversal frame: a node that is open on the active path
struct Frame {
    node: i64,
    depth: u32,
    /// Index of the row reserved for this node
    row: usize,
    /// Next child to descend into
    next_child: usize,
}

/// Computes the nested-set visitation of a concept scheme
pub struct VisitationCalculator<'s, 'c> {
    session: &'s Session<'c>,
    limits: VisitationLimits,
}

impl<'s, 'c> VisitationCalculator<'s, 'c> {
    pub fn new(session: &'s Session<'c>) -> Self {
        Self {
            session,
            limits: VisitationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: VisitationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Visit every root of the scheme in concept id order.
    ///
    /// Rows come back in pre-order. On a cycle or an exceeded limit no rows
    /// are returned at all.
    pub fn visit(&self, scheme: &ConceptScheme) -> Result<Vec<VisitationRow>> {
        if self.session.get_scheme(scheme.id)?.is_none() {
            return Err(Error::SchemeNotFound(scheme.id));
        }

        let hierarchy = Hierarchy::load(self.session, scheme.id)?;
        info!(
            "Visiting scheme {} ({} things, {} broader/narrower edges)",
            scheme.id,
            hierarchy.len(),
            hierarchy.edge_count()
        );

        let rows = visit_hierarchy(&hierarchy, self.limits)?;
        info!("Visitation of scheme {} produced {} rows", scheme.id, rows.len());
        Ok(rows)
    }
}

/// Nested-set traversal over an already loaded hierarchy.
///
/// Uses an explicit stack of frames; depth is bounded by the data, not by
/// the native call stack.
pub fn visit_hierarchy(hierarchy: &Hierarchy, limits: VisitationLimits) -> Result<Vec<VisitationRow>> {
    let mut traversal = Traversal::new(hierarchy, limits);
    let mut reached: HashSet<i64> = HashSet::new();

    for root in hierarchy.roots() {
        debug!("Visiting root {}", root.concept_id);
        traversal.open(root.id, 1)?;
        reached.insert(root.id);

        while let Some(top) = traversal.stack.last_mut() {
            match hierarchy.children(top.node).get(top.next_child).copied() {
                Some(child) => {
                    top.next_child += 1;
                    let depth = top.depth + 1;
                    if traversal.on_path.contains(&child) {
                        return Err(traversal.cycle_at(child));
                    }
                    traversal.open(child, depth)?;
                    reached.insert(child);
                }
                None => traversal.close(),
            }
        }
    }

    // Every hierarchical thing has either no broader thing (a root) or a
    // chain of broader things ending in a root or in a cycle
    if let Some(stranded) = hierarchy.connected().into_iter().find(|t| !reached.contains(&t.id)) {
        return Err(Error::CycleDetected {
            concept_id: stranded.concept_id,
        });
    }

    Ok(traversal.rows)
}

/// Mutable state of one traversal
struct Traversal<'h> {
    hierarchy: &'h Hierarchy,
    limits: VisitationLimits,
    rows: Vec<VisitationRow>,
    stack: Vec<Frame>,
    /// Nodes currently open on the active path
    on_path: HashSet<i64>,
    counter: u64,
}

impl<'h> Traversal<'h> {
    fn new(hierarchy: &'h Hierarchy, limits: VisitationLimits) -> Self {
        Self {
            hierarchy,
            limits,
            rows: Vec::new(),
            stack: Vec::new(),
            on_path: HashSet::new(),
            counter: 1,
        }
    }

    /// Assign `lft` and reserve the node's row
    fn open(&mut self, node: i64, depth: u32) -> Result<()> {
        if let Some(max_depth) = self.limits.max_depth {
            if depth > max_depth {
                return Err(Error::LimitExceeded(format!("depth {} exceeds maximum {}", depth, max_depth)));
            }
        }
        if let Some(max_rows) = self.limits.max_rows {
            if self.rows.len() >= max_rows {
                return Err(Error::LimitExceeded(format!("more than {} visitation rows", max_rows)));
            }
        }

        let concept_id = self
            .hierarchy
            .get(node)
            .map(|t| t.concept_id)
            .ok_or(Error::ThingNotFound(node))?;

        self.stack.push(Frame {
            node,
            depth,
            row: self.rows.len(),
            next_child: 0,
        });
        self.rows.push(VisitationRow {
            thing_id: node,
            concept_id,
            lft: self.counter,
            rght: 0,
            depth,
        });
        self.counter += 1;
        self.on_path.insert(node);
        Ok(())
    }

    /// Assign `rght` to the innermost open node
    fn close(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.rows[frame.row].rght = self.counter;
            self.counter += 1;
            self.on_path.remove(&frame.node);
        }
    }

    fn cycle_at(&self, node: i64) -> Error {
        match self.hierarchy.get(node) {
            Some(thing) => Error::CycleDetected {
                concept_id: thing.concept_id,
            },
            None => Error::ThingNotFound(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_provider;
    use crate::provider::{DictionaryProvider, ProviderMetadata};
    use crate::storage::SqliteStore;
    use crate::test_fixtures::{buildings, geography, init_tracing, menu};
    use crate::thing::{Thing, ThingKind};

    fn visit_provider(provider: &DictionaryProvider) -> Result<Vec<VisitationRow>> {
        let mut store = SqliteStore::open_in_memory()?;
        let uow = store.unit_of_work()?;
        let session = uow.session();
        let scheme = ConceptScheme::new(1);
        session.create_scheme(&scheme)?;
        import_provider(provider, &scheme, &session)?;
        VisitationCalculator::new(&session).visit(&scheme)
    }

    fn rows_for(rows: &[VisitationRow], concept_id: i64) -> Vec<VisitationRow> {
        rows.iter()
            .filter(|r| r.concept_id == ConceptId(concept_id))
            .copied()
            .collect()
    }

    fn assert_interval_laws(rows: &[VisitationRow]) {
        for row in rows {
            assert!(row.lft < row.rght);
            assert!(row.depth >= 1);
            let nested = rows.iter().filter(|other| row.contains(other)).count() as u64;
            assert_eq!(nested, row.subtree_size());
        }
    }

    #[test]
    fn test_empty_provider() {
        init_tracing();
        let provider = DictionaryProvider::new(ProviderMetadata { id: "EMPTY".into() }, vec![]);
        assert!(visit_provider(&provider).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_scheme() {
        let store = SqliteStore::open_in_memory().unwrap();
        let session = store.session();
        let err = VisitationCalculator::new(&session)
            .visit(&ConceptScheme::new(7))
            .unwrap_err();
        assert!(matches!(err, Error::SchemeNotFound(7)));
    }

    #[test]
    fn test_menu_flat() {
        init_tracing();
        let rows = visit_provider(&menu()).unwrap();
        assert_eq!(rows.len(), 11);

        let mut left = 1;
        for row in &rows {
            assert_eq!(row.lft, left);
            assert!(row.is_leaf());
            assert_eq!(row.depth, 1);
            left += 2;
        }
        assert_eq!(rows.last().unwrap().lft, 21);
    }

    #[test]
    fn test_geography() {
        init_tracing();
        let rows = visit_provider(&geography()).unwrap();
        assert_eq!(rows.len(), 10);
        assert!(rows_for(&rows, 333).is_empty());

        let world = rows[0];
        assert_eq!(world.concept_id, ConceptId(1));
        assert_eq!((world.lft, world.rght, world.depth), (1, 20, 1));

        let north_america = rows_for(&rows, 3)[0];
        assert_eq!(north_america.rght, north_america.lft + 3);
        assert_eq!(north_america.depth, 2);

        let usa = rows_for(&rows, 6)[0];
        assert_eq!(usa.rght, usa.lft + 1);
        assert_eq!(usa.depth, 3);

        assert!(world.contains(&usa));
        assert!(north_america.contains(&usa));
        assert!(!rows_for(&rows, 2)[0].contains(&usa));
        assert_interval_laws(&rows);
    }

    #[test]
    fn test_buildings_polyhierarchy() {
        init_tracing();
        let rows = visit_provider(&buildings()).unwrap();
        assert_eq!(rows.len(), 5);

        let castles = rows_for(&rows, 2);
        assert_eq!(castles.len(), 2);
        for castle in &castles {
            assert!(castle.is_leaf());
            assert_eq!(castle.depth, 2);
        }

        let fortifications = rows_for(&rows, 1)[0];
        assert_eq!(fortifications.rght, fortifications.lft + 3);
        assert_eq!(fortifications.depth, 1);

        let habitations = rows_for(&rows, 3)[0];
        assert_eq!(habitations.rght, habitations.lft + 5);
        assert_eq!(habitations.depth, 1);

        assert!(fortifications.contains(&castles[0]));
        assert!(habitations.contains(&castles[1]));
        assert_interval_laws(&rows);
    }

    #[test]
    fn test_shared_subtree_is_repeated() {
        init_tracing();
        let provider = DictionaryProvider::from_json_value(serde_json::json!({
            "id": "SHARED",
            "items": [
                {"id": 1, "narrower": [3]},
                {"id": 2, "narrower": [3]},
                {"id": 3, "narrower": [4]},
                {"id": 4}
            ]
        }))
        .unwrap();

        let rows = visit_provider(&provider).unwrap();
        let order: Vec<(i64, u64, u64, u32)> = rows
            .iter()
            .map(|r| (r.concept_id.value(), r.lft, r.rght, r.depth))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, 1, 6, 1),
                (3, 2, 5, 2),
                (4, 3, 4, 3),
                (2, 7, 12, 1),
                (3, 8, 11, 2),
                (4, 9, 10, 3),
            ]
        );
    }

    #[test]
    fn test_collection_as_narrower_target() {
        init_tracing();
        let provider = DictionaryProvider::from_json_value(serde_json::json!({
            "id": "HERITAGE_TYPES",
            "items": [
                {"id": 72, "narrower": [80]},
                {"id": 80, "type": "collection", "members": [72]},
                {"id": 90, "type": "collection"}
            ]
        }))
        .unwrap();

        let rows = visit_provider(&provider).unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.concept_id.value()).collect();
        assert_eq!(ids, vec![72, 80]);
    }

    #[test]
    fn test_deterministic() {
        init_tracing();
        let store = SqliteStore::open_in_memory().unwrap();
        let scheme = ConceptScheme::new(1);
        let session = store.session();
        session.create_scheme(&scheme).unwrap();
        import_provider(&geography(), &scheme, &session).unwrap();

        let calculator = VisitationCalculator::new(&session);
        let first = calculator.visit(&scheme).unwrap();
        let second = calculator.visit(&scheme).unwrap();
        assert_eq!(first, second);
    }

    fn cyclic_hierarchy(with_root: bool) -> Hierarchy {
        let mut hierarchy = Hierarchy::new();
        for id in 1..=3 {
            hierarchy.add_thing(Thing {
                id,
                scheme_id: 1,
                concept_id: ConceptId(id),
                kind: ThingKind::Concept,
                uri: None,
            });
        }
        hierarchy.add_edge(2, 3);
        hierarchy.add_edge(3, 2);
        if with_root {
            hierarchy.add_edge(1, 2);
        }
        hierarchy.sort();
        hierarchy
    }

    #[test]
    fn test_cycle_on_active_path() {
        let err = visit_hierarchy(&cyclic_hierarchy(true), VisitationLimits::default()).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { concept_id: ConceptId(2) }));
    }

    #[test]
    fn test_cycle_without_root() {
        let err = visit_hierarchy(&cyclic_hierarchy(false), VisitationLimits::default()).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { concept_id: ConceptId(2) }));
    }

    #[test]
    fn test_limits() {
        init_tracing();
        let store = SqliteStore::open_in_memory().unwrap();
        let scheme = ConceptScheme::new(1);
        let session = store.session();
        session.create_scheme(&scheme).unwrap();
        import_provider(&geography(), &scheme, &session).unwrap();

        let shallow = VisitationLimits {
            max_depth: Some(2),
            max_rows: None,
        };
        let err = VisitationCalculator::new(&session)
            .with_limits(shallow)
            .visit(&scheme)
            .unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));

        let few = VisitationLimits {
            max_depth: None,
            max_rows: Some(9),
        };
        assert!(VisitationCalculator::new(&session).with_limits(few).visit(&scheme).is_err());

        let enough = VisitationLimits {
            max_depth: Some(4),
            max_rows: Some(10),
        };
        assert_eq!(
            VisitationCalculator::new(&session).with_limits(enough).visit(&scheme).unwrap().len(),
            10
        );
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut hierarchy = Hierarchy::new();
        let depth = 50_000;
        for id in 1..=depth {
            hierarchy.add_thing(Thing {
                id,
                scheme_id: 1,
                concept_id: ConceptId(id),
                kind: ThingKind::Concept,
                uri: None,
            });
            if id > 1 {
                hierarchy.add_edge(id - 1, id);
            }
        }
        hierarchy.sort();

        let rows = visit_hierarchy(&hierarchy, VisitationLimits::default()).unwrap();
        assert_eq!(rows.len(), depth as usize);
        assert_eq!(rows[0].rght, 2 * depth as u64);
        assert_eq!(rows.last().unwrap().depth, depth as u32);
    }
}
