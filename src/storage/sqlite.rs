//! SQLite storage implementation

use super::schema;
use crate::identifier::ConceptId;
use crate::relation::{Match, MatchType, Membership, Relation, RelationKind};
use crate::thing::{ConceptScheme, Label, LabelType, Note, NoteType, Thing, ThingKind};
use crate::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

const THING_COLUMNS: &str = "t.id, t.scheme_id, t.concept_id, t.kind, t.uri";

/// SQLite-backed storage for concept schemes
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema and seed the reference tables
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::ENABLE_FOREIGN_KEYS)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        for (table, name) in schema::reference_data() {
            self.conn.execute(
                &format!("INSERT OR IGNORE INTO {} (name) VALUES (?1)", table),
                [name],
            )?;
        }
        Ok(())
    }

    /// Autocommit session over the plain connection
    pub fn session(&self) -> Session<'_> {
        Session { conn: &self.conn }
    }

    /// Begin a unit of work. Nothing written through it survives unless
    /// [`UnitOfWork::commit`] is called.
    pub fn unit_of_work(&mut self) -> Result<UnitOfWork<'_>> {
        let tx = self.conn.transaction()?;
        Ok(UnitOfWork { tx })
    }
}

/// A transaction boundary owned by the caller
pub struct UnitOfWork<'a> {
    tx: Transaction<'a>,
}

impl<'a> UnitOfWork<'a> {
    pub fn session(&self) -> Session<'_> {
        Session { conn: &self.tx }
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

/// Explicit store handle passed through every data store operation.
///
/// A session borrows either the store's connection or an open unit of
/// work; writes land wherever the borrowed connection points.
#[derive(Clone, Copy)]
pub struct Session<'a> {
    conn: &'a Connection,
}

impl<'a> Session<'a> {
    // ========== Scheme Operations ==========

    pub fn create_scheme(&self, scheme: &ConceptScheme) -> Result<()> {
        self.conn.execute(
            "INSERT INTO concept_schemes (id, uri) VALUES (?1, ?2)",
            params![scheme.id, scheme.uri],
        )?;
        Ok(())
    }

    pub fn get_scheme(&self, id: i64) -> Result<Option<ConceptScheme>> {
        self.conn
            .query_row(
                "SELECT id, uri FROM concept_schemes WHERE id = ?1",
                [id],
                |row| {
                    Ok(ConceptScheme {
                        id: row.get(0)?,
                        uri: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    // ========== Thing Operations ==========

    /// Create a concept or collection. Fails with `DuplicateId` when the
    /// scheme already holds a thing of either variant with this id.
    pub fn create_thing(
        &self,
        scheme: &ConceptScheme,
        concept_id: ConceptId,
        kind: ThingKind,
        uri: Option<&str>,
    ) -> Result<Thing> {
        if self.find_thing(scheme.id, concept_id)?.is_some() {
            return Err(Error::DuplicateId {
                scheme_id: scheme.id,
                concept_id,
            });
        }

        self.conn.execute(
            "INSERT INTO things (scheme_id, concept_id, kind, uri) VALUES (?1, ?2, ?3, ?4)",
            params![scheme.id, concept_id.value(), kind.as_str(), uri],
        )?;

        Ok(Thing {
            id: self.conn.last_insert_rowid(),
            scheme_id: scheme.id,
            concept_id,
            kind,
            uri: uri.map(str::to_string),
        })
    }

    /// Get a thing by row id
    pub fn get_thing(&self, id: i64) -> Result<Option<Thing>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM things t WHERE t.id = ?1", THING_COLUMNS),
                [id],
                row_to_thing,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Look a thing up by its scheme-wide identity
    pub fn find_thing(&self, scheme_id: i64, concept_id: ConceptId) -> Result<Option<Thing>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM things t WHERE t.scheme_id = ?1 AND t.concept_id = ?2",
                    THING_COLUMNS
                ),
                params![scheme_id, concept_id.value()],
                row_to_thing,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All things of a scheme, ordered by concept id
    pub fn things_in_scheme(&self, scheme_id: i64) -> Result<Vec<Thing>> {
        self.query_things(
            &format!(
                "SELECT {} FROM things t WHERE t.scheme_id = ?1 ORDER BY t.concept_id",
                THING_COLUMNS
            ),
            scheme_id,
        )
    }

    pub fn count_things(&self, scheme_id: i64) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM things WHERE scheme_id = ?1", scheme_id)
    }

    // ========== Label & Note Operations ==========

    pub fn add_label(&self, thing: &Thing, label: &Label) -> Result<()> {
        self.conn.execute(
            "INSERT INTO labels (thing_id, label_type, language, label) VALUES (?1, ?2, ?3, ?4)",
            params![thing.id, label.label_type.as_str(), label.language, label.label],
        )?;
        Ok(())
    }

    pub fn labels(&self, thing_id: i64) -> Result<Vec<Label>> {
        let mut stmt = self.conn.prepare(
            "SELECT label_type, language, label FROM labels WHERE thing_id = ?1 ORDER BY id",
        )?;

        let labels = stmt
            .query_map([thing_id], |row| {
                let type_str: String = row.get(0)?;
                let label_type: LabelType = type_str.parse().map_err(|e: Error| {
                    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
                })?;
                Ok(Label {
                    label_type,
                    language: row.get(1)?,
                    label: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(labels)
    }

    pub fn add_note(&self, thing: &Thing, note: &Note) -> Result<()> {
        self.conn.execute(
            "INSERT INTO notes (thing_id, note_type, language, note) VALUES (?1, ?2, ?3, ?4)",
            params![thing.id, note.note_type.as_str(), note.language, note.note],
        )?;
        Ok(())
    }

    pub fn notes(&self, thing_id: i64) -> Result<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare("SELECT note_type, language, note FROM notes WHERE thing_id = ?1 ORDER BY id")?;

        let notes = stmt
            .query_map([thing_id], |row| {
                let type_str: String = row.get(0)?;
                let note_type: NoteType = type_str.parse().map_err(|e: Error| {
                    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
                })?;
                Ok(Note {
                    note_type,
                    language: row.get(1)?,
                    note: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(notes)
    }

    // ========== Relation Operations ==========

    /// Record `subject kind object`.
    ///
    /// Returns `false` when the same logical edge already exists, whichever
    /// endpoint declared it first.
    pub fn create_relation(&self, subject: &Thing, object: &Thing, kind: RelationKind) -> Result<bool> {
        if subject.scheme_id != object.scheme_id {
            return Err(Error::DanglingReference {
                scheme_id: subject.scheme_id,
                concept_id: object.concept_id,
                context: format!("{} of {} (thing lives in scheme {})", kind, subject.concept_id, object.scheme_id),
            });
        }

        let relation = Relation::new(subject.id, object.id, kind);
        if relation.is_self_relation() {
            return Err(Error::SelfRelation {
                scheme_id: subject.scheme_id,
                concept_id: subject.concept_id,
                kind,
            });
        }

        let canonical = relation.canonical();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO relations (subject_id, object_id, kind) VALUES (?1, ?2, ?3)",
            params![canonical.subject_id, canonical.object_id, canonical.kind.as_str()],
        )?;
        Ok(inserted > 0)
    }

    /// Things the given thing is narrower than
    pub fn broader(&self, thing_id: i64) -> Result<Vec<Thing>> {
        self.query_things(
            &format!(
                "SELECT {} FROM relations r JOIN things t ON t.id = r.object_id \
                 WHERE r.subject_id = ?1 AND r.kind = 'broader' ORDER BY t.concept_id",
                THING_COLUMNS
            ),
            thing_id,
        )
    }

    /// Things the given thing is broader than
    pub fn narrower(&self, thing_id: i64) -> Result<Vec<Thing>> {
        self.query_things(
            &format!(
                "SELECT {} FROM relations r JOIN things t ON t.id = r.subject_id \
                 WHERE r.object_id = ?1 AND r.kind = 'broader' ORDER BY t.concept_id",
                THING_COLUMNS
            ),
            thing_id,
        )
    }

    pub fn related(&self, thing_id: i64) -> Result<Vec<Thing>> {
        self.query_things(
            &format!(
                "SELECT {} FROM relations r JOIN things t \
                 ON t.id = CASE WHEN r.subject_id = ?1 THEN r.object_id ELSE r.subject_id END \
                 WHERE (r.subject_id = ?1 OR r.object_id = ?1) AND r.kind = 'related' \
                 ORDER BY t.concept_id",
                THING_COLUMNS
            ),
            thing_id,
        )
    }

    /// Broader/narrower adjacency of a scheme as (broader id, narrower id) pairs
    pub fn hierarchy_edges(&self, scheme_id: i64) -> Result<Vec<(i64, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.object_id, r.subject_id FROM relations r \
             JOIN things t ON t.id = r.subject_id \
             WHERE t.scheme_id = ?1 AND r.kind = 'broader' ORDER BY r.id",
        )?;

        let edges = stmt
            .query_map([scheme_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(edges)
    }

    // ========== Match Operations ==========

    /// Returns `false` when the identical match is already stored
    pub fn create_match(&self, thing: &Thing, match_type: MatchType, uri: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO matches (thing_id, match_type, uri) VALUES (?1, ?2, ?3)",
            params![thing.id, match_type.as_str(), uri],
        )?;
        Ok(inserted > 0)
    }

    pub fn matches(&self, thing_id: i64) -> Result<Vec<Match>> {
        let mut stmt = self
            .conn
            .prepare("SELECT thing_id, match_type, uri FROM matches WHERE thing_id = ?1 ORDER BY id")?;

        let matches = stmt
            .query_map([thing_id], |row| {
                let type_str: String = row.get(1)?;
                let match_type: MatchType = type_str.parse().map_err(|e: Error| {
                    rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
                })?;
                Ok(Match {
                    thing_id: row.get(0)?,
                    match_type,
                    uri: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(matches)
    }

    // ========== Membership Operations ==========

    pub fn add_member(&self, collection: &Thing, member: &Thing, position: u32) -> Result<()> {
        if collection.scheme_id != member.scheme_id {
            return Err(Error::DanglingReference {
                scheme_id: collection.scheme_id,
                concept_id: member.concept_id,
                context: format!("member of {} (thing lives in scheme {})", collection.concept_id, member.scheme_id),
            });
        }

        self.conn.execute(
            "INSERT INTO members (collection_id, member_id, position) VALUES (?1, ?2, ?3)",
            params![collection.id, member.id, position],
        )?;
        Ok(())
    }

    /// Members of a collection in declaration order
    pub fn members(&self, collection_id: i64) -> Result<Vec<Thing>> {
        self.query_things(
            &format!(
                "SELECT {} FROM members m JOIN things t ON t.id = m.member_id \
                 WHERE m.collection_id = ?1 ORDER BY m.position",
                THING_COLUMNS
            ),
            collection_id,
        )
    }

    /// Membership records of a collection in declaration order
    pub fn memberships(&self, collection_id: i64) -> Result<Vec<Membership>> {
        let mut stmt = self.conn.prepare(
            "SELECT collection_id, member_id, position FROM members \
             WHERE collection_id = ?1 ORDER BY position",
        )?;

        let memberships = stmt
            .query_map([collection_id], |row| {
                Ok(Membership {
                    collection_id: row.get(0)?,
                    member_id: row.get(1)?,
                    position: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(memberships)
    }

    // ========== Statistics ==========

    pub fn scheme_stats(&self, scheme_id: i64) -> Result<SchemeStats> {
        Ok(SchemeStats {
            concepts: self.count(
                "SELECT COUNT(*) FROM things WHERE scheme_id = ?1 AND kind = 'concept'",
                scheme_id,
            )?,
            collections: self.count(
                "SELECT COUNT(*) FROM things WHERE scheme_id = ?1 AND kind = 'collection'",
                scheme_id,
            )?,
            labels: self.count(
                "SELECT COUNT(*) FROM labels l JOIN things t ON t.id = l.thing_id WHERE t.scheme_id = ?1",
                scheme_id,
            )?,
            notes: self.count(
                "SELECT COUNT(*) FROM notes n JOIN things t ON t.id = n.thing_id WHERE t.scheme_id = ?1",
                scheme_id,
            )?,
            hierarchical: self.count(
                "SELECT COUNT(*) FROM relations r JOIN things t ON t.id = r.subject_id \
                 WHERE t.scheme_id = ?1 AND r.kind = 'broader'",
                scheme_id,
            )?,
            related: self.count(
                "SELECT COUNT(*) FROM relations r JOIN things t ON t.id = r.subject_id \
                 WHERE t.scheme_id = ?1 AND r.kind = 'related'",
                scheme_id,
            )?,
            matches: self.count(
                "SELECT COUNT(*) FROM matches m JOIN things t ON t.id = m.thing_id WHERE t.scheme_id = ?1",
                scheme_id,
            )?,
            members: self.count(
                "SELECT COUNT(*) FROM members m JOIN things t ON t.id = m.collection_id WHERE t.scheme_id = ?1",
                scheme_id,
            )?,
        })
    }

    fn count(&self, sql: &str, key: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [key], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_things(&self, sql: &str, key: i64) -> Result<Vec<Thing>> {
        let mut stmt = self.conn.prepare(sql)?;
        let things = stmt
            .query_map([key], row_to_thing)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(things)
    }
}

/// Helper to convert a row to a Thing
fn row_to_thing(row: &rusqlite::Row) -> rusqlite::Result<Thing> {
    let kind_str: String = row.get(3)?;
    let kind: ThingKind = kind_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Thing {
        id: row.get(0)?,
        scheme_id: row.get(1)?,
        concept_id: ConceptId(row.get(2)?),
        kind,
        uri: row.get(4)?,
    })
}

/// Per-scheme statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemeStats {
    pub concepts: usize,
    pub collections: usize,
    pub labels: usize,
    pub notes: usize,
    pub hierarchical: usize,
    pub related: usize,
    pub matches: usize,
    pub members: usize,
}

impl SchemeStats {
    pub fn things(&self) -> usize {
        self.concepts + self.collections
    }
}

impl std::fmt::Display for SchemeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Scheme Statistics:")?;
        writeln!(f, "  Concepts: {}", self.concepts)?;
        writeln!(f, "  Collections: {}", self.collections)?;
        writeln!(f, "  Labels: {}", self.labels)?;
        writeln!(f, "  Notes: {}", self.notes)?;
        writeln!(f, "  Broader/narrower pairs: {}", self.hierarchical)?;
        writeln!(f, "  Related pairs: {}", self.related)?;
        writeln!(f, "  Matches: {}", self.matches)?;
        writeln!(f, "  Members: {}", self.members)
    }
}
