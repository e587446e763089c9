use std::path::Path;

// indexes use HashMap with a fast non-cryptographic hasher
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::HashMap;

// subject id sets in the inverted index are kept as bitmaps
use roaring::RoaringTreemap;

use serde::{Deserialize, Serialize};

// used to print out readable forms of a construct
use std::fmt;

use tracing::{debug, info};

// our own stuff that we need
use crate::error::{FactotumError, Result};
use crate::persist::{Persistor, Snapshot};
use crate::query::{Engine, Query, ResultSet};
use crate::tag::TagRegistry;

// ------------- Subject -------------
pub type Subject = u64;

pub type SubjectHasher = BuildHasherDefault<SeaHasher>;
pub type OtherHasher = BuildHasherDefault<SeaHasher>;

pub const GENESIS: Subject = 0;

// reserved predicates
pub const NAME: &str = "name";
pub const TYPE: &str = "Type";
pub const ACTION: &str = "action";
pub const SHORT: &str = "short";
pub const FILE_NAME: &str = "file_name";
pub const FILE_TYPE: &str = "file_type";

// reserved Type values
pub const ITEM: &str = "item";

/// Hands out subject identifiers. Identifiers strictly increase and are
/// never reused; `retain` raises the floor when a persisted store is
/// restored, so a restart cannot re-issue an id that already names a record.
#[derive(Debug, Default)]
pub struct SubjectGenerator {
    lower_bound: Subject,
}

impl SubjectGenerator {
    pub fn new() -> Self {
        Self {
            lower_bound: GENESIS,
        }
    }
    pub fn retain(&mut self, subject: Subject) {
        if subject > self.lower_bound {
            self.lower_bound = subject;
        }
    }
    pub fn generate(&mut self) -> Subject {
        self.lower_bound += 1;
        self.lower_bound
    }
    pub fn current(&self) -> Subject {
        self.lower_bound
    }
}

// ------------- Triple -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: String,
    pub value: String,
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(i{}, {}, {})", self.subject, self.predicate, self.value)
    }
}

/// The flat list of facts. Everything else in the database is derived from
/// this sequence, and only this sequence (plus the generator's counter) is
/// persisted.
#[derive(Debug, Default)]
pub struct TripleStore {
    triples: Vec<Triple>,
}

impl TripleStore {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn restore(triples: Vec<Triple>) -> Self {
        Self { triples }
    }
    pub fn add(&mut self, subject: Subject, predicate: &str, value: &str) {
        self.triples.push(Triple {
            subject,
            predicate: predicate.to_string(),
            value: value.to_string(),
        });
    }
    /// Drops every fact held about a subject.
    pub fn remove(&mut self, subject: Subject) {
        self.triples.retain(|triple| triple.subject != subject);
    }
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }
    pub fn len(&self) -> usize {
        self.triples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

// ------------- Record -------------
/// The derived field map of one subject. Fields keep their first-seen
/// position; setting a predicate again replaces the value in place, so the
/// most recently added triple for a (subject, predicate) pair wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    subject: Subject,
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            fields: Vec::new(),
        }
    }
    pub fn subject(&self) -> Subject {
        self.subject
    }
    pub fn get(&self, predicate: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(kept, _)| kept.as_str() == predicate)
            .map(|(_, value)| value.as_str())
    }
    pub fn set(&mut self, predicate: &str, value: &str) {
        match self
            .fields
            .iter_mut()
            .find(|(kept, _)| kept.as_str() == predicate)
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((predicate.to_string(), value.to_string())),
        }
    }
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
    /// A copy narrowed to the wanted predicates.
    pub fn project(&self, wanted: &[&str]) -> Record {
        Record {
            subject: self.subject,
            fields: self
                .fields
                .iter()
                .filter(|(predicate, _)| wanted.contains(&predicate.as_str()))
                .cloned()
                .collect(),
        }
    }
}

// ------------- SubjectIndex -------------
/// subject -> (predicate -> value), grouped from the store.
#[derive(Debug, Default)]
pub struct SubjectIndex {
    index: HashMap<Subject, Record, SubjectHasher>,
}

impl SubjectIndex {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, triple: &Triple) {
        self.index
            .entry(triple.subject)
            .or_insert_with(|| Record::new(triple.subject))
            .set(&triple.predicate, &triple.value);
    }
    pub fn record(&self, subject: Subject) -> Option<&Record> {
        self.index.get(&subject)
    }
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.index.values()
    }
    pub fn len(&self) -> usize {
        self.index.len()
    }
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

// ------------- PredicateIndex -------------
/// The inverted index: predicate -> value -> set of subject ids. Insertion
/// is idempotent because the sets are bitmaps.
#[derive(Debug, Default)]
pub struct PredicateIndex {
    index: HashMap<String, HashMap<String, RoaringTreemap, OtherHasher>, OtherHasher>,
}

impl PredicateIndex {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, predicate: &str, value: &str, subject: Subject) {
        self.index
            .entry(predicate.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(subject);
    }
    /// `None` simply means no subject carries that value; it is not an error.
    pub fn ids_with(&self, predicate: &str, value: &str) -> Option<&RoaringTreemap> {
        self.index
            .get(predicate)
            .and_then(|values| values.get(value))
    }
    pub fn len(&self) -> usize {
        self.index.len()
    }
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

// ------------- Database -------------
/// The context object owning the store, the derived indices, the subject
/// generator, the tag registry and the persistence layer. Owned by the entry
/// point and passed by reference; there are no ambient globals and, since
/// the whole program is single-threaded, no locks.
pub struct Database {
    store: TripleStore,
    subjects: SubjectIndex,
    predicates: PredicateIndex,
    generator: SubjectGenerator,
    tags: TagRegistry,
    persistor: Persistor,
}

impl Database {
    /// Restores the persisted snapshot (if any) and derives the indices.
    pub fn new(persistor: Persistor, tags: TagRegistry) -> Result<Self> {
        let mut database = Self {
            store: TripleStore::new(),
            subjects: SubjectIndex::new(),
            predicates: PredicateIndex::new(),
            generator: SubjectGenerator::new(),
            tags,
            persistor,
        };
        if let Some(snapshot) = database.persistor.load()? {
            database.generator.retain(snapshot.counter);
            // the triples themselves raise the floor too, in case a
            // hand-edited snapshot carries a stale counter
            for triple in &snapshot.triples {
                database.generator.retain(triple.subject);
            }
            database.store = TripleStore::restore(snapshot.triples);
        }
        database.rebuild_indices();
        Ok(database)
    }

    /// Re-derives both indices from the store. Invoked after every load or
    /// mutation batch. The subject index is built first with last-writer
    /// field semantics, and the predicate index is derived from it, so a
    /// superseded value never lingers in the inverted sets.
    pub fn rebuild_indices(&mut self) {
        let mut subjects = SubjectIndex::new();
        for triple in self.store.iter() {
            subjects.insert(triple);
        }
        let mut predicates = PredicateIndex::new();
        for record in subjects.records() {
            for (predicate, value) in record.fields() {
                predicates.insert(predicate, value, record.subject());
            }
        }
        self.subjects = subjects;
        self.predicates = predicates;
        debug!(
            triples = self.store.len(),
            subjects = self.subjects.len(),
            "indices rebuilt"
        );
    }

    pub fn store(&self) -> &TripleStore {
        &self.store
    }
    pub fn subjects(&self) -> &SubjectIndex {
        &self.subjects
    }
    pub fn predicates(&self) -> &PredicateIndex {
        &self.predicates
    }
    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }
    pub fn record(&self, subject: Subject) -> Option<&Record> {
        self.subjects.record(subject)
    }

    /// Adds an item record: a mandatory name plus any tagged fields.
    pub fn add_entry(&mut self, name: &str, tags: &[(String, String)]) -> Subject {
        let subject = self.generator.generate();
        self.store.add(subject, NAME, name);
        self.store.add(subject, TYPE, ITEM);
        for (predicate, value) in tags {
            self.store.add(subject, predicate, value);
        }
        self.rebuild_indices();
        info!(subject, name, "entry added");
        subject
    }

    /// Ensures a queryable record of `Type = action` with the given name
    /// exists and returns its subject. Actions registered again (as happens
    /// on every restart) reuse the record instead of accumulating duplicates.
    pub fn add_action_record(&mut self, name: &str) -> Subject {
        let existing = {
            let engine = Engine::new(self);
            let query = Query::new().with(NAME, name).with(TYPE, ACTION);
            match engine.evaluate(&query) {
                ResultSet::Empty => None,
                ResultSet::One(subject) => Some(subject),
                ResultSet::Many(subjects) => subjects.min(),
            }
        };
        if let Some(subject) = existing {
            return subject;
        }
        let subject = self.generator.generate();
        self.store.add(subject, NAME, name);
        self.store.add(subject, TYPE, ACTION);
        self.rebuild_indices();
        info!(subject, name, "action record added");
        subject
    }

    /// Adds a file-backed item. The basename becomes the record's name; the
    /// absolute path and the caller-supplied kind are stored alongside it.
    pub fn add_file(&mut self, path: &Path, kind: &str) -> Result<Subject> {
        if !path.exists() {
            return Err(FactotumError::MissingFile(path.to_path_buf()));
        }
        let absolute = path
            .canonicalize()
            .map_err(|_| FactotumError::MissingFile(path.to_path_buf()))?;
        let basename = absolute
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| absolute.display().to_string());
        let subject = self.generator.generate();
        self.store.add(subject, NAME, &basename);
        self.store.add(subject, TYPE, ITEM);
        self.store.add(subject, FILE_NAME, &absolute.display().to_string());
        self.store.add(subject, FILE_TYPE, kind);
        self.rebuild_indices();
        info!(subject, name = %basename, "file entry added");
        Ok(subject)
    }

    /// Removes every fact held about a subject.
    pub fn delete_subject(&mut self, subject: Subject) {
        self.store.remove(subject);
        self.rebuild_indices();
        info!(subject, "subject deleted");
    }

    /// Single-field change, modeled as a fresh triple for the same
    /// predicate; the rebuild makes the newest value authoritative.
    pub fn change_field(&mut self, subject: Subject, predicate: &str, value: &str) {
        self.store.add(subject, predicate, value);
        self.rebuild_indices();
        debug!(subject, predicate, "field changed");
    }

    /// Writes the snapshot. Only called at the very end of a run; a failure
    /// here is fatal to the caller since the in-memory mutations are lost.
    pub fn save(&self) -> Result<()> {
        let snapshot = Snapshot::new(self.generator.current(), self.store.triples().to_vec());
        self.persistor.save(&snapshot)
    }
}
