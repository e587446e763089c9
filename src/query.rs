//! Parsing, evaluation and rendering of canonical query strings.
//!
//! The grammar is `<name-token> (<sigil><value-token>)*`, space-separated.
//! The same encoding is used in both directions: [`Engine::canonical`]
//! renders a record into it, and [`Query::parse`] turns it back into a
//! conjunction of equality constraints.

use std::fmt;

// used for internal result sets
use roaring::RoaringTreemap;

use tracing::trace;

use crate::construct::{Database, NAME, Record, Subject};
use crate::error::{FactotumError, Result};
use crate::tag::TagRegistry;

// ------------- Query -------------
/// An ordered conjunction of predicate = value constraints. Only the parser
/// and the explicit builder calls below produce one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    constraints: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: &str, value: &str) -> Self {
        self.set(predicate, value);
        self
    }

    /// Adds a constraint, replacing any earlier one on the same predicate.
    pub fn set(&mut self, predicate: &str, value: &str) {
        match self
            .constraints
            .iter_mut()
            .find(|(kept, _)| kept.as_str() == predicate)
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .constraints
                .push((predicate.to_string(), value.to_string())),
        }
    }

    /// Decodes a canonical string. The first token is the bare name; every
    /// later token is split into predicate and value through the registry.
    pub fn parse(text: &str, tags: &TagRegistry) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let Some(name) = tokens.next() else {
            return Err(FactotumError::Parse {
                message: String::from("a query needs at least a name token"),
            });
        };
        let mut query = Query::new();
        query.set(NAME, name);
        for token in tokens {
            let (predicate, value) = tags.split_token(token)?;
            query.set(predicate, value);
        }
        Ok(query)
    }

    pub fn constraints(&self) -> &[(String, String)] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut separate = false;
        for (predicate, value) in &self.constraints {
            if separate {
                write!(f, " ")?;
            }
            write!(f, "{predicate}={value}")?;
            separate = true;
        }
        Ok(())
    }
}

// ------------- ResultSet -------------
/// The running set of matching subjects. Singletons and the empty set are
/// kept out of bitmap representation so the common narrow cases stay cheap:
/// intersecting against `One` is a containment probe, and `Empty` absorbs
/// everything.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    Empty,
    One(Subject),
    Many(RoaringTreemap),
}

impl ResultSet {
    pub fn new() -> Self {
        ResultSet::Empty
    }

    pub fn from_ids(ids: Option<&RoaringTreemap>) -> Self {
        let mut result = match ids {
            None => ResultSet::Empty,
            Some(ids) => ResultSet::Many(ids.clone()),
        };
        result.collapse();
        result
    }

    fn collapse(&mut self) {
        if let ResultSet::Many(ids) = self {
            match ids.len() {
                0 => *self = ResultSet::Empty,
                1 => {
                    if let Some(only) = ids.min() {
                        *self = ResultSet::One(only);
                    }
                }
                _ => (),
            }
        }
    }

    /// Narrows to the subjects also present in `ids`, where `ids` comes
    /// straight from the predicate index (`None` is the empty set).
    pub fn intersect_with(&mut self, ids: Option<&RoaringTreemap>) {
        let Some(ids) = ids else {
            *self = ResultSet::Empty;
            return;
        };
        match self {
            ResultSet::Empty => (),
            ResultSet::One(subject) => {
                if !ids.contains(*subject) {
                    *self = ResultSet::Empty;
                }
            }
            ResultSet::Many(many) => {
                *many &= ids;
            }
        }
        self.collapse();
    }

    pub fn push(&mut self, subject: Subject) {
        match self {
            ResultSet::Empty => *self = ResultSet::One(subject),
            ResultSet::One(kept) => {
                let mut ids = RoaringTreemap::new();
                ids.insert(*kept);
                ids.insert(subject);
                *self = ResultSet::Many(ids);
            }
            ResultSet::Many(ids) => {
                ids.insert(subject);
            }
        }
    }

    pub fn contains(&self, subject: Subject) -> bool {
        match self {
            ResultSet::Empty => false,
            ResultSet::One(kept) => *kept == subject,
            ResultSet::Many(ids) => ids.contains(subject),
        }
    }

    pub fn len(&self) -> u64 {
        match self {
            ResultSet::Empty => 0,
            ResultSet::One(_) => 1,
            ResultSet::Many(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResultSet::Empty)
    }

    /// Matching subjects in ascending order.
    pub fn subjects(&self) -> Vec<Subject> {
        match self {
            ResultSet::Empty => Vec::new(),
            ResultSet::One(subject) => vec![*subject],
            ResultSet::Many(ids) => ids.iter().collect(),
        }
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- Engine -------------
/// Evaluates queries against a database's indices and renders records back
/// into canonical strings.
pub struct Engine<'db> {
    database: &'db Database,
}

impl<'db> Engine<'db> {
    pub fn new(database: &'db Database) -> Self {
        Self { database }
    }

    /// Intersects the constraint sets in supplied order. The fold stops
    /// early once the running set is empty; a singleton keeps being probed
    /// against the remaining constraints, so the outcome always equals the
    /// full set intersection whatever the constraint order.
    pub fn evaluate(&self, query: &Query) -> ResultSet {
        let mut constraints = query.constraints().iter();
        let Some((predicate, value)) = constraints.next() else {
            return ResultSet::Empty;
        };
        let mut result = ResultSet::from_ids(self.database.predicates().ids_with(predicate, value));
        for (predicate, value) in constraints {
            if result.is_empty() {
                break;
            }
            result.intersect_with(self.database.predicates().ids_with(predicate, value));
        }
        trace!(query = %query, matches = result.len(), "query evaluated");
        result
    }

    /// Records for the surviving subjects, ascending by id. With an empty
    /// field list the full records are returned, otherwise copies narrowed
    /// to the requested predicates.
    pub fn project(&self, result: &ResultSet, fields: &[&str]) -> Vec<Record> {
        let mut records = Vec::new();
        for subject in result.subjects() {
            if let Some(record) = self.database.record(subject) {
                records.push(if fields.is_empty() {
                    record.clone()
                } else {
                    record.project(fields)
                });
            }
        }
        records
    }

    /// The canonical rendering of a record: the bare name first, then every
    /// field whose predicate has a non-empty sigil, ordered by sigil with
    /// ties broken by field position. Fields without a registered sigil
    /// (such as `Type`) are not rendered.
    pub fn canonical(&self, record: &Record) -> String {
        let tags = self.database.tags();
        let mut tagged: Vec<(&str, usize, &str)> = Vec::new();
        for (position, (predicate, value)) in record.fields().iter().enumerate() {
            if predicate.as_str() == NAME {
                continue;
            }
            if let Some(sigil) = tags.sigil_of(predicate) {
                if !sigil.is_empty() {
                    tagged.push((sigil, position, value));
                }
            }
        }
        tagged.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));
        let mut rendered = record.get(NAME).unwrap_or("").to_string();
        for (sigil, _, value) in tagged {
            rendered.push(' ');
            rendered.push_str(sigil);
            rendered.push_str(value);
        }
        rendered
    }
}
