//! Narrowing a query down to exactly one record.
//!
//! Evaluation has three outcomes: no match, one match, or several. The
//! first two are terminal. The third re-renders every candidate as its
//! canonical string and defers to the external chooser; the selection is
//! parsed as a fresh query and the loop re-enters. Canonical strings are
//! constructed to be unambiguous, so this converges in one step unless the
//! user typed a partial string, in which case the loop simply runs again.

use tracing::{debug, info};

use crate::chooser::Chooser;
use crate::construct::{Database, Record};
use crate::error::{FactotumError, Result};
use crate::query::{Engine, Query, ResultSet};

#[derive(Debug)]
pub enum Resolution {
    Resolved(Record),
    NotFound,
    Cancelled,
}

pub struct Resolver<'db, 'ch> {
    database: &'db Database,
    chooser: &'ch mut dyn Chooser,
    required: Vec<(String, String)>,
    prompt: String,
}

impl<'db, 'ch> Resolver<'db, 'ch> {
    pub fn new(database: &'db Database, chooser: &'ch mut dyn Chooser) -> Self {
        Self {
            database,
            chooser,
            required: Vec::new(),
            prompt: String::from("resolve"),
        }
    }

    /// A constraint merged into every query this resolver evaluates, also
    /// the ones re-parsed from chooser selections (a selection names fields,
    /// not record kinds, so a fixed `Type = item` filter must be re-applied).
    pub fn require(mut self, predicate: &str, value: &str) -> Self {
        self.required.push((predicate.to_string(), value.to_string()));
        self
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }

    pub fn resolve(&mut self, mut query: Query) -> Result<Resolution> {
        let engine = Engine::new(self.database);
        loop {
            for (predicate, value) in &self.required {
                query.set(predicate, value);
            }
            let matches = engine.evaluate(&query);
            match matches {
                ResultSet::Empty => {
                    info!(query = %query, "no matching record");
                    return Ok(Resolution::NotFound);
                }
                ResultSet::One(subject) => {
                    let record = self.database.record(subject).cloned().ok_or_else(|| {
                        FactotumError::Invariant(format!(
                            "indexed subject {subject} has no record"
                        ))
                    })?;
                    return Ok(Resolution::Resolved(record));
                }
                many => {
                    let candidates: Vec<String> = engine
                        .project(&many, &[])
                        .iter()
                        .map(|record| engine.canonical(record))
                        .collect();
                    debug!(
                        query = %query,
                        candidates = candidates.len(),
                        "ambiguous, deferring to the chooser"
                    );
                    match self.chooser.choose(&candidates, &self.prompt)? {
                        None => return Ok(Resolution::Cancelled),
                        Some(selection) => {
                            query = Query::parse(&selection, self.database.tags())?;
                        }
                    }
                }
            }
        }
    }
}
