//! Symbolic action dispatch. Handlers live in this registry and are found
//! by name lookup only; the store never holds executable code, just the
//! `Type = action` records that make actions queryable like anything else.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::construct::{ACTION, Database, OtherHasher, Record, Subject};
use crate::error::{FactotumError, Result};

/// Handlers get the database context along with the resolved record's full
/// field map. Whatever they do with it (send mail, open a file, mutate the
/// store) is their concern; nothing meaningful flows back to the caller.
pub type Handler = Box<dyn Fn(&mut Database, &Record) -> Result<()>>;

#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<String, Handler, OtherHasher>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates the handler with its name and makes sure the matching
    /// action record exists in the database.
    pub fn register(&mut self, database: &mut Database, name: &str, handler: Handler) -> Subject {
        let subject = database.add_action_record(name);
        self.handlers.insert(name.to_string(), handler);
        debug!(name, subject, "action registered");
        subject
    }

    /// Looks up the record's `action` field and invokes the handler.
    pub fn dispatch(&self, database: &mut Database, record: &Record) -> Result<()> {
        let name = record
            .get(ACTION)
            .ok_or_else(|| FactotumError::ActionNotFound {
                action: String::from("(unset)"),
            })?;
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| FactotumError::ActionNotFound {
                action: name.to_string(),
            })?;
        info!(action = name, subject = record.subject(), "dispatching");
        handler(database, record)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
