//! Snapshot persistence: the whole store plus the id counter, written once
//! at the end of a run and read once at the start of the next.
//!
//! The snapshot is a single JSON literal, deliberately human-inspectable
//! and hand-editable. A blake3 seal over the payload is stored alongside
//! it; a snapshot whose seal no longer matches fails to load, while a
//! snapshot without a seal (say, one typed in by hand) loads untouched.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::construct::{Subject, Triple};
use crate::error::{FactotumError, Result};

#[derive(Debug, Clone)]
pub enum PersistenceMode {
    InMemory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub counter: Subject,
    pub triples: Vec<Triple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal: Option<String>,
}

impl Snapshot {
    pub fn new(counter: Subject, triples: Vec<Triple>) -> Self {
        Self {
            counter,
            triples,
            seal: None,
        }
    }

    /// Hash of the payload, independent of any seal already present.
    pub fn seal_digest(&self) -> Result<String> {
        let payload = serde_json::to_vec(&(self.counter, &self.triples)).map_err(|e| {
            FactotumError::Persistence(format!("could not serialize snapshot payload: {e}"))
        })?;
        Ok(blake3::hash(&payload).to_hex().to_string())
    }
}

pub struct Persistor {
    mode: PersistenceMode,
}

impl Persistor {
    pub fn new(mode: PersistenceMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &PersistenceMode {
        &self.mode
    }

    /// `Ok(None)` when there is nothing to restore: in-memory mode, or a
    /// file-backed store that has not been saved yet.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let path = match &self.mode {
            PersistenceMode::InMemory => return Ok(None),
            PersistenceMode::File(path) => path,
        };
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot to restore");
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .map_err(|e| FactotumError::Persistence(format!("{}: {e}", path.display())))?;
        let snapshot: Snapshot = serde_json::from_str(&text)
            .map_err(|e| FactotumError::Persistence(format!("{}: {e}", path.display())))?;
        if let Some(seal) = &snapshot.seal {
            if *seal != snapshot.seal_digest()? {
                return Err(FactotumError::DataCorruption {
                    message: format!("seal mismatch in {}", path.display()),
                });
            }
        }
        info!(
            path = %path.display(),
            triples = snapshot.triples.len(),
            "snapshot restored"
        );
        Ok(Some(snapshot))
    }

    /// Seals and writes the snapshot. The write goes to a staging file that
    /// is renamed into place, so a crash mid-write leaves the previous
    /// snapshot intact.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let path = match &self.mode {
            PersistenceMode::InMemory => return Ok(()),
            PersistenceMode::File(path) => path,
        };
        let mut sealed = snapshot.clone();
        sealed.seal = Some(snapshot.seal_digest()?);
        let text = serde_json::to_string_pretty(&sealed)
            .map_err(|e| FactotumError::Persistence(format!("{}: {e}", path.display())))?;
        let staging = path.with_extension("tmp");
        fs::write(&staging, text)
            .map_err(|e| FactotumError::Persistence(format!("{}: {e}", staging.display())))?;
        fs::rename(&staging, path)
            .map_err(|e| FactotumError::Persistence(format!("{}: {e}", path.display())))?;
        info!(
            path = %path.display(),
            triples = snapshot.triples.len(),
            "snapshot written"
        );
        Ok(())
    }
}
