//! The sigil grammar: which predicate a token's prefix stands for.

// used to keep the one-to-one mapping between predicates and their sigils
use bimap::BiMap;

use crate::construct::{ACTION, NAME, SHORT};
use crate::error::{FactotumError, Result};

/// Bijective mapping between predicate names and their display sigils.
///
/// Built once at startup from a fixed descriptor list and immutable
/// afterward. The empty sigil belongs to `name`, which is rendered bare and
/// positionally first in every canonical string.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    kept: BiMap<String, String>,
}

impl TagRegistry {
    pub fn new(descriptors: &[(&str, &str)]) -> Result<Self> {
        let mut kept = BiMap::new();
        for (predicate, sigil) in descriptors {
            if kept
                .insert_no_overwrite((*predicate).to_string(), (*sigil).to_string())
                .is_err()
            {
                return Err(FactotumError::Invariant(format!(
                    "tag ({predicate}, \"{sigil}\") breaks the sigil bijection"
                )));
            }
        }
        match kept.get_by_left(NAME) {
            Some(sigil) if sigil.is_empty() => (),
            _ => {
                return Err(FactotumError::Invariant(String::from(
                    "the empty sigil is reserved for the name predicate",
                )));
            }
        }
        Ok(Self { kept })
    }

    /// The registry the menu has always shipped with: a bare name,
    /// `"` for actions and `.` for shortcuts.
    pub fn standard() -> Result<Self> {
        Self::new(&[(NAME, ""), (ACTION, "\""), (SHORT, ".")])
    }

    pub fn sigil_of(&self, predicate: &str) -> Option<&str> {
        self.kept.get_by_left(predicate).map(String::as_str)
    }

    pub fn predicate_of_sigil(&self, sigil: &str) -> Result<&str> {
        self.kept
            .get_by_right(sigil)
            .map(String::as_str)
            .ok_or_else(|| FactotumError::UnknownSigil {
                token: sigil.to_string(),
            })
    }

    /// Splits a query token into its predicate and literal value by matching
    /// the longest registered sigil prefixing it. The empty name sigil never
    /// matches here; the name token is positional, not sigil-led.
    pub fn split_token<'t>(&self, token: &'t str) -> Result<(&str, &'t str)> {
        let mut best: Option<(&str, &str)> = None;
        for (predicate, sigil) in self.kept.iter() {
            if sigil.is_empty() || !token.starts_with(sigil.as_str()) {
                continue;
            }
            if best.is_none_or(|(_, kept)| sigil.len() > kept.len()) {
                best = Some((predicate.as_str(), sigil.as_str()));
            }
        }
        let Some((predicate, sigil)) = best else {
            return Err(FactotumError::UnknownSigil {
                token: token.to_string(),
            });
        };
        Ok((predicate, &token[sigil.len()..]))
    }

    pub fn len(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}
