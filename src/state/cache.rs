//! In-memory copy of the last successfully fetched collection.

use crate::persona::Persona;
use std::collections::HashSet;
use tracing::warn;

/// Holds the full persona collection. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default)]
pub struct LocalCache {
  records: Vec<Persona>,
}

impl LocalCache {
  /// Overwrite the held collection, keeping server order.
  ///
  /// Identifiers are unique within the cache: if the server sends the same
  /// identifier twice, only the first record is kept.
  pub fn replace(&mut self, records: Vec<Persona>) {
    let mut seen = HashSet::with_capacity(records.len());
    let total = records.len();
    self.records = records
      .into_iter()
      .filter(|record| seen.insert(record.id))
      .collect();

    if self.records.len() != total {
      warn!(
        dropped = total - self.records.len(),
        "server returned duplicate persona ids"
      );
    }
  }

  pub fn current(&self) -> &[Persona] {
    &self.records
  }

  pub fn get(&self, index: usize) -> Option<&Persona> {
    self.records.get(index)
  }
}
