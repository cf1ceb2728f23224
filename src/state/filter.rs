//! Selection of displayed rows from the cache.
//!
//! Rows are cache indices, so a displayed row always maps back to exactly one
//! cached record and the output is a subset of the cache by construction.

use crate::error::{PersonaError, ValidationError};
use crate::persona::Persona;

/// Parse search text into an identifier.
pub fn parse_identifier(text: &str) -> Result<i64, ValidationError> {
  text
    .trim()
    .parse::<i64>()
    .map_err(|_| ValidationError::InvalidId(text.to_string()))
}

/// Indices of every record whose identifier equals `id`.
pub fn filter_by_identifier(records: &[Persona], id: i64) -> Vec<usize> {
  records
    .iter()
    .enumerate()
    .filter(|(_, p)| p.id == id)
    .map(|(i, _)| i)
    .collect()
}

/// Every index, in cache order.
pub fn show_all(records: &[Persona]) -> Vec<usize> {
  (0..records.len()).collect()
}

/// Parse then filter. Bad input and an empty match are different errors.
pub fn search(records: &[Persona], text: &str) -> Result<Vec<usize>, PersonaError> {
  let id = parse_identifier(text)?;
  let rows = filter_by_identifier(records, id);
  if rows.is_empty() {
    return Err(PersonaError::NotFoundLocal(id));
  }
  Ok(rows)
}
