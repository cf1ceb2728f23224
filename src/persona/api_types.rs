//! Serde types matching the persona API's JSON.
//!
//! These are separate from the domain types so the wire field names (which
//! are Spanish and differ between read and write shapes) stay in one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{Persona, PersonaFields, NEW_PERSONA_ID};

// ============================================================================
// Read shape (GET)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiPersona {
  #[serde(alias = "id_persona")]
  pub id: i64,
  #[serde(default)]
  pub nombre: Option<String>,
  #[serde(default)]
  pub apellido: Option<String>,
  #[serde(default)]
  pub sexo: Option<String>,
  #[serde(default)]
  pub fh_nac: Option<String>,
  #[serde(default)]
  pub id_rol: Option<i64>,
  #[serde(default)]
  pub rol: Option<String>,
}

impl ApiPersona {
  pub fn into_persona(self) -> Persona {
    Persona {
      id: self.id,
      first_name: self.nombre.unwrap_or_default(),
      last_name: self.apellido.unwrap_or_default(),
      sex: self.sexo.unwrap_or_default(),
      birth_date: self.fh_nac.unwrap_or_default(),
      role_id: self.id_rol,
      role: self.rol.unwrap_or_default(),
    }
  }
}

// ============================================================================
// Write shapes (POST, PATCH, DELETE)
// ============================================================================

/// Body for create and update. Only constructible through `for_create`
/// (identifier 0) or `for_update` (real identifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaWrite {
  id_persona: i64,
  nombre: String,
  apellido: String,
  sexo: &'static str,
  fh_nac: String,
  id_rol: i64,
}

impl PersonaWrite {
  pub fn for_create(fields: &PersonaFields) -> Self {
    Self::with_id(NEW_PERSONA_ID, fields)
  }

  pub fn for_update(id: i64, fields: &PersonaFields) -> Self {
    Self::with_id(id, fields)
  }

  fn with_id(id: i64, fields: &PersonaFields) -> Self {
    Self {
      id_persona: id,
      nombre: fields.first_name.clone(),
      apellido: fields.last_name.clone(),
      sexo: fields.sex.wire_value(),
      fh_nac: fields.birth_date.clone(),
      id_rol: fields.role_id,
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeleteBody {
  pub id_persona: i64,
}

// ============================================================================
// Responses
// ============================================================================

/// Error body returned with non-success statuses
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub message: Option<String>,
}

/// Acknowledgement returned by a successful mutation. The API returns either
/// a bare value (the new id on create) or an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Ack(pub Value);

impl Ack {
  /// Identifier carried by the acknowledgement, if any.
  pub fn assigned_id(&self) -> Option<i64> {
    match &self.0 {
      Value::Number(n) => n.as_i64(),
      Value::String(s) => s.trim().parse().ok(),
      Value::Object(map) => ["id_persona", "id", "result"]
        .iter()
        .find_map(|k| map.get(*k))
        .and_then(|v| Ack(v.clone()).assigned_id()),
      _ => None,
    }
  }
}

impl std::fmt::Display for Ack {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.assigned_id() {
      Some(id) => write!(f, "{}", id),
      None => write!(f, "{}", self.0),
    }
  }
}
