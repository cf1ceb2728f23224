/// Identifier sent on create requests; the server assigns the real one.
pub const NEW_PERSONA_ID: i64 = 0;

/// A persona record as delivered by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
  pub id: i64,
  pub first_name: String,
  pub last_name: String,
  /// Sex as the server reports it (normally "M" or "F")
  pub sex: String,
  /// Birth date, kept as the server's text
  pub birth_date: String,
  pub role_id: Option<i64>,
  /// Role display name resolved by the server (read-only)
  pub role: String,
}

/// The two accepted sex values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
  Female,
  Male,
}

impl Sex {
  /// Parse case-insensitively ("f", "F", " m ").
  pub fn parse(value: &str) -> Option<Self> {
    match value.trim().to_ascii_uppercase().as_str() {
      "F" => Some(Sex::Female),
      "M" => Some(Sex::Male),
      _ => None,
    }
  }

  /// Value written to the API (uppercase)
  pub fn wire_value(self) -> &'static str {
    match self {
      Sex::Female => "F",
      Sex::Male => "M",
    }
  }

  /// Value shown in the edit form (lowercase)
  pub fn form_value(self) -> &'static str {
    match self {
      Sex::Female => "f",
      Sex::Male => "m",
    }
  }

  /// Cycle unset -> f -> m -> unset, used by the form's choice field.
  pub fn cycle(current: Option<Sex>) -> Option<Sex> {
    match current {
      None => Some(Sex::Female),
      Some(Sex::Female) => Some(Sex::Male),
      Some(Sex::Male) => None,
    }
  }
}

/// Writable attributes of a persona, validated and ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaFields {
  pub first_name: String,
  pub last_name: String,
  pub sex: Sex,
  pub birth_date: String,
  pub role_id: i64,
}
