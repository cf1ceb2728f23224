//! Modal edit session: whether the form creates or edits, and which record.

use crate::error::{Field, ValidationError};
use crate::persona::{Persona, PersonaFields, Sex};

/// Raw values of the modal form, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaForm {
  pub first_name: String,
  pub last_name: String,
  pub sex: Option<Sex>,
  pub birth_date: String,
  pub role_id: String,
}

impl PersonaForm {
  /// Pre-populate from a record. Sex is shown in its lowercase form value.
  pub fn from_persona(persona: &Persona) -> Self {
    Self {
      first_name: persona.first_name.clone(),
      last_name: persona.last_name.clone(),
      sex: Sex::parse(&persona.sex),
      birth_date: persona.birth_date.clone(),
      role_id: persona.role_id.map(|id| id.to_string()).unwrap_or_default(),
    }
  }

  /// Check required fields and convert to sendable attributes.
  pub fn validate(&self) -> Result<PersonaFields, ValidationError> {
    let first_name = required(&self.first_name, Field::FirstName)?;
    let last_name = required(&self.last_name, Field::LastName)?;
    let birth_date = required(&self.birth_date, Field::BirthDate)?;
    let sex = self.sex.ok_or(ValidationError::MissingField(Field::Sex))?;
    let role_text = required(&self.role_id, Field::RoleId)?;
    let role_id = role_text
      .parse::<i64>()
      .map_err(|_| ValidationError::InvalidRoleId(role_text.clone()))?;

    Ok(PersonaFields {
      first_name,
      last_name,
      sex,
      birth_date,
      role_id,
    })
  }
}

fn required(value: &str, field: Field) -> Result<String, ValidationError> {
  let value = value.trim();
  if value.is_empty() {
    Err(ValidationError::MissingField(field))
  } else {
    Ok(value.to_string())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
  #[default]
  Closed,
  Creating,
  Editing(Persona),
}

/// A validated request built from the form and the session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
  Create(PersonaFields),
  Update { id: i64, fields: PersonaFields },
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
  state: SessionState,
  /// Bumped on every open, so a settled request can tell whether the
  /// session it came from is still the current one
  generation: u64,
}

impl EditSession {
  pub fn state(&self) -> &SessionState {
    &self.state
  }

  pub fn is_open(&self) -> bool {
    !matches!(self.state, SessionState::Closed)
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Close only if the session opened as `generation` is still open.
  pub fn close_if_current(&mut self, generation: u64) -> bool {
    if self.is_open() && self.generation == generation {
      self.close();
      return true;
    }
    false
  }

  pub fn held_record(&self) -> Option<&Persona> {
    match &self.state {
      SessionState::Editing(record) => Some(record),
      _ => None,
    }
  }

  /// Start creating. Any previously held record is dropped.
  pub fn open_new(&mut self) -> PersonaForm {
    self.state = SessionState::Creating;
    self.generation += 1;
    PersonaForm::default()
  }

  /// Start editing `record` and return the pre-populated form.
  pub fn open_edit(&mut self, record: Persona) -> PersonaForm {
    let form = PersonaForm::from_persona(&record);
    self.state = SessionState::Editing(record);
    self.generation += 1;
    form
  }

  pub fn close(&mut self) {
    self.state = SessionState::Closed;
  }

  /// Build the request for the current state. `None` when closed.
  ///
  /// Creating always yields identifier 0 on the wire; editing always yields
  /// the identifier of the record held since `open_edit`, whatever the form
  /// contains.
  pub fn submission(&self, form: &PersonaForm) -> Option<Result<Submission, ValidationError>> {
    if !self.is_open() {
      return None;
    }
    let fields = match form.validate() {
      Ok(fields) => fields,
      Err(err) => return Some(Err(err)),
    };

    match &self.state {
      SessionState::Closed => None,
      SessionState::Creating => Some(Ok(Submission::Create(fields))),
      SessionState::Editing(record) => Some(Ok(Submission::Update {
        id: record.id,
        fields,
      })),
    }
  }

  /// Identifier to delete, taken from the held record. Closes the session
  /// first so nothing keeps operating on a record about to disappear.
  /// Does nothing unless editing.
  pub fn take_delete_target(&mut self) -> Option<i64> {
    let id = self.held_record().map(|record| record.id)?;
    self.close();
    Some(id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::state::cache::tests::persona;
  use pretty_assertions::assert_eq;

  fn filled_form() -> PersonaForm {
    PersonaForm {
      first_name: "Ana".to_string(),
      last_name: "Lopez".to_string(),
      sex: Some(Sex::Female),
      birth_date: "1990-04-01".to_string(),
      role_id: "2".to_string(),
    }
  }

  #[test]
  fn test_open_edit_populates_lowercase_sex() {
    let mut session = EditSession::default();
    let mut record = persona(4);
    record.sex = "F".to_string();

    let form = session.open_edit(record.clone());

    assert_eq!(form.sex.map(Sex::form_value), Some("f"));
    assert_eq!(form.first_name, record.first_name);
    assert_eq!(form.role_id, "1");
    assert_eq!(session.state(), &SessionState::Editing(record));
  }

  #[test]
  fn test_unchanged_edit_writes_uppercase_sex() {
    let mut session = EditSession::default();
    let form = session.open_edit(persona(4));

    match session.submission(&form) {
      Some(Ok(Submission::Update { id, fields })) => {
        assert_eq!(id, 4);
        assert_eq!(fields.sex.wire_value(), "F");
      }
      other => panic!("unexpected submission: {:?}", other),
    }
  }

  #[test]
  fn test_open_new_clears_held_record() {
    let mut session = EditSession::default();
    session.open_edit(persona(8));
    session.close();
    let form = session.open_new();

    assert_eq!(form, PersonaForm::default());
    assert!(session.held_record().is_none());
    assert_eq!(
      session.submission(&filled_form()),
      Some(Ok(Submission::Create(filled_form().validate().unwrap())))
    );
  }

  #[test]
  fn test_edit_keeps_original_id_when_fields_change() {
    let mut session = EditSession::default();
    let mut form = session.open_edit(persona(11));
    form.first_name = "Changed".to_string();
    form.role_id = "99".to_string();

    match session.submission(&form) {
      Some(Ok(Submission::Update { id, fields })) => {
        assert_eq!(id, 11);
        assert_eq!(fields.first_name, "Changed");
        assert_eq!(fields.role_id, 99);
      }
      other => panic!("unexpected submission: {:?}", other),
    }
  }

  #[test]
  fn test_submission_when_closed() {
    let session = EditSession::default();
    assert_eq!(session.submission(&filled_form()), None);
  }

  #[test]
  fn test_missing_field_blocks_submission() {
    let mut session = EditSession::default();
    session.open_new();
    let mut form = filled_form();
    form.last_name = "   ".to_string();

    assert_eq!(
      session.submission(&form),
      Some(Err(ValidationError::MissingField(Field::LastName)))
    );
    assert_eq!(session.state(), &SessionState::Creating);
  }

  #[test]
  fn test_missing_sex_and_bad_role() {
    let mut form = filled_form();
    form.sex = None;
    assert_eq!(
      form.validate(),
      Err(ValidationError::MissingField(Field::Sex))
    );

    let mut form = filled_form();
    form.role_id = "dos".to_string();
    assert_eq!(
      form.validate(),
      Err(ValidationError::InvalidRoleId("dos".to_string()))
    );
  }

  #[test]
  fn test_take_delete_target_closes_first() {
    let mut session = EditSession::default();
    session.open_edit(persona(6));

    assert_eq!(session.take_delete_target(), Some(6));
    assert_eq!(session.state(), &SessionState::Closed);
    assert_eq!(session.take_delete_target(), None);
  }

  #[test]
  fn test_close_if_current_ignores_older_sessions() {
    let mut session = EditSession::default();
    session.open_new();
    let first = session.generation();
    session.close();
    session.open_new();

    assert!(!session.close_if_current(first));
    assert_eq!(session.state(), &SessionState::Creating);

    let second = session.generation();
    assert!(session.close_if_current(second));
    assert_eq!(session.state(), &SessionState::Closed);
    assert!(!session.close_if_current(second));
  }

  #[test]
  fn test_take_delete_target_ignored_while_creating() {
    let mut session = EditSession::default();
    session.open_new();
    assert_eq!(session.take_delete_target(), None);
    assert_eq!(session.state(), &SessionState::Creating);
  }
}
