//! Error types for persona operations.
//!
//! Every variant is caught at the boundary of the action that produced it and
//! turned into a notification; none of them end the session.

/// Form field names, used to report which required field is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  FirstName,
  LastName,
  Sex,
  BirthDate,
  RoleId,
}

impl Field {
  pub fn label(self) -> &'static str {
    match self {
      Field::FirstName => "first name",
      Field::LastName => "last name",
      Field::Sex => "sex",
      Field::BirthDate => "birth date",
      Field::RoleId => "role id",
    }
  }
}

/// Local precondition failures, raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("please fill in all fields (missing {})", .0.label())]
  MissingField(Field),

  #[error("role id must be a whole number, got {0:?}")]
  InvalidRoleId(String),

  #[error("please enter a valid numeric ID")]
  InvalidId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersonaError {
  /// No usable response arrived (transport failure, bad status on list, bad body)
  #[error("connection error: {0}")]
  Network(String),

  /// The server answered with a non-success status
  #[error("{}", .message.as_deref().unwrap_or("request rejected by server"))]
  Api { status: u16, message: Option<String> },

  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// A search matched no cached record
  #[error("no record found with ID {0}")]
  NotFoundLocal(i64),
}

impl PersonaError {
  /// Server message if there is one, otherwise the given fallback.
  pub fn api_message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
    match self {
      PersonaError::Api {
        message: Some(message),
        ..
      } => message,
      _ => fallback,
    }
  }
}

impl From<reqwest::Error> for PersonaError {
  fn from(err: reqwest::Error) -> Self {
    PersonaError::Network(err.to_string())
  }
}
