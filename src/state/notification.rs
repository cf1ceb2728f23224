use crate::error::PersonaError;
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Info,
  Error,
}

/// The action an error came from, used to pick the fallback wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Load,
  Save,
  Delete,
  Search,
}

/// Last user-visible message
#[derive(Debug, Clone)]
pub struct Notification {
  pub level: Level,
  pub message: String,
  pub at: DateTime<Local>,
}

impl Notification {
  pub fn info(message: impl Into<String>) -> Self {
    Self {
      level: Level::Info,
      message: message.into(),
      at: Local::now(),
    }
  }

  pub fn error(err: &PersonaError, action: Action) -> Self {
    Self {
      level: Level::Error,
      message: error_message(err, action),
      at: Local::now(),
    }
  }
}

/// Convert an error into the text shown to the user.
pub fn error_message(err: &PersonaError, action: Action) -> String {
  match (err, action) {
    (_, Action::Load) => "Failed to load data.".to_string(),
    (PersonaError::Network(_), _) => "Connection error. Please try again.".to_string(),
    (PersonaError::Api { .. }, Action::Delete) => {
      format!("Delete failed: {}", err.api_message_or("could not delete"))
    }
    (PersonaError::Api { .. }, _) => {
      format!("Save failed: {}", err.api_message_or("unknown error"))
    }
    (PersonaError::Validation(_), _) | (PersonaError::NotFoundLocal(_), _) => {
      sentence(&err.to_string())
    }
  }
}

fn sentence(text: &str) -> String {
  let mut chars = text.chars();
  match chars.next() {
    Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
    None => String::new(),
  }
}
