//! Client-side state: cached records, displayed rows, edit session and the
//! last notification, held together in one container.
//!
//! This module is synchronous and knows nothing about the network. The
//! controller feeds it request results; the UI reads it.

pub mod cache;
pub mod filter;
pub mod notification;
pub mod session;

pub use cache::LocalCache;
pub use notification::{Action, Level, Notification};
pub use session::{EditSession, PersonaForm, SessionState, Submission};

use crate::error::PersonaError;
use crate::persona::Persona;
use tracing::warn;

/// What the table currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableContent {
  /// Cache indices, in display order
  Rows(Vec<usize>),
  /// The last fetch failed
  LoadFailed,
  /// The last search matched nothing
  NotFound(i64),
}

impl Default for TableContent {
  fn default() -> Self {
    TableContent::Rows(Vec::new())
  }
}

#[derive(Debug, Default)]
pub struct PersonaState {
  cache: LocalCache,
  content: TableContent,
  session: EditSession,
  active_search: Option<String>,
  notification: Option<Notification>,
}

impl PersonaState {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg(test)]
  pub fn cache(&self) -> &LocalCache {
    &self.cache
  }

  pub fn content(&self) -> &TableContent {
    &self.content
  }

  pub fn session(&self) -> &EditSession {
    &self.session
  }

  pub fn session_mut(&mut self) -> &mut EditSession {
    &mut self.session
  }

  /// Search text behind the current filter, if one is applied
  pub fn active_search(&self) -> Option<&str> {
    self.active_search.as_deref()
  }

  pub fn notification(&self) -> Option<&Notification> {
    self.notification.as_ref()
  }

  /// Records currently displayed, in row order
  pub fn current_record_set(&self) -> Vec<&Persona> {
    match &self.content {
      TableContent::Rows(rows) => rows.iter().filter_map(|&i| self.cache.get(i)).collect(),
      TableContent::LoadFailed | TableContent::NotFound(_) => Vec::new(),
    }
  }

  /// Resolve a displayed row to its cached record.
  pub fn record_at_row(&self, row: usize) -> Option<&Persona> {
    match &self.content {
      TableContent::Rows(rows) => rows.get(row).and_then(|&i| self.cache.get(i)),
      _ => None,
    }
  }

  /// Apply the result of a full fetch. Success replaces the cache, shows
  /// everything and forgets any search; failure leaves the cache alone and
  /// shows "no data".
  pub fn apply_list(&mut self, result: Result<Vec<Persona>, PersonaError>) {
    match result {
      Ok(records) => {
        self.cache.replace(records);
        self.content = TableContent::Rows(filter::show_all(self.cache.current()));
        self.active_search = None;
      }
      Err(err) => {
        warn!(error = %err, "failed to load personas");
        self.content = TableContent::LoadFailed;
        self.notify_error(&err, Action::Load);
      }
    }
  }

  /// Filter the table by identifier. Invalid input leaves the table as it
  /// was; a valid id with no match shows "not found".
  pub fn search(&mut self, text: &str) -> Result<usize, PersonaError> {
    match filter::search(self.cache.current(), text) {
      Ok(rows) => {
        let count = rows.len();
        self.content = TableContent::Rows(rows);
        self.active_search = Some(text.trim().to_string());
        Ok(count)
      }
      Err(err) => {
        if let PersonaError::NotFoundLocal(id) = err {
          self.content = TableContent::NotFound(id);
          self.active_search = Some(text.trim().to_string());
        }
        self.notify_error(&err, Action::Search);
        Err(err)
      }
    }
  }

  /// Reset the view to the whole cache and forget the search.
  pub fn show_all(&mut self) {
    self.content = TableContent::Rows(filter::show_all(self.cache.current()));
    self.active_search = None;
  }

  /// Forget the search text without touching the displayed rows.
  pub fn clear_search(&mut self) {
    self.active_search = None;
  }

  pub fn notify(&mut self, message: impl Into<String>) {
    self.notification = Some(Notification::info(message));
  }

  pub fn notify_error(&mut self, err: &PersonaError, action: Action) {
    self.notification = Some(Notification::error(err, action));
  }
}
