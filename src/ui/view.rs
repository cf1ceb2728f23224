use crate::commands::Command;
use crate::state::Notification;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
  /// No action needed
  None,
  /// Leave the application
  Quit,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, editor, confirmation) and
/// return actions for the App to execute: App → View → Components.
///
/// Views that load data asynchronously poll their queries in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Run a command chosen in the palette
  fn handle_command(&mut self, command: &Command) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to allow views to poll async queries
  fn tick(&mut self) {}

  /// Whether a modal overlay owns the keyboard. The App keeps the command
  /// palette closed while this is true.
  fn captures_keys(&self) -> bool {
    false
  }

  /// Message for the footer
  fn status(&self) -> Option<&Notification> {
    None
  }

  /// Get keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
