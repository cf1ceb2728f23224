pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use components::CommandInput;
use ratatui::prelude::*;
use ratatui::widgets::TableState;
use view::View;

/// Main draw function: header, active view, footer, then the palette on top
pub fn draw(frame: &mut Frame, title: &str, view: &mut dyn View, command: &CommandInput) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], title, &view.shortcuts());
  view.render(frame, chunks[1]);
  renderfns::draw_footer(frame, chunks[2], view.status(), &view.breadcrumb_label());

  command.render_overlay(frame, chunks[1]);
}

/// Keep the table selection inside `len` rows; nothing selected when empty
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}
