use super::input::{cursor_spans, InputResult, TextInput};
use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

const MAX_SUGGESTIONS: usize = 6;

/// Command palette opened with `:`, with autocomplete
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected_suggestion: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  fn open(&mut self) {
    self.active = true;
    self.input.clear();
    self.selected_suggestion = 0;
  }

  fn close(&mut self) {
    self.active = false;
    self.input.clear();
    self.selected_suggestion = 0;
  }

  fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  /// Exact name/alias wins; otherwise the highlighted suggestion
  fn chosen(&self) -> Option<&'static Command> {
    commands::resolve(self.input.value())
      .or_else(|| self.suggestions().get(self.selected_suggestion).copied())
  }

  fn move_selection(&mut self, forward: bool) {
    let count = self.suggestions().len().min(MAX_SUGGESTIONS);
    if count == 0 {
      return;
    }
    self.selected_suggestion = if forward {
      (self.selected_suggestion + 1) % count
    } else {
      (self.selected_suggestion + count - 1) % count
    };
  }

  /// Handle a key event. Emits the chosen command on Enter; an unknown
  /// command just closes the palette.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<&'static Command> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.open();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => self.move_selection(true),
      KeyCode::BackTab | KeyCode::Up => self.move_selection(false),
      _ => match self.input.handle_key(key) {
        InputResult::Submitted(_) => {
          let chosen = self.chosen();
          self.close();
          return match chosen {
            Some(cmd) => KeyResult::Event(cmd),
            None => KeyResult::Handled,
          };
        }
        InputResult::Cancelled => self.close(),
        InputResult::Consumed => self.selected_suggestion = 0,
        InputResult::NotHandled => {}
      },
    }
    KeyResult::Handled
  }

  /// Render the palette overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let shown = suggestions.len().min(MAX_SUGGESTIONS) as u16;

    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let height = (3 + shown).min(area.height);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(0)])
      .split(inner);

    let mut spans = vec![Span::styled(":", Style::default().fg(Color::Yellow))];
    spans.extend(cursor_spans(&self.input, Style::default().fg(Color::Yellow)));
    let input_line = Line::from(spans);
    frame.render_widget(Paragraph::new(input_line), chunks[0]);

    if suggestions.is_empty() || chunks[1].height == 0 {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(MAX_SUGGESTIONS)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<10}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected_suggestion));
    frame.render_stateful_widget(list, chunks[1], &mut state);
  }
}
