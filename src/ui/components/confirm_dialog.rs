use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent {
  Confirmed(i64),
  Cancelled,
}

/// Yes/no prompt guarding a destructive action on one record
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
  pending: Option<(i64, String)>,
}

impl ConfirmDialog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.pending.is_some()
  }

  pub fn show(&mut self, id: i64, message: impl Into<String>) {
    self.pending = Some((id, message.into()));
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    let Some((id, _)) = self.pending else {
      return KeyResult::NotHandled;
    };

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
        self.pending = None;
        KeyResult::Event(ConfirmEvent::Confirmed(id))
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') | KeyCode::Esc => {
        self.pending = None;
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some((_, message)) = &self.pending else {
      return;
    };

    let width = 48.min(area.width.saturating_sub(2));
    let height = 6.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm ");

    let key = Style::default().fg(Color::Cyan);
    let desc = Style::default().fg(Color::DarkGray);
    let lines = vec![
      Line::raw(message.as_str()),
      Line::raw(""),
      Line::from(vec![
        Span::styled("<y>", key),
        Span::styled(" yes  ", desc),
        Span::styled("<n>", key),
        Span::styled(" no", desc),
      ]),
    ];

    frame.render_widget(
      Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
      overlay_area,
    );
  }
}
