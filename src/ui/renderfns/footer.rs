use crate::state::{Level, Notification};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar: breadcrumb on the left, last notification after it
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  notification: Option<&Notification>,
  breadcrumb: &str,
) {
  let mut spans = vec![
    Span::raw(" "),
    Span::styled(breadcrumb.to_string(), Style::default().fg(Color::Cyan).bold()),
  ];

  if let Some(notification) = notification {
    spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      notification.at.format("%H:%M:%S ").to_string(),
      Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(
      notification.message.clone(),
      Style::default().fg(level_color(notification.level)),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn level_color(level: Level) -> Color {
  match level {
    Level::Info => Color::Green,
    Level::Error => Color::Red,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_level_color() {
    assert_eq!(level_color(Level::Info), Color::Green);
    assert_eq!(level_color(Level::Error), Color::Red);
  }
}
