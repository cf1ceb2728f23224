use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with app name, endpoint label, and the view's shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, shortcuts: &[ShortcutInfo]) {
  let mut spans = vec![
    Span::styled(" p9s ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Yellow).bold()),
    Span::raw(" "),
  ];

  // Keys highlighted, descriptions dimmed
  for shortcut in sorted(shortcuts) {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn sorted(shortcuts: &[ShortcutInfo]) -> Vec<&ShortcutInfo> {
  let mut sorted: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);
  sorted
}
