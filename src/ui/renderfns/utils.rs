use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` characters, adding "..." if
/// truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for the sex column
pub fn sex_color(sex: &str) -> Color {
  match sex.trim() {
    "F" | "f" => Color::Magenta,
    "M" | "m" => Color::Blue,
    _ => Color::White,
  }
}
