use super::input::{cursor_spans, TextInput};
use super::KeyResult;
use crate::error::Field;
use crate::persona::Sex;
use crate::state::PersonaForm;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the editor that the parent view needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
  /// Enter pressed; the editor stays open until the save settles
  Submit(PersonaForm),
  /// Esc pressed (editor closed)
  Cancel,
  /// Ctrl-D pressed in edit mode (editor closed)
  Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
  #[default]
  Create,
  Edit(i64),
}

/// Field order, top to bottom
const FIELDS: [Field; 5] = [
  Field::FirstName,
  Field::LastName,
  Field::Sex,
  Field::BirthDate,
  Field::RoleId,
];

/// Modal form for adding or editing a persona
#[derive(Debug, Clone, Default)]
pub struct PersonaEditor {
  active: bool,
  mode: Mode,
  first_name: TextInput,
  last_name: TextInput,
  sex: Option<Sex>,
  birth_date: TextInput,
  role_id: TextInput,
  focus: usize,
}

impl PersonaEditor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn show_new(&mut self, form: &PersonaForm) {
    self.show(Mode::Create, form);
  }

  pub fn show_edit(&mut self, id: i64, form: &PersonaForm) {
    self.show(Mode::Edit(id), form);
  }

  fn show(&mut self, mode: Mode, form: &PersonaForm) {
    self.active = true;
    self.mode = mode;
    self.first_name.set_value(&form.first_name);
    self.last_name.set_value(&form.last_name);
    self.sex = form.sex;
    self.birth_date.set_value(&form.birth_date);
    self.role_id.set_value(&form.role_id);
    self.focus = 0;
  }

  pub fn hide(&mut self) {
    self.active = false;
  }

  /// Move focus to a field, e.g. the one that failed validation
  pub fn focus_field(&mut self, field: Field) {
    if let Some(i) = FIELDS.iter().position(|f| *f == field) {
      self.focus = i;
    }
  }

  /// Current form values
  pub fn values(&self) -> PersonaForm {
    PersonaForm {
      first_name: self.first_name.value().to_string(),
      last_name: self.last_name.value().to_string(),
      sex: self.sex,
      birth_date: self.birth_date.value().to_string(),
      role_id: self.role_id.value().to_string(),
    }
  }

  fn focused(&self) -> Field {
    FIELDS[self.focus]
  }

  fn text_input(&mut self, field: Field) -> Option<&mut TextInput> {
    match field {
      Field::FirstName => Some(&mut self.first_name),
      Field::LastName => Some(&mut self.last_name),
      Field::BirthDate => Some(&mut self.birth_date),
      Field::RoleId => Some(&mut self.role_id),
      Field::Sex => None,
    }
  }

  /// Handle a key event. While `saving`, Enter is ignored (the save button
  /// is disabled); everything else keeps working.
  pub fn handle_key(&mut self, key: KeyEvent, saving: bool) -> KeyResult<EditorEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.hide();
        return KeyResult::Event(EditorEvent::Cancel);
      }
      KeyCode::Enter => {
        if saving {
          return KeyResult::Handled;
        }
        return KeyResult::Event(EditorEvent::Submit(self.values()));
      }
      KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        if let Mode::Edit(_) = self.mode {
          self.hide();
          return KeyResult::Event(EditorEvent::Delete);
        }
        return KeyResult::Handled;
      }
      KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1) % FIELDS.len();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = (self.focus + FIELDS.len() - 1) % FIELDS.len();
        return KeyResult::Handled;
      }
      _ => {}
    }

    let field = self.focused();
    match self.text_input(field) {
      // Enter/Esc never reach the input; the form is modal so the result is dropped
      Some(input) => {
        input.handle_key(key);
      }
      None => match key.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => self.sex = Sex::cycle(self.sex),
        KeyCode::Char(c) => {
          if let Some(sex) = Sex::parse(&c.to_string()) {
            self.sex = Some(sex);
          }
        }
        KeyCode::Backspace | KeyCode::Delete => self.sex = None,
        _ => {}
      },
    }
    KeyResult::Handled
  }

  /// Render the editor overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, saving: bool) {
    if !self.active {
      return;
    }

    let width = 56.min(area.width.saturating_sub(2));
    let height = 11.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let title = match self.mode {
      Mode::Create => " Add persona ".to_string(),
      Mode::Edit(id) => format!(" Edit persona #{} ", id),
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(title);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = FIELDS
      .iter()
      .enumerate()
      .map(|(i, field)| self.field_line(*field, i == self.focus))
      .collect();
    lines.push(Line::raw(""));
    lines.push(self.hint_line(saving));

    frame.render_widget(Paragraph::new(lines), inner.inner(Margin::new(1, 1)));
  }

  fn field_line(&self, field: Field, focused: bool) -> Line<'_> {
    let label_style = if focused {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![Span::styled(format!("{:<12}", field.label()), label_style)];

    let input = match field {
      Field::FirstName => &self.first_name,
      Field::LastName => &self.last_name,
      Field::BirthDate => &self.birth_date,
      Field::RoleId => &self.role_id,
      Field::Sex => {
        for sex in [Sex::Female, Sex::Male] {
          let style = if self.sex == Some(sex) {
            Style::default().fg(Color::Black).bg(Color::Cyan)
          } else {
            Style::default().fg(Color::Cyan)
          };
          spans.push(Span::styled(format!(" {} ", sex.form_value()), style));
          spans.push(Span::raw(" "));
        }
        return Line::from(spans);
      }
    };

    if focused {
      spans.extend(cursor_spans(input, Style::default().fg(Color::Yellow)));
    } else {
      spans.push(Span::raw(input.value()));
    }
    Line::from(spans)
  }

  fn hint_line(&self, saving: bool) -> Line<'static> {
    if saving {
      return Line::styled("Saving...", Style::default().fg(Color::Yellow));
    }

    let key = Style::default().fg(Color::Cyan);
    let desc = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
      Span::styled("<enter>", key),
      Span::styled(" save  ", desc),
      Span::styled("<esc>", key),
      Span::styled(" cancel", desc),
    ];
    if let Mode::Edit(_) = self.mode {
      spans.push(Span::styled("  <ctrl-d>", key));
      spans.push(Span::styled(" delete", desc));
    }
    Line::from(spans)
  }
}
