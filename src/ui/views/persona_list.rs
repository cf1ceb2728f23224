use crate::commands::Command;
use crate::controller::PersonaController;
use crate::error::{Field, PersonaError, ValidationError};
use crate::state::{Notification, SessionState, TableContent};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, EditorEvent, KeyResult, PersonaEditor, SearchEvent, SearchInput,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{sex_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

const HEADERS: [&str; 7] = [
  "ID",
  "First name",
  "Last name",
  "Sex",
  "Birth date",
  "Role id",
  "Role",
];

/// The persona table with its modal editor, search prompt and delete
/// confirmation
pub struct PersonaListView {
  controller: PersonaController,
  table_state: TableState,
  search: SearchInput,
  editor: PersonaEditor,
  confirm: ConfirmDialog,
}

impl PersonaListView {
  pub fn new(controller: PersonaController) -> Self {
    let mut table_state = TableState::default();
    table_state.select(Some(0));
    Self {
      controller,
      table_state,
      search: SearchInput::new(),
      editor: PersonaEditor::new(),
      confirm: ConfirmDialog::new(),
    }
  }

  fn open_new(&mut self) {
    let form = self.controller.open_new();
    self.editor.show_new(&form);
  }

  fn open_selected(&mut self) {
    let Some(row) = self.table_state.selected() else {
      return;
    };
    let Some(id) = self.controller.state().record_at_row(row).map(|p| p.id) else {
      return;
    };
    if let Some(form) = self.controller.open_edit(row) {
      self.editor.show_edit(id, &form);
    }
  }

  fn show_all(&mut self) {
    self.controller.show_all();
    self.table_state.select(Some(0));
  }

  fn refresh(&mut self) {
    self.controller.load();
  }

  fn handle_editor_event(&mut self, event: EditorEvent) {
    match event {
      EditorEvent::Submit(form) => {
        match self.controller.submit(&form) {
          Err(PersonaError::Validation(ValidationError::MissingField(field))) => {
            self.editor.focus_field(field)
          }
          Err(PersonaError::Validation(ValidationError::InvalidRoleId(_))) => {
            self.editor.focus_field(Field::RoleId)
          }
          _ => {}
        }
      }
      EditorEvent::Cancel => self.controller.cancel(),
      EditorEvent::Delete => {
        if let Some(id) = self.controller.begin_delete() {
          self
            .confirm
            .show(id, format!("Delete persona #{}? This cannot be undone.", id));
        }
      }
    }
  }

  fn handle_search_event(&mut self, event: SearchEvent) {
    match event {
      SearchEvent::Submitted(text) => {
        // Errors are already on the footer
        if self.controller.search(&text).is_ok() {
          self.table_state.select(Some(0));
        }
      }
      SearchEvent::Cancelled => {}
    }
  }

  fn table_title(&self) -> String {
    let state = self.controller.state();
    let filter = state
      .active_search()
      .map(|text| format!(" [id={}]", text))
      .unwrap_or_default();

    if self.controller.busy_list() {
      return format!(" Personas{} (loading...) ", filter);
    }
    match state.content() {
      TableContent::LoadFailed => " Personas (error) ".to_string(),
      TableContent::NotFound(_) => format!(" Personas{} (0) ", filter),
      TableContent::Rows(rows) => format!(" Personas{} ({}) ", filter, rows.len()),
    }
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(self.table_title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let state = self.controller.state();
    let message = match state.content() {
      TableContent::LoadFailed => Some("Failed to load data."),
      TableContent::NotFound(_) => Some("ID not found."),
      TableContent::Rows(rows) if rows.is_empty() => {
        if self.controller.busy_list() {
          Some("Loading...")
        } else {
          Some("No records.")
        }
      }
      TableContent::Rows(_) => None,
    };

    if let Some(message) = message {
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let records = state.current_record_set();
    let len = records.len();

    let header = Row::new(
      HEADERS
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold())),
    );

    let rows: Vec<Row> = records
      .iter()
      .map(|p| {
        Row::new(vec![
          Cell::from(p.id.to_string()).style(Style::default().fg(Color::Cyan)),
          Cell::from(truncate(&p.first_name, 24)),
          Cell::from(truncate(&p.last_name, 24)),
          Cell::from(p.sex.clone()).style(Style::default().fg(sex_color(&p.sex))),
          Cell::from(p.birth_date.clone()),
          Cell::from(p.role_id.map(|id| id.to_string()).unwrap_or_default()),
          Cell::from(truncate(&p.role, 20)),
        ])
      })
      .collect();

    let widths = [
      Constraint::Length(6),
      Constraint::Fill(2),
      Constraint::Fill(2),
      Constraint::Length(4),
      Constraint::Length(12),
      Constraint::Length(8),
      Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
      .header(header)
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    ensure_valid_selection(&mut self.table_state, len);
    frame.render_stateful_widget(table, area, &mut self.table_state);
  }
}

impl View for PersonaListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Overlays first, topmost wins
    if let KeyResult::Event(event) = self.confirm.handle_key(key) {
      if let ConfirmEvent::Confirmed(id) = event {
        self.controller.delete(id);
      }
      return ViewAction::None;
    } else if self.confirm.is_active() {
      return ViewAction::None;
    }

    match self.editor.handle_key(key, self.controller.busy_modal()) {
      KeyResult::Event(event) => {
        self.handle_editor_event(event);
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(event) => {
        self.handle_search_event(event);
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.table_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.table_state.select_previous(),
      KeyCode::Char('g') | KeyCode::Home => self.table_state.select_first(),
      KeyCode::Char('G') | KeyCode::End => self.table_state.select_last(),
      KeyCode::Enter | KeyCode::Char('e') => self.open_selected(),
      KeyCode::Char('n') => self.open_new(),
      KeyCode::Char('a') => self.show_all(),
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('q') => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn handle_command(&mut self, command: &Command) -> ViewAction {
    match command.name {
      "new" => self.open_new(),
      "search" => self.search.activate(),
      "all" => self.show_all(),
      "refresh" => self.refresh(),
      "quit" => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_table(frame, area);
    self.search.render_overlay(frame, area);
    self
      .editor
      .render_overlay(frame, area, self.controller.busy_modal());
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    let state = self.controller.state();
    let base = match state.active_search() {
      Some(text) => format!("Personas [id={}]", text),
      None => "Personas".to_string(),
    };
    match state.session().state() {
      SessionState::Closed => base,
      SessionState::Creating => format!("{} > New", base),
      SessionState::Editing(record) => format!("{} > Edit #{}", base, record.id),
    }
  }

  fn tick(&mut self) {
    self.controller.tick();
    // A successful save closes the session; follow it
    if self.editor.is_active() && !self.controller.state().session().is_open() {
      self.editor.hide();
    }
  }

  fn captures_keys(&self) -> bool {
    self.confirm.is_active() || self.editor.is_active() || self.search.is_active()
  }

  fn status(&self) -> Option<&Notification> {
    self.controller.state().notification()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.editor.is_active() {
      return vec![
        ShortcutInfo::new("enter", "save").with_priority(10),
        ShortcutInfo::new("tab", "next field").with_priority(20),
        ShortcutInfo::new("esc", "cancel").with_priority(30),
      ];
    }
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("n", "new").with_priority(20),
      ShortcutInfo::new("e", "edit").with_priority(30),
      ShortcutInfo::new("/", "search").with_priority(40),
      ShortcutInfo::new("a", "all").with_priority(50),
      ShortcutInfo::new("r", "refresh").with_priority(60),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::controller::tests::FakeApi;
  use crossterm::event::KeyModifiers;
  use pretty_assertions::assert_eq;
  use std::sync::Arc;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn loaded_view(ids: &[i64]) -> (PersonaListView, Arc<FakeApi>) {
    let api = FakeApi::with(ids);
    let mut controller = PersonaController::new(api.clone());
    controller.load();
    let mut view = PersonaListView::new(controller);
    settle(&mut view).await;
    (view, api)
  }

  async fn settle(view: &mut PersonaListView) {
    for _ in 0..200 {
      tokio::time::sleep(Duration::from_millis(5)).await;
      view.tick();
      if !view.controller.busy_list() && !view.controller.busy_modal() {
        return;
      }
    }
    panic!("requests did not settle");
  }

  fn displayed_ids(view: &PersonaListView) -> Vec<i64> {
    view
      .controller
      .state()
      .current_record_set()
      .iter()
      .map(|p| p.id)
      .collect()
  }

  #[tokio::test]
  async fn test_edit_and_save_closes_editor() {
    let (mut view, _api) = loaded_view(&[1, 2]).await;

    view.handle_key(key(KeyCode::Char('j')));
    view.handle_key(key(KeyCode::Char('e')));
    assert!(view.editor.is_active());
    assert!(view.captures_keys());

    assert_eq!(view.breadcrumb_label(), "Personas > Edit #2");

    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;

    assert!(!view.editor.is_active());
    assert_eq!(view.breadcrumb_label(), "Personas");
    assert_eq!(
      view.status().map(|n| n.message.as_str()),
      Some("Saved. ID: 2")
    );
  }

  #[tokio::test]
  async fn test_invalid_form_keeps_editor_open() {
    let (mut view, _api) = loaded_view(&[1]).await;

    view.handle_key(key(KeyCode::Char('n')));
    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;

    assert!(view.editor.is_active());
    assert_eq!(
      view.status().map(|n| n.message.as_str()),
      Some("Please fill in all fields (missing first name).")
    );
  }

  #[tokio::test]
  async fn test_delete_requires_confirmation() {
    let (mut view, _api) = loaded_view(&[1, 2]).await;

    view.handle_key(key(KeyCode::Enter));
    view.handle_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
    assert!(view.confirm.is_active());
    assert!(!view.editor.is_active());

    view.handle_key(key(KeyCode::Char('n')));
    settle(&mut view).await;
    assert_eq!(displayed_ids(&view), vec![1, 2]);

    view.handle_key(key(KeyCode::Enter));
    view.handle_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
    view.handle_key(key(KeyCode::Char('y')));
    settle(&mut view).await;
    assert_eq!(displayed_ids(&view), vec![2]);
  }

  #[tokio::test]
  async fn test_search_and_show_all() {
    let (mut view, _api) = loaded_view(&[1, 2, 3]).await;

    view.handle_key(key(KeyCode::Char('/')));
    view.handle_key(key(KeyCode::Char('3')));
    view.handle_key(key(KeyCode::Enter));
    assert_eq!(displayed_ids(&view), vec![3]);
    assert_eq!(view.breadcrumb_label(), "Personas [id=3]");

    view.handle_key(key(KeyCode::Char('a')));
    assert_eq!(displayed_ids(&view), vec![1, 2, 3]);
    assert_eq!(view.breadcrumb_label(), "Personas");
  }

  #[tokio::test]
  async fn test_palette_commands() {
    let (mut view, _api) = loaded_view(&[1]).await;
    let quit = crate::commands::resolve("quit").map(|c| view.handle_command(c));
    assert_eq!(quit, Some(ViewAction::Quit));

    if let Some(cmd) = crate::commands::resolve("new") {
      view.handle_command(cmd);
    }
    assert!(view.editor.is_active());
  }
}
