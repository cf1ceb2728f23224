use crate::config::Config;
use crate::controller::PersonaController;
use crate::event::{Event, EventHandler};
use crate::persona::PersonaClient;
use crate::ui;
use crate::ui::components::{CommandInput, KeyResult};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::PersonaListView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::sync::Arc;
use tracing::{debug, info};

/// Main application state
pub struct App {
  /// The persona table and its overlays
  view: Box<dyn View>,

  /// Command palette (after pressing :)
  command: CommandInput,

  /// Application configuration
  config: Config,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = PersonaClient::new(config.endpoint.clone())?;
    let mut controller = PersonaController::new(Arc::new(client));
    controller.load();

    Ok(Self {
      view: Box::new(PersonaListView::new(controller)),
      command: CommandInput::new(),
      config,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    info!(endpoint = %self.config.endpoint, "p9s started");

    let result = self.main_loop(&mut terminal).await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
  }

  async fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(self.config.tick_rate());
    let title = self.config.display_title();

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, &title, self.view.as_mut(), &self.command))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    info!("p9s exiting");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {}
    }
    // Results land on every event, not only on ticks, so typing never
    // delays them
    self.view.tick();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // The palette never opens over a modal
    if !self.view.captures_keys() {
      match self.command.handle_key(key) {
        KeyResult::Event(command) => {
          debug!(command = command.name, "running command");
          let action = self.view.handle_command(command);
          self.apply(action);
          return;
        }
        KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = self.view.handle_key(key);
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Quit => self.should_quit = true,
    }
  }
}
