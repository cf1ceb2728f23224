mod app;
mod commands;
mod config;
mod controller;
mod error;
mod event;
mod logging;
mod persona;
mod query;
mod state;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "p9s")]
#[command(about = "A terminal UI for managing persona records over a REST API")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./p9s.yaml, then $XDG_CONFIG_HOME/p9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Persona endpoint URL, overrides the config file
  #[arg(short, long, env = "P9S_ENDPOINT")]
  endpoint: Option<Url>,

  /// Directory for p9s.log (default: $XDG_DATA_HOME/p9s)
  #[arg(long)]
  log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override endpoint if specified on command line or environment
  let config = if let Some(endpoint) = args.endpoint {
    config::Config { endpoint, ..config }
  } else {
    config
  };

  let _log_guard = logging::init(&config.log, args.log_dir.as_deref())?;

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
