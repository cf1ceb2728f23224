use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Endpoint used when no configuration file sets one
pub const DEFAULT_ENDPOINT: &str = "https://fi.jcaguilar.dev/v1/escuela/persona";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// Persona resource URL; all four verbs go to this one path
  #[serde(default = "default_endpoint")]
  pub endpoint: Url,
  /// Custom title for header (defaults to the endpoint host if not set)
  pub title: Option<String>,
  /// UI refresh interval, also how often request results are picked up
  #[serde(default = "default_tick_rate_ms")]
  pub tick_rate_ms: u64,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Filter directive, e.g. "p9s=debug" (P9S_LOG takes precedence)
  pub level: Option<String>,
  /// Directory for p9s.log (defaults to $XDG_DATA_HOME/p9s)
  pub dir: Option<PathBuf>,
}

fn default_endpoint() -> Url {
  Url::parse(DEFAULT_ENDPOINT).expect("DEFAULT_ENDPOINT is a valid URL")
}

fn default_tick_rate_ms() -> u64 {
  250
}

impl Default for Config {
  fn default() -> Self {
    Self {
      endpoint: default_endpoint(),
      title: None,
      tick_rate_ms: default_tick_rate_ms(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./p9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/p9s/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("p9s.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("p9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file is a valid (all defaults) config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    let config: Config = serde_yaml::from_str(contents)?;
    if config.tick_rate_ms == 0 {
      return Err(eyre!("tick_rate_ms must be greater than zero"));
    }
    Ok(config)
  }

  /// Header label: configured title, or the endpoint host.
  pub fn display_title(&self) -> String {
    self
      .title
      .clone()
      .or_else(|| self.endpoint.host_str().map(String::from))
      .unwrap_or_else(|| self.endpoint.to_string())
  }

  pub fn tick_rate(&self) -> Duration {
    Duration::from_millis(self.tick_rate_ms)
  }
}
