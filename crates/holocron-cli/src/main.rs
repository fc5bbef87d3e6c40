//! `holo` — terminal browser for the Star Wars character catalog.
//!
//! # Usage
//!
//! ```
//! holo --mode global
//! holo --url https://swapi.dev/api --mode page-local --log-file holo.log
//! holo --config ~/.config/holo/config.toml
//! ```

mod app;
mod ui;

use std::{fs::File, io, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use holocron_client::{DEFAULT_BASE_URL, HttpSource, SourceConfig};
use holocron_core::query::QueryMode;
use holocron_engine::Catalog;
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ─── CLI args ─────────────────────────────────────────────────────────────────

/// Where search and filters apply.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
  /// Fetch every character up front; search and filters cover all of them.
  Global,
  /// Fetch one upstream page at a time; search and filters cover that page.
  PageLocal,
}

impl From<ModeArg> for QueryMode {
  fn from(mode: ModeArg) -> Self {
    match mode {
      ModeArg::Global => QueryMode::Global,
      ModeArg::PageLocal => QueryMode::PageLocal,
    }
  }
}

#[derive(Parser, Debug)]
#[command(name = "holo", about = "Browse Star Wars characters from SWAPI")]
struct Args {
  /// Path to a TOML config file (url, mode, timeout_secs).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the API (default: https://swapi.dev/api).
  #[arg(long, env = "HOLO_URL")]
  url: Option<String>,

  /// Query mode.
  #[arg(long, value_enum, env = "HOLO_MODE")]
  mode: Option<ModeArg>,

  /// Per-request timeout in seconds.
  #[arg(long, env = "HOLO_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,

  /// Write logs to this file. Logging is off without it.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  #[serde(default)]
  mode:         Option<QueryMode>,
  #[serde(default)]
  timeout_secs: Option<u64>,
}

/// Settings after flags, config file and defaults are merged.
#[derive(Debug, PartialEq)]
struct Settings {
  url:     String,
  mode:    QueryMode,
  timeout: Duration,
}

impl Settings {
  /// CLI flags override the config file, which overrides defaults.
  fn resolve(args: &Args, file: ConfigFile) -> Self {
    Self {
      url:     args
        .url
        .clone()
        .or_else(|| (!file.url.is_empty()).then_some(file.url))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
      mode:    args
        .mode
        .map(QueryMode::from)
        .or(file.mode)
        .unwrap_or_default(),
      timeout: Duration::from_secs(
        args
          .timeout_secs
          .or(file.timeout_secs)
          .unwrap_or(DEFAULT_TIMEOUT_SECS),
      ),
    }
  }
}

fn read_config(path: Option<&PathBuf>) -> Result<ConfigFile> {
  let Some(path) = path else {
    return Ok(ConfigFile::default());
  };
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

/// Install a file-backed subscriber. The terminal belongs to the UI, so
/// without a log file nothing is installed.
fn init_logging(path: Option<&PathBuf>) -> Result<()> {
  let Some(path) = path else {
    return Ok(());
  };
  let file = File::create(path)
    .with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  init_logging(args.log_file.as_ref())?;

  let file_cfg = read_config(args.config.as_ref())?;
  let settings = Settings::resolve(&args, file_cfg);
  tracing::info!(url = %settings.url, mode = %settings.mode, "starting");

  let source = HttpSource::new(SourceConfig {
    base_url: settings.url,
    timeout:  settings.timeout,
  })
  .context("building HTTP client")?;
  let mut catalog = Catalog::new(source.into(), settings.mode);
  catalog.start();
  let mut app = App::new(catalog);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app);

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    // Fold in whatever the background loads have reported since last frame.
    app.sync();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, letting the runtime's other workers drive the loads.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key) {
        break;
      }
    }
  }

  Ok(())
}
