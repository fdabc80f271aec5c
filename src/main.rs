//! arlq - Entry Point
//!
//! Initializes logging and the terminal, builds the stage, and runs the
//! input loop.
//!
//! The stage is configured from `arlq.ron` in the working directory when
//! present. Setting `ARLQ_SEED_CODE` to a seed code replays that dungeon;
//! `ARLQ_DATA_DIR` points at a directory holding `stages.ron`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use arlq::data::DataManager;
use arlq::game::StageConfig;
use arlq::ui::App;

const CONFIG_FILE: &str = "arlq.ron";
const SEED_CODE_VAR: &str = "ARLQ_SEED_CODE";
const DATA_DIR_VAR: &str = "ARLQ_DATA_DIR";

/// How long to wait for a key before polling again
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    // Initialize logging to file (to avoid interfering with TUI)
    if let Ok(log_file) = OpenOptions::new().create(true).write(true).truncate(true).open("arlq.log") {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .init();
    }

    log::info!("Starting arlq v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let data_dir = std::env::var_os(DATA_DIR_VAR).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let data = DataManager::load_from(&data_dir)?;

    // Build the stage before touching the terminal so errors print normally
    let mut app = App::new(config, data.stages)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("arlq exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("arlq shut down cleanly");
    result
}

/// Seed code first, then the config file, then defaults
fn load_config() -> Result<StageConfig> {
    if let Ok(code) = std::env::var(SEED_CODE_VAR) {
        let config = StageConfig::from_seed_code(&code).with_context(|| format!("bad {SEED_CODE_VAR}"))?;
        log::info!("Replaying seed code {}", code);
        return Ok(config);
    }

    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return Ok(StageConfig::default());
    }
    let source = fs::read_to_string(path).with_context(|| format!("failed to read {CONFIG_FILE}"))?;
    let config = StageConfig::from_ron_str(&source).with_context(|| format!("failed to parse {CONFIG_FILE}"))?;
    log::info!("Loaded configuration from {}", CONFIG_FILE);
    Ok(config)
}

/// Main input loop; the stage only changes on key presses
fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            // Only handle key press events, not releases
            if key.kind == KeyEventKind::Press && app.handle_input(key)? {
                break;
            }
        }
    }
    Ok(())
}
