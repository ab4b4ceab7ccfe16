//! placedash - a terminal dashboard for users, posts, comments and albums.
//!
//! Browses the four collections of a JSONPlaceholder-style REST API with
//! search, user filtering, pagination and per-record detail views. Fetched
//! data is cached in memory for five minutes.

mod app;
mod dump;
mod ui;
mod utils;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use placedash_core::config::{APP_NAME, BASE_URL_ENV, TOKEN_ENV};
use placedash_core::{Config, Route};

use app::{build_service, App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name under the cache directory
const LOG_FILE: &str = "placedash.log";

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about = "Terminal dashboard for a JSONPlaceholder-style API")]
struct Args {
    /// Start location, e.g. `/dashboard/posts?search=rust&page=2`
    location: Option<String>,

    /// Base URL of the upstream API
    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Print the data for a location as JSON and exit
    #[arg(long, value_name = "LOCATION")]
    dump: Option<String>,

    /// Write logs here instead of the cache directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr; used when the terminal is not taken over by the UI
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a file so output does not corrupt the UI. The guard must live
/// until exit to flush buffered lines.
fn init_file_tracing(config: &Config, log_file: Option<PathBuf>) -> Result<WorkerGuard> {
    let path = match log_file {
        Some(path) => path,
        None => config.cache_dir()?.join(LOG_FILE),
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(LOG_FILE));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}; using defaults", e);
        Config::default()
    })
}

/// Settings for this run. The file values stay untouched so overrides are
/// never persisted.
fn effective_config(file: &Config, args: &Args) -> Config {
    // clap already folded the environment variables into the flags
    file.clone().with_overrides(args.base_url.clone(), args.token.clone())
}

/// What gets written back on exit: the file as loaded plus the last location
fn config_to_save(file: &Config, location: String) -> Config {
    Config {
        last_location: Some(location),
        ..file.clone()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let file_config = load_config();
    let config = effective_config(&file_config, &args);

    if let Some(ref location) = args.dump {
        init_stderr_tracing();
        let service = build_service(&config)?;
        let json = dump::dump_location(&service, location).await?;
        println!("{}", json);
        return Ok(());
    }

    let _guard = match init_file_tracing(&config, args.log_file.clone()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {:#}", e);
            None
        }
    };
    info!("placedash starting");

    let start = args
        .location
        .clone()
        .or_else(|| config.last_location.clone())
        .unwrap_or_default();
    let route = match Route::parse(&start) {
        Ok(route) => route,
        Err(e) => {
            warn!(error = %e, "Invalid start location, showing users");
            Route::default()
        }
    };

    // Create app before touching the terminal so config errors print normally
    let mut app = App::new(config)?;
    app.navigate(route);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let saved = config_to_save(&file_config, app.current_route().to_location());
    if let Err(e) = saved.save() {
        warn!(error = %e, "Failed to save config");
    }

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("placedash shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
