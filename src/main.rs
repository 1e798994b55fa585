mod api;
mod app;
mod config;
mod fetch;
mod filter;
mod format;
mod prefs;
mod store;
mod theme;
mod types;
mod ui;

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use api::CoinGeckoClient;
use app::App;
use config::Config;
use fetch::{FetchEvent, Fetcher};
use store::Store;
use types::*;

/// Top-20 cryptocurrency dashboard backed by CoinGecko.
#[derive(Debug, Parser)]
#[command(name = "viewcoin", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the preference store and log file
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    let db_path = Store::default_path(cli.data_dir.as_deref());
    init_logging(&db_path.with_file_name("viewcoin.log"), config.tracing_level());
    tracing::info!(config = %config_path.display(), store = %db_path.display(), "Starting viewcoin");

    let store = open_store(&db_path)?;

    let client = CoinGeckoClient::new(&config.coingecko_api_key, config.request_timeout())?;
    let (tx, rx) = mpsc::unbounded_channel();
    let fetcher = Fetcher::new(Arc::new(client), tx);

    let mut app = App::new(store, fetcher);
    app.load_markets();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Fatal");
        eprintln!("Error: {}", e);
    }
    tracing::info!("Exiting");

    Ok(())
}

/// Installs the file subscriber. An unusable log file disables logging
/// instead of aborting startup.
fn init_logging(path: &Path, level: tracing::Level) {
    let (writer, failure) = match open_log_file(path) {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), None),
        Err(e) => (BoxMakeWriter::new(io::sink), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(level)
        .init();

    if let Some(e) = failure {
        tracing::warn!(error = %e, "Log file unavailable, logging disabled");
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

fn open_store(path: &Path) -> Result<Store> {
    match Store::open(path) {
        Ok(store) => Ok(store),
        Err(e) => {
            tracing::warn!(error = %e, "Preference store unavailable, using in-memory store");
            Store::open_in_memory()
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut rx: UnboundedReceiver<FetchEvent>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        terminal.draw(|f| ui::draw(f, &mut *app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }

        if app.quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Search => match key.code {
            KeyCode::Esc => {
                app.set_query("");
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => app.pop_query_char(),
            KeyCode::Char(c) => app.push_query_char(c),
            _ => {}
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
            KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
            KeyCode::PageDown => app.move_selection(app.page_height as isize),
            KeyCode::PageUp => app.move_selection(-(app.page_height as isize)),
            KeyCode::Char('g') | KeyCode::Home => app.select_first(),
            KeyCode::Char('G') | KeyCode::End => app.select_last(),
            KeyCode::Char('/') => app.input_mode = InputMode::Search,
            KeyCode::Char('f') => app.toggle_favorite_selected(),
            KeyCode::Char('F') => app.toggle_favorites_only(),
            KeyCode::Char('r') => app.refresh(),
            KeyCode::Char('c') => app.toggle_chart(),
            KeyCode::Char('h') | KeyCode::Left => app.cycle_chart_range(false),
            KeyCode::Char('l') | KeyCode::Right => app.cycle_chart_range(true),
            KeyCode::Char(d @ '1'..='4') => {
                let idx = d as usize - '1' as usize;
                app.set_chart_range(ChartRange::ALL[idx]);
            }
            KeyCode::Char('t') => app.toggle_theme(),
            KeyCode::Char('b') => app.cycle_background(),
            _ => {}
        },
    }
}
