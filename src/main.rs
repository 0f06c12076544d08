//! Indexa+ - convert Uruguayan indexed and adjustable units to pesos
//!
//! A terminal UI application that fetches the current Unidad Indexada and
//! Unidad Reajustable quotations and converts unit amounts to pesos. With
//! `--amount` it converts once and prints the result instead.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};

use indexa::app::{App, AppState, CALCULATION_DELAY};
use indexa::cache::{FileStore, RateCache};
use indexa::cli::{Cli, StartupConfig};
use indexa::convert::{convert, format_pesos};
use indexa::data::RateClient;
use indexa::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Logs to stderr; used by the one-shot mode
fn init_stderr_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}

/// Logs to `indexa.log` in `dir` so output does not corrupt the TUI.
///
/// Logging stays disabled if the file cannot be opened.
fn init_file_logger(dir: &Path) {
    let file = fs::create_dir_all(dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("indexa.log"))
    });

    if let Ok(file) = file {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match &app.state {
        AppState::Loading => render_loading(frame),
        AppState::Ready | AppState::Error(_) => ui::render_converter(frame, app),
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while quotations are being fetched
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading quotations...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Converts `amount` once and prints the formatted result
async fn run_once(client: &RateClient, config: &StartupConfig, amount: &str) {
    let quotation = match client.fetch_quotation(config.unit, config.date).await {
        Ok(quotation) => quotation,
        Err(e) => {
            eprintln!("error: could not get {} quotation: {}", config.unit, e);
            process::exit(1);
        }
    };

    let Some(rate) = quotation.rate() else {
        eprintln!("error: {} quotation has no value", config.unit);
        process::exit(1);
    };

    println!("{}", format_pesos(convert(amount, Some(rate))));
}

/// Runs the interactive converter until the user quits
async fn run_tui(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initial render to show loading state
    terminal.draw(|f| render_ui(f, &app))?;

    app.load_quotations().await;

    // Main event loop
    loop {
        terminal.draw(|f| render_ui(f, &app))?;

        // The indicator frame is already drawn; hold it briefly before the result
        if app.calculating {
            tokio::time::sleep(CALCULATION_DELAY).await;
            app.finish_calculation();
            continue;
        }

        if app.history_requested {
            app.load_history().await;
            continue;
        }

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    let file_store = FileStore::new();
    let cache = match (&file_store, config.use_cache) {
        (Some(store), true) => RateCache::new(Arc::new(store.clone())),
        _ => RateCache::disabled(),
    };
    let client = RateClient::new(cache).with_base_url(config.base_url.clone());

    if let Some(amount) = config.one_shot_amount() {
        init_stderr_logger();
        run_once(&client, &config, amount).await;
        return Ok(());
    }

    if let Some(store) = &file_store {
        init_file_logger(store.dir());
    }
    info!("starting converter against {}", client.base_url());

    let result = run_tui(App::new(client, &config)).await;
    if let Err(e) = &result {
        error!("terminal error: {}", e);
    }
    result
}
