// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing_subscriber::EnvFilter;

mod app;
mod data;
mod events;
mod feed;
mod roster;
mod settings;
mod ui;

use app::{App, View};
use data::AlertThresholds;
use feed::FileFeed;

/// Default backend when neither the CLI nor the settings file names one.
const DEFAULT_SERVER: &str = "http://localhost:8000";

#[derive(Parser, Debug)]
#[command(name = "vitalwatch")]
#[command(about = "Terminal dashboard for live patient vital-sign monitoring")]
struct Args {
    /// Backend base URL for the roster endpoint and the per-patient stream
    #[arg(short, long, conflicts_with = "file")]
    server: Option<String>,

    /// Replay vitals from a JSON sample file instead of connecting
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Load the patient roster from a JSON file instead of the REST endpoint
    #[arg(long)]
    roster_file: Option<PathBuf>,

    /// Patient to monitor at startup (matches the roster's patient_id)
    #[arg(short, long)]
    patient: Option<String>,

    /// Settings file (JSON; the Settings view writes back to it)
    #[arg(short, long, default_value = "vitalwatch.json")]
    config: PathBuf,

    /// Heart rate lower alert bound (bpm)
    #[arg(long)]
    hr_min: Option<f64>,

    /// Heart rate upper alert bound (bpm)
    #[arg(long)]
    hr_max: Option<f64>,

    /// SpO2 lower alert bound (%)
    #[arg(long)]
    spo2_min: Option<f64>,

    /// Temperature upper alert bound (F)
    #[arg(long)]
    temp_max: Option<f64>,

    /// Disable fall detection
    #[arg(long)]
    no_fall_detection: bool,

    /// UI refresh/poll interval in milliseconds
    #[arg(short, long, default_value = "200")]
    refresh: u64,

    /// Append diagnostics to this file (the terminal itself is the dashboard)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_file.as_deref())?;

    let mut loaded = settings::load_settings(&args.config)?;
    apply_threshold_overrides(&mut loaded.alerts, &args);
    let refresh = Duration::from_millis(args.refresh.max(50));

    // File replay mode
    if let Some(ref path) = args.file {
        return run_with_file(path, loaded.alerts, args.config.clone(), refresh);
    }

    run_live(&args, loaded, refresh)
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

/// CLI threshold flags win over the settings file.
fn apply_threshold_overrides(thresholds: &mut AlertThresholds, args: &Args) {
    if let Some(v) = args.hr_min {
        thresholds.heart_rate_min = v;
    }
    if let Some(v) = args.hr_max {
        thresholds.heart_rate_max = v;
    }
    if let Some(v) = args.spo2_min {
        thresholds.spo2_min = v;
    }
    if let Some(v) = args.temp_max {
        thresholds.temperature_max = v;
    }
    if args.no_fall_detection {
        thresholds.fall_detection = false;
    }
}

/// Run with a file-based replay source
fn run_with_file(
    path: &Path,
    thresholds: AlertThresholds,
    settings_path: PathBuf,
    refresh: Duration,
) -> Result<()> {
    let source = Box::new(FileFeed::new(path));
    let mut app = App::new_with_source(source, thresholds, settings_path);
    run_tui(&mut app, refresh)
}

/// Run against the live backend: fetch the roster, then stream per patient
fn run_live(args: &Args, loaded: settings::Settings, refresh: Duration) -> Result<()> {
    let server = args
        .server
        .clone()
        .or(loaded.server)
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());

    // The runtime outlives the app: feeds spawn their tasks on it
    let rt = tokio::runtime::Runtime::new()?;

    let roster = match &args.roster_file {
        Some(path) => roster::load_roster_file(path),
        None => roster::RosterClient::new(&server)
            .and_then(|client| rt.block_on(client.fetch_patients())),
    };

    let (patients, roster_error) = match roster {
        Ok(patients) => (patients, None),
        Err(e) => (Vec::new(), Some(format!("{:#}", e))),
    };

    let mut app = App::new_live(
        rt.handle().clone(),
        server,
        patients,
        roster_error,
        loaded.alerts,
        args.config.clone(),
    );

    match &args.patient {
        Some(id) => {
            if !app.select_patient_by_id(id) {
                app.set_status_message(format!("Patient {} not in roster", id));
                app.select_first_patient();
            }
        }
        None => app.select_first_patient(),
    }

    run_tui(&mut app, refresh)
}

/// Run the TUI with the given app state
fn run_tui(app: &mut App, refresh: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let _ = app.reload_data();

    // Run the main loop
    let result = run_app(&mut terminal, app, refresh);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh: Duration,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 18;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(12),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            // Render header with patient identity and link state
            ui::common::render_header(frame, app, chunks[0]);

            // Render tabs
            ui::common::render_tabs(frame, app, chunks[1]);

            // Render current view
            match app.current_view {
                View::Dashboard => ui::dashboard::render(frame, app, chunks[2]),
                View::History => ui::history::render(frame, app, chunks[2]),
                View::Settings => ui::settings::render(frame, app, chunks[2]),
            }

            // Render status bar
            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render patient selector overlay if active
            if app.show_patient_selector {
                ui::patients::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(refresh)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Drain whatever the feed delivered since the last tick
        let _ = app.reload_data();
    }

    Ok(())
}
