// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

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
use tracing::{debug, info};

mod app;
mod data;
mod events;
mod export;
mod logging;
mod report;
mod settings;
mod source;
mod uci;
mod ui;

use app::{App, View};
use logging::LogTarget;
use settings::ViewerSettings;
use source::{DataSource, FileSource, StatusSnapshot};
use uci::MwanConfig;

#[derive(Parser, Debug)]
#[command(name = "mwan-status")]
#[command(about = "Status viewer for the mini-mwan multi-WAN service")]
struct Args {
    /// Status file written by the mini-mwan daemon
    #[arg(short, long)]
    status_file: Option<PathBuf>,

    /// Viewer settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service configuration file (UCI)
    #[arg(short, long)]
    uci_config: Option<PathBuf>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Print the status once and exit
    #[arg(long, conflicts_with_all = ["export", "check_config"])]
    once: bool,

    /// Export current state to a JSON file and exit
    #[arg(short, long, conflicts_with_all = ["once", "check_config"])]
    export: Option<PathBuf>,

    /// Validate the service configuration and exit
    #[arg(long, conflicts_with_all = ["once", "export"])]
    check_config: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn is_interactive(&self) -> bool {
        !self.once && self.export.is_none() && !self.check_config
    }

    /// Command-line flags win over the settings file and environment.
    fn apply(&self, settings: &mut ViewerSettings) {
        if let Some(ref path) = self.status_file {
            settings.status_file = path.clone();
        }
        if let Some(ref path) = self.uci_config {
            settings.uci_config = path.clone();
        }
        if let Some(refresh) = self.refresh {
            settings.refresh_secs = refresh;
        }
        if let Some(ref path) = self.log_file {
            settings.log_file = Some(path.clone());
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut settings = ViewerSettings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let target = if args.is_interactive() {
        LogTarget::Tui
    } else {
        LogTarget::Stderr
    };
    logging::init(&settings, target)?;
    debug!(?settings, "settings loaded");

    if args.once {
        print_once(&settings.status_file)?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(ref export_path) = args.export {
        export_to_file(&settings, export_path)?;
        return Ok(ExitCode::SUCCESS);
    }

    if args.check_config {
        return check_config(&settings.uci_config);
    }

    let source = Box::new(FileSource::new(&settings.status_file));
    let refresh = Duration::from_secs(settings.refresh_secs.max(1));
    run_tui(source, Some(settings.uci_config.clone()), refresh)?;
    Ok(ExitCode::SUCCESS)
}

/// Print the status page as plain text.
fn print_once(status_file: &Path) -> Result<()> {
    print!("{}", report::status_text_from_file(status_file, App::now())?);
    Ok(())
}

/// Export status and configuration to JSON without starting the TUI.
fn export_to_file(settings: &ViewerSettings, export_path: &Path) -> Result<()> {
    let snapshot = StatusSnapshot::load(&settings.status_file)?;
    let config = match MwanConfig::load(&settings.uci_config) {
        Ok(config) => Some(config),
        Err(e) => {
            info!(error = %format!("{:#}", e), "exporting without service configuration");
            None
        }
    };

    export::write(export_path, snapshot.as_ref(), config.as_ref(), App::now())?;
    println!("Exported status to: {}", export_path.display());
    Ok(())
}

/// Validate the service configuration; non-zero exit when issues are found.
fn check_config(uci_path: &Path) -> Result<ExitCode> {
    let report = report::check_config(uci_path)?;
    print!("{}", report.text);
    Ok(if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    uci_path: Option<PathBuf>,
    refresh_interval: Duration,
) -> Result<()> {
    // Probe the background before raw mode takes over the terminal
    let theme = ui::Theme::auto_detect();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, uci_path);
    app.theme = theme;
    app.reload_data();
    info!(source = app.source_description(), "status viewer started");

    let result = run_app(&mut terminal, &mut app, refresh_interval);

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
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();
    let refresh_secs = refresh_interval.as_secs();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(app.theme.warning));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Interfaces => ui::interfaces::render(frame, app, chunks[2]),
                View::Config => ui::config::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3], refresh_secs);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, chunks[2]);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Wake up often enough to keep the "Updated Xs ago" counter moving
        let timeout = refresh_interval
            .saturating_sub(last_refresh.elapsed())
            .min(Duration::from_millis(250));

        if let Some(event) = events::poll_event(timeout)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Content starts after header (1) and tabs (1)
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 2),
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
