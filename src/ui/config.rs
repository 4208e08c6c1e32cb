//! Config view rendering.
//!
//! Shows the configured WAN interfaces next to their live status and lists
//! every validation issue found in the service configuration.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{HealthStatus, StatusBadge};
use crate::uci::MwanConfig;

/// Render the Config view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref config) = app.config else {
        render_unavailable(frame, app, area);
        return;
    };

    let issues_height = (app.config_issues.len() as u16).clamp(1, 8) + 2;
    let chunks = Layout::vertical([
        Constraint::Length(3),             // Settings
        Constraint::Min(5),                // Interfaces
        Constraint::Length(issues_height), // Issues
    ])
    .split(area);

    render_settings(frame, app, config, chunks[0]);
    render_interfaces(frame, app, config, chunks[1]);
    render_issues(frame, app, chunks[2]);
}

fn render_settings(frame: &mut Frame, app: &App, config: &MwanConfig, area: Rect) {
    let settings = &config.settings;
    let (enabled, enabled_style) = if settings.enabled {
        ("enabled", app.theme.status_style(HealthStatus::Healthy))
    } else {
        ("disabled", Style::default().add_modifier(Modifier::DIM))
    };

    let line = Line::from(vec![
        Span::raw(" Service: "),
        Span::styled(enabled, enabled_style),
        Span::raw("    Mode: "),
        Span::styled(
            settings.mode.label().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("    Check Interval: {} seconds", settings.check_interval)),
    ]);

    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_interfaces(frame: &mut Frame, app: &App, config: &MwanConfig, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Section"),
        Cell::from("Device"),
        Cell::from("Enabled"),
        Cell::from("Metric"),
        Cell::from("Weight"),
        Cell::from("Ping Target"),
        Cell::from("Count"),
        Cell::from("Timeout"),
        Cell::from("Live Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = config
        .interfaces
        .iter()
        .map(|iface| {
            let live = app
                .snapshot
                .as_ref()
                .and_then(|s| s.interface(&iface.device))
                .map(StatusBadge::classify);
            let live_cell = match live {
                Some(badge) => {
                    let style = app.theme.status_style(badge.health());
                    Cell::from(badge.to_string()).style(style)
                }
                None => Cell::from("-").style(Style::default().add_modifier(Modifier::DIM)),
            };

            let row = Row::new(vec![
                Cell::from(iface.section.clone()),
                Cell::from(if iface.device.is_empty() { "-".to_string() } else { iface.device.clone() }),
                Cell::from(if iface.enabled { "yes" } else { "no" }),
                Cell::from(iface.metric.to_string()),
                Cell::from(iface.weight.to_string()),
                Cell::from(if iface.ping_target.is_empty() {
                    "-".to_string()
                } else {
                    iface.ping_target.clone()
                }),
                Cell::from(iface.ping_count.to_string()),
                Cell::from(format!("{}s", iface.ping_timeout)),
                live_cell,
            ]);
            if iface.enabled {
                row
            } else {
                row.style(Style::default().add_modifier(Modifier::DIM))
            }
        })
        .collect();

    let widths = [
        Constraint::Fill(2),    // Section
        Constraint::Fill(2),    // Device
        Constraint::Length(8),  // Enabled
        Constraint::Length(7),  // Metric
        Constraint::Length(7),  // Weight
        Constraint::Fill(2),    // Ping Target
        Constraint::Length(6),  // Count
        Constraint::Length(8),  // Timeout
        Constraint::Fill(3),    // Live Status
    ];

    let count = config.interfaces.len();
    let selected = app.selected_config_index.min(count.saturating_sub(1));
    let title = if count > 0 {
        format!(" Configured Interfaces ({}) [{}/{}] ", count, selected + 1, count)
    } else {
        " Configured Interfaces (0) ".to_string()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if count > 0 {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_issues(frame: &mut Frame, app: &App, area: Rect) {
    let (title, border, lines) = if app.config_issues.is_empty() {
        (
            " Validation ".to_string(),
            app.theme.border,
            vec![Line::from(Span::styled(
                " ● No issues found",
                app.theme.status_style(HealthStatus::Healthy),
            ))],
        )
    } else {
        let lines: Vec<Line> = app
            .config_issues
            .iter()
            .map(|issue| {
                Line::from(vec![
                    Span::styled(" ⚠ ", app.theme.status_style(HealthStatus::Warning)),
                    Span::raw(issue.to_string()),
                ])
            })
            .collect();
        (
            format!(" Validation ({} issues) ", app.config_issues.len()),
            app.theme.warning,
            lines,
        )
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_unavailable(frame: &mut Frame, app: &App, area: Rect) {
    let message = match app.config_error {
        Some(ref err) => Span::styled(
            format!("  Could not load configuration: {}", err),
            app.theme.status_style(HealthStatus::Critical),
        ),
        None => Span::styled(
            "  No configuration file given",
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    let block = Block::default()
        .title(" Configuration ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(
        Paragraph::new(vec![Line::from(""), Line::from(message)]).block(block),
        area,
    );
}
