//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::HealthStatus;

/// Render the header bar with the service overview.
///
/// Displays: overall indicator, mode, interface counts by status, staleness.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled("MINI-MWAN ", Style::default().add_modifier(Modifier::BOLD));

    let Some(view) = app.status_view(App::now()) else {
        let line = if app.last_updated.is_some() {
            Line::from(vec![
                Span::styled(" ● ", app.theme.status_style(HealthStatus::Critical)),
                title,
                Span::raw("│ Service not running"),
            ])
        } else {
            Line::from(vec![Span::raw(" "), title, Span::raw("│ Loading...")])
        };
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (up, warning, critical) = view.health_counts();
    let overall = if critical > 0 {
        HealthStatus::Critical
    } else if warning > 0 || view.global.stale {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    };

    let count_span = |n: usize, color| {
        if n > 0 {
            Span::styled(n.to_string(), Style::default().fg(color))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.status_style(overall)),
        title,
        Span::raw("│ "),
        Span::raw(view.global.mode.clone()),
        Span::raw(" │ "),
        count_span(up, app.theme.healthy),
        Span::raw(" up "),
        count_span(warning, app.theme.warning),
        Span::raw(" warn "),
        count_span(critical, app.theme.critical),
        Span::raw(" down │ "),
        Span::styled(
            view.rows.len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" interfaces"),
    ];

    if view.global.stale {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "STALE",
            Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let issues = app.config_issues.len();
    let config_title = if issues > 0 {
        format!(" 2:Config ({}) ", issues)
    } else {
        " 2:Config ".to_string()
    };
    let titles: Vec<Line> = vec![Line::from(" 1:Interfaces "), Line::from(config_title)];

    let selected = match app.current_view {
        View::Interfaces => 0,
        View::Config => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, time since last update, available controls. Also displays
/// temporary status messages and read errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, refresh_secs: u64) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        match app.current_view {
            View::Interfaces => "/:search Enter:detail Tab:switch r:reload ?:help q:quit",
            View::Config => "↑↓:select Tab:switch r:reload ?:help q:quit",
        }
    };

    let status = if let Some(ref err) = app.load_error {
        format!(" {} | Error: {} | {}", app.source_description(), err, controls)
    } else if let Some(updated) = app.last_updated {
        format!(
            " {} | Updated {:.1}s ago, refresh every {}s | {}",
            app.source_description(),
            updated.elapsed().as_secs_f64(),
            refresh_secs,
            controls,
        )
    } else {
        format!(" {} | Loading... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2         Interfaces / Config"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Interface detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Interfaces"),
        Line::from("  /         Filter by device"),
        Line::from("  c         Clear filter"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload status and config"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 23u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
