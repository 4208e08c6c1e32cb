//! Detail overlay rendering.
//!
//! Displays a modal overlay with every field reported for the selected
//! interface, its configuration and recent latency/traffic history.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::format::{
    format_bytes, format_duration, format_latency, format_rate, format_timestamp, parse_epoch,
};
use crate::data::StatusBadge;
use crate::source::InterfaceStatus;
use crate::ui::interfaces::render_sparkline;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the interface detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(iface) = app.selected_interface() else {
        return;
    };
    let now = App::now();

    let overlay_width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 40);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // Header with badge and trends
        Constraint::Min(8),    // Field table
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let badge = StatusBadge::classify(iface);
    let sparkline = render_sparkline(&app.history.latency_sparkline(&iface.name));
    let rate = app
        .history
        .traffic_rate(&iface.name)
        .map(|(rx, tx)| format!("{} / {}", format_rate(rx), format_rate(tx)))
        .unwrap_or_else(|| "-".to_string());

    let header_lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", iface.name), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(badge.to_string(), app.theme.status_style(badge.health())),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Latency trend: "),
            Span::styled(
                if sparkline.is_empty() { "-".to_string() } else { sparkline },
                Style::default().fg(app.theme.highlight),
            ),
            Span::raw("    Rate (RX/TX): "),
            Span::styled(rate, Style::default().add_modifier(Modifier::BOLD)),
        ]),
    ];

    let header_block = Block::default()
        .title(" Interface Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // ===== FIELDS =====
    let mut fields = status_fields(iface, now);
    if let Some(config) = app.config.as_ref().and_then(|c| c.interface_for_device(&iface.name)) {
        fields.push(("config section", config.section.clone()));
        fields.push(("metric", config.metric.to_string()));
        fields.push(("weight", config.weight.to_string()));
        fields.push(("ping count", config.ping_count.to_string()));
        fields.push(("ping timeout", format!("{}s", config.ping_timeout)));
    }

    let mut rows: Vec<Row> = fields
        .into_iter()
        .map(|(name, value)| {
            Row::new(vec![
                Cell::from(name).style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(value),
            ])
        })
        .collect();
    rows.extend(iface.extra.iter().map(|(key, value)| {
        Row::new(vec![
            Cell::from(key.clone()).style(Style::default().add_modifier(Modifier::ITALIC)),
            Cell::from(value.clone()),
        ])
    }));

    let header = Row::new(vec![Cell::from("Field"), Cell::from("Value")])
        .height(1)
        .style(app.theme.header);

    let table = Table::new(rows, [Constraint::Length(18), Constraint::Fill(1)])
        .header(header)
        .block(
            Block::default()
                .title(" Reported Fields ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );
    frame.render_widget(table, chunks[1]);

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑↓:switch interface  Esc:close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

/// Field name/value pairs for the known status fields.
fn status_fields(iface: &InterfaceStatus, now: i64) -> Vec<(&'static str, String)> {
    let or_dash = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };
    let status_since = parse_epoch(&iface.status_since);
    let last_check = parse_epoch(&iface.last_check);

    vec![
        ("device exists", yes_no(iface.does_exist)),
        ("link up", yes_no(iface.is_up)),
        ("degraded", yes_no(iface.is_degraded())),
        ("degraded reason", or_dash(&iface.degraded_reason)),
        ("status since", when(now, status_since)),
        ("last check", when(now, last_check)),
        ("latency", format_latency(iface.latency)),
        ("gateway", or_dash(&iface.gateway)),
        ("ping target", or_dash(&iface.ping_target)),
        ("rx bytes", format!("{} ({})", format_bytes(iface.rx_bytes), iface.rx_bytes)),
        ("tx bytes", format!("{} ({})", format_bytes(iface.tx_bytes), iface.tx_bytes)),
    ]
}

/// Absolute time with the elapsed duration, or `"Never"`.
fn when(now: i64, epoch: i64) -> String {
    if epoch == 0 {
        return format_timestamp(epoch);
    }
    format!("{} ({} ago)", format_timestamp(epoch), format_duration(now, epoch))
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}
