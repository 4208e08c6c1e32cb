//! Interfaces view rendering.
//!
//! Displays the service information block and a table with one row per
//! monitored interface, in the order the daemon wrote them.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::view::{COLUMNS, NOT_RUNNING_HINT, NOT_RUNNING_NOTICE};
use crate::data::{GlobalInfo, InterfaceRow};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the Interfaces view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let now = App::now();
    let Some(snapshot) = app.running_snapshot() else {
        render_not_running(frame, app, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(5), // Service information
        Constraint::Min(5),    // Interface table
    ])
    .split(area);

    render_service_info(frame, app, &GlobalInfo::from_snapshot(snapshot, now), chunks[0]);

    let interfaces = app.filtered_interfaces();
    let header = Row::new(COLUMNS.iter().map(|title| Cell::from(*title)))
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = interfaces
        .iter()
        .map(|iface| {
            let row = InterfaceRow::from_status(iface, now);
            let badge_style = app.theme.status_style(row.badge.health());
            let [device, badge, since, latency, traffic, ping_target, gateway, last_check] =
                row.cells();
            Row::new(vec![
                Cell::from(device),
                Cell::from(badge).style(badge_style),
                Cell::from(since),
                Cell::from(latency),
                Cell::from(traffic),
                Cell::from(ping_target),
                Cell::from(gateway),
                Cell::from(last_check),
            ])
            .style(app.theme.row_style(row.emphasis))
        })
        .collect();

    let widths = [
        Constraint::Fill(2),    // Device
        Constraint::Fill(3),    // Status
        Constraint::Length(19), // Since
        Constraint::Length(10), // Latency
        Constraint::Fill(3),    // Traffic
        Constraint::Fill(2),    // Ping Target
        Constraint::Fill(2),    // Gateway
        Constraint::Length(12), // Last Check
    ];

    let selected = app.selected_index.min(interfaces.len().saturating_sub(1));

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !interfaces.is_empty() {
        format!(" [{}/{}]", selected + 1, interfaces.len())
    } else {
        String::new()
    };

    let title = format!(
        " Interface Status ({}/{}){}{} ",
        interfaces.len(),
        snapshot.interfaces.len(),
        filter_info,
        position_info
    );

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
    if !interfaces.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, chunks[1], &mut state);
}

fn render_service_info(frame: &mut Frame, app: &App, info: &GlobalInfo, area: Rect) {
    let label = |text: &'static str| Span::styled(text, Style::default().add_modifier(Modifier::DIM));

    let mut last_check = vec![
        label(" Last status check of WAN interfaces: "),
        Span::raw(info.last_check.clone()),
    ];
    if info.stale {
        last_check.push(Span::styled(
            "  (stale)",
            Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
        ));
    }

    let lines = vec![
        Line::from(vec![
            label(" Mode: "),
            Span::styled(info.mode.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![label(" Check Interval: "), Span::raw(info.check_interval.clone())]),
        Line::from(last_check),
    ];

    let block = Block::default()
        .title(" Service Information ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_not_running(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", NOT_RUNNING_NOTICE),
            Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", NOT_RUNNING_HINT),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Interface Status ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Turn 0-7 levels into block characters, keeping the last 8 samples.
pub fn render_sparkline(data: &[u8]) -> String {
    let skip = data.len().saturating_sub(8);
    data[skip..].iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}
