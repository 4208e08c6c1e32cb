//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{HealthStatus, RowEmphasis};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for degraded / no-connectivity badges.
    pub warning: Color,
    /// Color for missing or down interfaces.
    pub critical: Color,
    /// Color for interfaces that are up.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Row background for interfaces whose device does not exist.
    pub not_found_row: Color,
    /// Row background for degraded interfaces.
    pub degraded_row: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            not_found_row: Color::Rgb(70, 20, 20),
            degraded_row: Color::Rgb(70, 60, 10),
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Rgb(0xFF, 0x98, 0x00),
            critical: Color::Rgb(0xF4, 0x43, 0x36),
            healthy: Color::Rgb(0x4C, 0xAF, 0x50),
            border: Color::DarkGray,
            not_found_row: Color::Rgb(0xFF, 0xEB, 0xEE),
            degraded_row: Color::Rgb(0xFF, 0xF9, 0xC4),
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a health status
    pub fn status_style(&self, status: HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy).add_modifier(Modifier::BOLD),
            HealthStatus::Warning => Style::default().fg(self.warning).add_modifier(Modifier::BOLD),
            HealthStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Background style for a table row
    pub fn row_style(&self, emphasis: RowEmphasis) -> Style {
        match emphasis {
            RowEmphasis::Normal => Style::default(),
            RowEmphasis::NotFound => Style::default().bg(self.not_found_row),
            RowEmphasis::Degraded => Style::default().bg(self.degraded_row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_style_backgrounds() {
        for theme in [Theme::dark(), Theme::light()] {
            assert_eq!(theme.row_style(RowEmphasis::Normal), Style::default());
            assert_eq!(theme.row_style(RowEmphasis::NotFound).bg, Some(theme.not_found_row));
            assert_eq!(theme.row_style(RowEmphasis::Degraded).bg, Some(theme.degraded_row));
            assert_eq!(theme.status_style(HealthStatus::Critical).fg, Some(theme.critical));
        }
    }
}
