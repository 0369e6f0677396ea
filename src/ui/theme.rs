//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection. Status
//! colour tokens from the view model (`bg-major-outage`, ...) are mapped to
//! terminal colours here.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::CurrentStatus;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    pub operational: Color,
    pub degraded: Color,
    pub partial_outage: Color,
    pub major_outage: Color,
    /// Days before a monitor existed.
    pub no_data: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for group rows.
    pub group: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            operational: Color::Green,
            degraded: Color::Yellow,
            partial_outage: Color::LightRed,
            major_outage: Color::Red,
            no_data: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            group: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            operational: Color::Green,
            degraded: Color::Yellow,
            partial_outage: Color::Magenta,
            major_outage: Color::Red,
            no_data: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            group: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
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

    /// Terminal colour for a status colour token.
    ///
    /// Background, border and translucent variants share the base colour.
    pub fn token_color(&self, token: &str) -> Color {
        let base = token
            .trim_start_matches("bg-")
            .trim_start_matches("border-")
            .split('/')
            .next()
            .unwrap_or_default();
        match base {
            "major-outage" => self.major_outage,
            "partial-outage" => self.partial_outage,
            "degraded" => self.degraded,
            "operational" => self.operational,
            _ => self.no_data,
        }
    }

    /// Style for a monitor's or the page's current status.
    pub fn status_style(&self, status: &CurrentStatus) -> Style {
        let style = Style::default().fg(self.token_color(status.color()));
        if status.is_operational() {
            style
        } else {
            style.add_modifier(Modifier::BOLD)
        }
    }
}
