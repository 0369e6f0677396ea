//! Day detail overlay rendering.
//!
//! Shows the focused day of the selected monitor: its date, state and every
//! incident active that day with its clipped time window.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{DayCell, DayState};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 40;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 8;

/// Render the focused day as a modal overlay.
///
/// Renders nothing when no day is focused.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }
    let (Some(monitor), Some(cell)) = (app.selected(), app.focused_cell()) else {
        return;
    };

    let lines = detail_lines(app, cell);

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (lines.len() as u16 + 2).clamp(MIN_OVERLAY_HEIGHT, area.height);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    let block = Block::default()
        .title(format!(" {} · {} ", monitor.name, cell.date.format("%B %-d")))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.token_color(cell.color())));

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        overlay_area,
    );
}

fn detail_lines(app: &App, cell: &DayCell) -> Vec<Line<'static>> {
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = match &cell.state {
        DayState::NoData => vec![Line::from(Span::styled(" No data for this day", dim))],
        DayState::Operational => vec![Line::from(Span::styled(
            " No incidents",
            Style::default().fg(app.theme.operational),
        ))],
        DayState::Incidents { incidents, .. } => incidents
            .iter()
            .flat_map(|day| {
                let style = Style::default().fg(app.theme.token_color(day.incident.color()));
                let state = if day.incident.is_open() {
                    "open"
                } else {
                    "resolved"
                };
                [
                    Line::from(vec![
                        Span::styled(" ● ", style),
                        Span::styled(day.incident.title(), style.add_modifier(Modifier::BOLD)),
                        Span::styled(format!(" ({})", state), dim),
                    ]),
                    Line::from(format!("   {}", day.tooltip)),
                ]
            })
            .collect(),
    };

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ←/→ change day · Esc close",
        dim,
    )));
    lines
}
