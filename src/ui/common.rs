//! Common UI components.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::notify::Level;

/// Render the header bar with the page-wide status.
///
/// Displays: status indicator, headline, banner message and monitor counts.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref view) = app.view else {
        let line = Line::from(vec![
            Span::styled(" STATUSWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let summary = view.summary();
    let status_style = app.theme.status_style(&view.current);

    let count = |n: usize, style: Style| {
        if n > 0 {
            Span::styled(n.to_string(), style)
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled(view.current.title(), status_style.add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
        Span::raw(view.current.message().to_string()),
        Span::raw(" │ "),
        Span::styled(
            summary.operational.to_string(),
            Style::default().fg(app.theme.operational),
        ),
        Span::raw(" ok "),
        count(summary.degraded, Style::default().fg(app.theme.degraded)),
        Span::raw(" degraded "),
        count(summary.partial_outage, Style::default().fg(app.theme.partial_outage)),
        Span::raw(" partial "),
        count(
            summary.major_outage,
            Style::default()
                .fg(app.theme.major_outage)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" major"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some((msg, level)) = app.get_status_message() {
        let color = match level {
            Level::Info => app.theme.highlight,
            Level::Error => app.theme.major_outage,
        };
        let paragraph = Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(color));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "↑↓:monitor ←→:day Enter:detail r:refresh ?:help q:quit";
    let status = match app.last_updated {
        Some(at) => format!(
            " {} | Updated {}s ago | {}",
            app.source_description(),
            at.elapsed().as_secs(),
            controls
        ),
        None => format!(" {} | Loading... | q:quit", app.source_description()),
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
        Line::from("  ↑/↓ j/k     Select monitor"),
        Line::from("  ←/→ h/l     Move through days"),
        Line::from("  Home/End    First/last monitor"),
        Line::from("  Enter       Toggle day detail"),
        Line::from("  Esc         Close overlay"),
        Line::from("  Mouse       Hover a day for detail"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Refresh now"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
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

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
