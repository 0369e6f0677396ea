//! Status page body: one row per monitor with its 30-day strip.
//!
//! Monitors of a group are listed under a group row, in input order.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{ComponentStatus, DayCell, GroupStatus, MonitorStatus, StatusView, HISTORY_DAYS};

/// One terminal column per day.
pub const STRIP_WIDTH: u16 = HISTORY_DAYS as u16;

const DAY_GLYPH: &str = "█";
const FOCUSED_GLYPH: &str = "▼";

/// A visual row of the status table.
#[derive(Debug, Clone, Copy)]
pub enum RowKind<'a> {
    Group(&'a GroupStatus),
    Monitor {
        /// Index in the flattened monitor list.
        index: usize,
        monitor: &'a MonitorStatus,
        grouped: bool,
    },
}

impl RowKind<'_> {
    pub fn monitor_index(&self) -> Option<usize> {
        match self {
            RowKind::Group(_) => None,
            RowKind::Monitor { index, .. } => Some(*index),
        }
    }
}

/// Flatten a view into table rows.
pub fn layout_rows(view: &StatusView) -> Vec<RowKind<'_>> {
    let mut rows = Vec::new();
    let mut index = 0;
    for component in &view.components {
        let grouped = match component {
            ComponentStatus::Group(group) => {
                rows.push(RowKind::Group(group));
                true
            }
            ComponentStatus::Monitor(_) => false,
        };
        for monitor in component.monitors() {
            rows.push(RowKind::Monitor {
                index,
                monitor,
                grouped,
            });
            index += 1;
        }
    }
    rows
}

/// Where the strips were drawn, for mapping mouse positions back to days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripGeometry {
    /// Screen column of day 0.
    pub x: u16,
    /// Screen row of the first visible table row.
    pub first_row_y: u16,
    /// Number of visible table rows.
    pub height: u16,
    /// First visible row after scrolling.
    pub offset: usize,
    /// Monitor index per visual row; `None` for group rows.
    pub rows: Vec<Option<usize>>,
}

impl StripGeometry {
    /// Day index under a screen column, `None` off the strip.
    pub fn day_index_at(&self, column: u16) -> Option<usize> {
        column
            .checked_sub(self.x)
            .map(usize::from)
            .filter(|i| *i < HISTORY_DAYS)
    }

    /// Monitor index under a screen row, `None` off the monitor rows.
    pub fn monitor_at(&self, row: u16) -> Option<usize> {
        let relative = row.checked_sub(self.first_row_y)?;
        if relative >= self.height {
            return None;
        }
        self.rows
            .get(self.offset + usize::from(relative))
            .copied()
            .flatten()
    }
}

/// Render the status table and record the strip geometry on `app`.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(view) = app.view.clone() else {
        app.strip = None;
        let paragraph = Paragraph::new(" Waiting for the first refresh...")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block.title(" Monitors "));
        frame.render_widget(paragraph, area);
        return;
    };

    let rows = layout_rows(&view);
    let selected_row = rows
        .iter()
        .position(|r| r.monitor_index() == Some(app.selected_monitor));

    let header = Row::new(vec![
        Cell::from("Monitor"),
        Cell::from("Status"),
        Cell::from(strip_header(&view)),
    ])
    .height(1)
    .style(app.theme.header);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| match row {
            RowKind::Group(group) => Row::new(vec![
                Cell::from(group.name.clone()).style(app.theme.group),
                Cell::from(format!("{} monitors", group.monitors.len()))
                    .style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(""),
            ]),
            RowKind::Monitor {
                index,
                monitor,
                grouped,
            } => {
                let name = if *grouped {
                    format!("  {}", monitor.name)
                } else {
                    monitor.name.clone()
                };
                let focused = (*index == app.selected_monitor)
                    .then_some(app.focused_day)
                    .flatten();
                Row::new(vec![
                    Cell::from(name),
                    Cell::from(monitor.current.title()).style(app.theme.status_style(&monitor.current)),
                    Cell::from(strip_line(app, &monitor.history, focused)),
                ])
            }
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(34),
        Constraint::Length(STRIP_WIDTH),
    ];

    let position_info = selected_row
        .map(|_| format!(" [{}/{}]", app.selected_monitor + 1, view.monitor_count()))
        .unwrap_or_default();
    let title = format!(" Monitors{} ", position_info);

    let inner = block.inner(area);
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(selected_row);
    frame.render_stateful_widget(table, area, &mut state);

    app.strip = Some(StripGeometry {
        x: inner.right().saturating_sub(STRIP_WIDTH),
        first_row_y: inner.y + 1,
        height: inner.height.saturating_sub(1),
        offset: state.offset(),
        rows: rows.iter().map(RowKind::monitor_index).collect(),
    });
}

/// "May 17 ... Today" spanning the strip.
fn strip_header(view: &StatusView) -> String {
    let first = view
        .monitors()
        .next()
        .and_then(|m| m.day(0))
        .map(|d| d.date.format("%b %-d").to_string())
        .unwrap_or_default();
    format!("{:<width$}Today", first, width = usize::from(STRIP_WIDTH) - 5)
}

fn strip_line(app: &App, history: &[DayCell], focused: Option<usize>) -> Line<'static> {
    let spans: Vec<Span> = history
        .iter()
        .map(|cell| {
            let style = Style::default().fg(app.theme.token_color(cell.color()));
            if Some(cell.index) == focused {
                Span::styled(FOCUSED_GLYPH, style.add_modifier(Modifier::BOLD))
            } else {
                Span::styled(DAY_GLYPH, style)
            }
        })
        .collect();
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate_at;
    use chrono::{TimeZone, Utc};
    use statuswatch_types::{Component, Group, Monitor};

    fn view() -> StatusView {
        let components = vec![
            Component::Monitor(Monitor::new("web", "Website", "2024-01-01T00:00:00Z")),
            Component::Group(
                Group::new("g", "Core")
                    .monitor(Monitor::new("api", "API", "2024-01-01T00:00:00Z"))
                    .monitor(Monitor::new("db", "Database", "2024-01-01T00:00:00Z")),
            ),
        ];
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        aggregate_at(&components, &now).unwrap()
    }

    #[test]
    fn test_layout_rows_keeps_order() {
        let view = view();
        let rows = layout_rows(&view);

        let indices: Vec<Option<usize>> = rows.iter().map(RowKind::monitor_index).collect();
        assert_eq!(indices, vec![Some(0), None, Some(1), Some(2)]);
        assert!(matches!(rows[1], RowKind::Group(g) if g.name == "Core"));
        assert!(matches!(rows[2], RowKind::Monitor { grouped: true, .. }));
    }

    #[test]
    fn test_geometry_hit_testing() {
        let geometry = StripGeometry {
            x: 40,
            first_row_y: 3,
            height: 3,
            offset: 0,
            rows: vec![Some(0), None, Some(1), Some(2)],
        };

        assert_eq!(geometry.day_index_at(40), Some(0));
        assert_eq!(geometry.day_index_at(69), Some(29));
        assert_eq!(geometry.day_index_at(70), None);
        assert_eq!(geometry.day_index_at(10), None);

        assert_eq!(geometry.monitor_at(3), Some(0));
        assert_eq!(geometry.monitor_at(4), None);
        assert_eq!(geometry.monitor_at(5), Some(1));
        // Fourth row is scrolled out of view
        assert_eq!(geometry.monitor_at(6), None);
        assert_eq!(geometry.monitor_at(0), None);

        let scrolled = StripGeometry { offset: 1, ..geometry };
        assert_eq!(scrolled.monitor_at(5), Some(2));
    }

    #[test]
    fn test_strip_header_spans_the_strip() {
        let header = strip_header(&view());
        assert_eq!(header.chars().count(), usize::from(STRIP_WIDTH));
        assert!(header.starts_with("May 17"));
        assert!(header.ends_with("Today"));
    }
}
