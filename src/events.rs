use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::notify::Level;

/// Where the `e` key writes the current view.
pub const EXPORT_PATH: &str = "status_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        // Monitors
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Days
        KeyCode::Left | KeyCode::Char('h') => app.move_day(-1),
        KeyCode::Right | KeyCode::Char('l') => app.move_day(1),

        KeyCode::Enter => app.toggle_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => app.request_refresh(),
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(
                        format!("Exported to {}", export_path.display()),
                        Level::Info,
                    );
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e), Level::Error);
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
///
/// Hovering a day of a monitor's strip selects that monitor and shows the
/// day; moving off the strip clears it.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Moved => {
            let Some(strip) = app.strip.as_ref() else {
                return;
            };
            let hit = strip
                .monitor_at(mouse.row)
                .zip(strip.day_index_at(mouse.column));

            match hit {
                Some((monitor, day)) => {
                    app.select_monitor(monitor);
                    app.focus_day(Some(day));
                    app.show_detail = true;
                }
                None if app.show_detail => app.focus_day(None),
                None => {}
            }
        }

        // Click to select
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(monitor) = app.strip.as_ref().and_then(|s| s.monitor_at(mouse.row)) {
                app.select_monitor(monitor);
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}
