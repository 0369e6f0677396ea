//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::watch;

use crate::data::{DayCell, MonitorStatus, StatusView, HISTORY_DAYS};
use crate::notify::{Level, NotificationQueue};
use crate::ui::status::StripGeometry;
use crate::ui::Theme;

/// How long a status bar message stays visible.
const MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail: bool,

    // Data
    views: watch::Receiver<Option<Arc<StatusView>>>,
    source_description: String,
    notifications: NotificationQueue,
    pub view: Option<Arc<StatusView>>,
    pub last_updated: Option<Instant>,

    // Navigation state
    /// Index into the flattened monitor list.
    pub selected_monitor: usize,
    /// Day under focus in the selected monitor's strip.
    pub focused_day: Option<usize>,
    refresh_requested: bool,

    // UI
    pub theme: Theme,
    /// Where the strip was last drawn, for mouse hit-testing.
    pub strip: Option<StripGeometry>,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Level, Instant)>,
}

impl App {
    /// Create a new App reading views from `views`.
    pub fn new(
        views: watch::Receiver<Option<Arc<StatusView>>>,
        source_description: impl Into<String>,
        notifications: NotificationQueue,
    ) -> Self {
        Self::with_theme(views, source_description, notifications, Theme::auto_detect())
    }

    pub fn with_theme(
        views: watch::Receiver<Option<Arc<StatusView>>>,
        source_description: impl Into<String>,
        notifications: NotificationQueue,
        theme: Theme,
    ) -> Self {
        let mut app = Self {
            running: true,
            show_help: false,
            show_detail: false,
            views,
            source_description: source_description.into(),
            notifications,
            view: None,
            last_updated: None,
            selected_monitor: 0,
            focused_day: Some(HISTORY_DAYS - 1),
            refresh_requested: false,
            theme,
            strip: None,
            status_message: None,
        };
        // Pick up anything published before the UI started
        let initial = app.views.borrow_and_update().clone();
        if let Some(view) = initial {
            app.apply_view(view);
        }
        app
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// Take a newly published view and pending notifications.
    ///
    /// Returns true if the view changed.
    pub fn poll_updates(&mut self) -> bool {
        for notification in self.notifications.drain() {
            self.status_message = Some((notification.message, notification.level, Instant::now()));
        }

        if !self.views.has_changed().unwrap_or(false) {
            return false;
        }
        let latest = self.views.borrow_and_update().clone();
        let Some(view) = latest else {
            return false;
        };
        self.apply_view(view);
        true
    }

    fn apply_view(&mut self, view: Arc<StatusView>) {
        self.view = Some(view);
        self.last_updated = Some(Instant::now());

        // Clamp selection index
        let count = self.monitor_count();
        if self.selected_monitor >= count {
            self.selected_monitor = count.saturating_sub(1);
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: impl Into<String>, level: Level) {
        self.status_message = Some((message.into(), level, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<(&str, Level)> {
        match &self.status_message {
            Some((msg, level, time)) if time.elapsed() < MESSAGE_TTL => Some((msg, *level)),
            _ => None,
        }
    }

    pub fn monitor_count(&self) -> usize {
        self.view.as_ref().map_or(0, |v| v.monitor_count())
    }

    pub fn selected(&self) -> Option<&MonitorStatus> {
        self.view.as_ref()?.monitors().nth(self.selected_monitor)
    }

    /// The focused day of the selected monitor.
    pub fn focused_cell(&self) -> Option<&DayCell> {
        self.selected()?.day(self.focused_day?)
    }

    /// Move selection down by one monitor.
    pub fn select_next(&mut self) {
        let max = self.monitor_count().saturating_sub(1);
        self.selected_monitor = (self.selected_monitor + 1).min(max);
    }

    /// Move selection up by one monitor.
    pub fn select_prev(&mut self) {
        self.selected_monitor = self.selected_monitor.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_monitor = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_monitor = self.monitor_count().saturating_sub(1);
    }

    /// Select a monitor by flattened index, ignoring out-of-range values.
    pub fn select_monitor(&mut self, index: usize) {
        if index < self.monitor_count() {
            self.selected_monitor = index;
        }
    }

    /// Focus a day of the selected monitor's strip.
    ///
    /// An index outside the strip clears the focus and closes the detail.
    pub fn focus_day(&mut self, index: Option<usize>) {
        match index.filter(|i| *i < HISTORY_DAYS) {
            Some(i) => self.focused_day = Some(i),
            None => {
                self.focused_day = None;
                self.show_detail = false;
            }
        }
    }

    /// Move the focused day by `delta`, starting from today when nothing is focused.
    pub fn move_day(&mut self, delta: isize) {
        let current = self.focused_day.unwrap_or(HISTORY_DAYS - 1) as isize;
        let next = (current + delta).clamp(0, HISTORY_DAYS as isize - 1);
        self.focused_day = Some(next as usize);
    }

    /// Toggle the detail overlay for the focused day.
    pub fn toggle_detail(&mut self) {
        if self.show_detail {
            self.show_detail = false;
            return;
        }
        if self.focused_day.is_none() {
            self.focused_day = Some(HISTORY_DAYS - 1);
        }
        self.show_detail = self.focused_cell().is_some();
    }

    /// Close overlays, help first.
    pub fn go_back(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else {
            self.show_detail = false;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Ask the main loop for an immediate refresh.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
        self.set_status_message("Refreshing...", Level::Info);
    }

    /// Returns and clears a pending refresh request.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current view to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref view) = self.view else {
            anyhow::bail!("No data to export");
        };
        export_view(view, path)
    }
}

/// Write a view as pretty JSON.
pub fn export_view(view: &StatusView, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(view)?;
    std::fs::write(path, json)?;
    Ok(())
}
