// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # statuswatch
//!
//! A terminal status page and library for monitored services.
//!
//! This crate turns a tree of groups, monitors and incidents into the view a
//! public status page shows: the page-wide current status, each monitor's
//! current status, and a 30-day coloured history strip per monitor. The tree
//! is fetched periodically from a status API, a JSON file or an in-process
//! channel, and rendered in an interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌──────────┐   ┌──────────┐   ┌─────────┐   ┌──────────┐   │
//! │  │scheduler │──▶│   data   │──▶│   app   │──▶│    ui    │   │
//! │  │ (loop)   │   │(aggregate)   │ (state) │   │(rendering)   │
//! │  └────┬─────┘   └──────────┘   └─────────┘   └──────────┘   │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource | FileSource | ChannelSource     │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`StatusSource`] trait and its implementations
//! - **[`data`]**: Incident enrichment, status resolution, daily history and
//!   the [`aggregate`](data::aggregate) entry point producing a [`StatusView`]
//! - **[`scheduler`]**: [`RefreshScheduler`], the cancellable refresh loop
//! - **[`notify`]**: User-facing notifications for failed refreshes
//! - **[`app`]** and **[`ui`]**: TUI state and ratatui rendering
//! - **[`config`]**: Layered [`Settings`]
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a status API
//! statuswatch --url https://status.example.com
//!
//! # Watch a JSON file
//! statuswatch --file status.json
//!
//! # Aggregate once and write the view as JSON
//! statuswatch --file status.json --export view.json
//! ```
//!
//! ### Aggregating a tree directly
//!
//! ```
//! use statuswatch::aggregate;
//! use statuswatch_types::{Component, Monitor};
//!
//! let components = vec![Component::Monitor(Monitor::new(
//!     "api",
//!     "API",
//!     "2024-01-01T00:00:00Z",
//! ))];
//! let view = aggregate(&components).unwrap();
//! assert!(view.current.is_operational());
//! assert_eq!(view.monitor_count(), 1);
//! ```
//!
//! ### Feeding the scheduler from a channel
//!
//! ```
//! use std::sync::Arc;
//! use statuswatch::{ChannelSource, RefreshScheduler};
//! use statuswatch_types::{Component, Monitor};
//!
//! # tokio_test::block_on(async {
//! let (tx, source) = ChannelSource::create("embedded");
//! tx.send(vec![Component::Monitor(Monitor::new(
//!     "api",
//!     "API",
//!     "2024-01-01T00:00:00Z",
//! ))])
//! .unwrap();
//!
//! let scheduler = RefreshScheduler::new(Arc::new(source));
//! let view = scheduler.refresh().await.unwrap();
//! assert_eq!(view.monitor_count(), 1);
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod notify;
pub mod scheduler;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    aggregate, aggregate_at, ComponentStatus, CurrentStatus, DayCell, DayState, EnrichedIncident,
    GroupStatus, MonitorStatus, StatusSummary, StatusView, HISTORY_DAYS,
};
pub use error::{EnrichError, RefreshError, SchedulerError, SourceError};
pub use notify::{Notification, NotificationQueue, Notifier, TracingNotifier};
pub use scheduler::{RefreshScheduler, SchedulerState, REFRESH_INTERVAL};
pub use source::{ChannelSource, FileSource, HttpSource, StatusSource};
