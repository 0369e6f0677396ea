//! The status aggregation engine.
//!
//! Turns the raw component tree into the view model the status page renders.
//!
//! ## Submodules
//!
//! - [`timestamp`]: Wire timestamp parsing, US-English date/time formatting, day bounds
//! - [`incident`]: Incident enrichment and the per-severity display configuration
//! - [`resolve`]: Severity ordering and active-incident resolution
//! - [`history`]: The 30-day history strip ([`DayCell`])
//! - [`aggregate`]: The whole-tree transform producing a [`StatusView`]
//!
//! ## Data Flow
//!
//! ```text
//! Vec<Component> (raw JSON)
//!        │
//!        ▼
//! aggregate_at(components, now)
//!        │
//!        ├──▶ enrich_all()      per monitor, indexed by monitor id
//!        │
//!        ├──▶ resolve()         current status per monitor and for the page
//!        │
//!        └──▶ HistoryBuilder    30 day cells per monitor
//! ```

pub mod aggregate;
pub mod history;
pub mod incident;
pub mod resolve;
pub mod timestamp;

pub use aggregate::{
    aggregate, aggregate_at, ComponentStatus, GroupStatus, MonitorStatus, StatusSummary, StatusView,
};
pub use history::{build_history, DayCell, DayIncident, DayState, HistoryBuilder, HISTORY_DAYS};
pub use incident::{display_for, enrich, EnrichedIncident, IncidentDisplay, OPERATIONAL};
pub use resolve::{find_active, prioritize, resolve, CurrentStatus, Severity};
