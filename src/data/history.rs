//! Day-by-day incident history for the status strip.
//!
//! Each monitor gets exactly [`HISTORY_DAYS`] cells, oldest first, the last
//! one being today in the view's timezone. A cell is "no data" before the
//! monitor existed, operational when no incident overlapped the day, or
//! coloured by the most severe incident active that day.

use std::cmp::Reverse;
use std::fmt::Display;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use statuswatch_types::{IncidentType, Monitor};
use tracing::warn;

use super::incident::{enrich_all, window_tooltip, EnrichedIncident, NO_DATA_COLOR, OPERATIONAL};
use super::resolve::Severity;
use super::timestamp::{day_bounds, parse_timestamp};
use crate::error::EnrichError;

/// Number of days shown in the history strip.
pub const HISTORY_DAYS: usize = 30;

/// An incident as seen from one day, its active window clipped to that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayIncident {
    pub incident: EnrichedIncident,
    /// Start of the incident within the day.
    pub from: DateTime<Utc>,
    /// End of the incident within the day; `None` while it is still running today.
    pub until: Option<DateTime<Utc>>,
    pub tooltip: String,
}

impl Severity for DayIncident {
    fn severity(&self) -> IncidentType {
        self.incident.kind
    }

    fn is_open(&self) -> bool {
        self.incident.is_open()
    }
}

/// What a single day shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DayState {
    /// No monitor in the set existed yet.
    NoData,
    Operational,
    Incidents {
        color: &'static str,
        /// Open first, then newest first.
        incidents: Vec<DayIncident>,
    },
}

/// One cell of the history strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub index: usize,
    pub date: NaiveDate,
    pub state: DayState,
}

impl DayCell {
    pub fn color(&self) -> &'static str {
        match &self.state {
            DayState::NoData => NO_DATA_COLOR,
            DayState::Operational => OPERATIONAL.color,
            DayState::Incidents { color, .. } => *color,
        }
    }

    pub fn incidents(&self) -> &[DayIncident] {
        match &self.state {
            DayState::Incidents { incidents, .. } => incidents,
            _ => &[],
        }
    }

    pub fn has_data(&self) -> bool {
        !matches!(self.state, DayState::NoData)
    }
}

/// History input for one monitor.
#[derive(Debug, Clone, Copy)]
pub struct MonitorTimeline<'a> {
    /// `None` when the creation time is unknown; the monitor then counts as
    /// having always existed.
    pub created_at: Option<DateTime<Utc>>,
    pub incidents: &'a [EnrichedIncident],
}

/// Builds history strips against a single reference instant.
///
/// `now` is fixed at construction so all day boundaries of a build agree,
/// and so tests can pin the clock.
#[derive(Debug, Clone)]
pub struct HistoryBuilder<Tz: TimeZone> {
    now: DateTime<Tz>,
}

impl<Tz> HistoryBuilder<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> &DateTime<Tz> {
        &self.now
    }

    /// Build the strip for a set of monitors (one monitor for a history row).
    pub fn build(&self, monitors: &[MonitorTimeline<'_>]) -> Vec<DayCell> {
        let tz = self.now.timezone();
        let today = self.now.date_naive();
        let now = self.now.with_timezone(&Utc);

        (0..HISTORY_DAYS)
            .map(|index| {
                let days_ago = (HISTORY_DAYS - 1 - index) as i64;
                let date = today - Duration::days(days_ago);
                build_day(index, date, &tz, &now, monitors)
            })
            .collect()
    }
}

fn build_day<Tz>(
    index: usize,
    date: NaiveDate,
    tz: &Tz,
    now: &DateTime<Utc>,
    monitors: &[MonitorTimeline<'_>],
) -> DayCell
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let (day_start, day_end) = day_bounds(date, tz);

    let existed = monitors
        .iter()
        .any(|m| m.created_at.map_or(true, |created| created <= day_end));
    if !existed {
        return DayCell {
            index,
            date,
            state: DayState::NoData,
        };
    }

    let mut incidents: Vec<DayIncident> = monitors
        .iter()
        .flat_map(|m| m.incidents.iter())
        .filter(|i| i.created_at <= day_end && i.ended_at.map_or(true, |end| end >= day_start))
        .map(|i| clip_to_day(i, day_start, day_end, now, tz))
        .collect();

    if incidents.is_empty() {
        return DayCell {
            index,
            date,
            state: DayState::Operational,
        };
    }

    // Severity first for the colour; the recency sort below is stable so
    // same-instant incidents stay in severity order.
    incidents.sort_by_key(|d| d.incident.kind.priority());
    let color = incidents[0].incident.color();
    incidents.sort_by_key(|d| (!d.incident.is_open(), Reverse(d.incident.created_at)));

    DayCell {
        index,
        date,
        state: DayState::Incidents { color, incidents },
    }
}

fn clip_to_day<Tz>(
    incident: &EnrichedIncident,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
    now: &DateTime<Utc>,
    tz: &Tz,
) -> DayIncident
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let from = incident.created_at.max(day_start);
    let until = match incident.ended_at {
        Some(end) => Some(end.min(day_end)),
        // Still open, but this day is over
        None if day_end < *now => Some(day_end),
        None => None,
    };
    let tooltip = window_tooltip(&incident.description, &from, until.as_ref(), tz);

    DayIncident {
        incident: incident.clone(),
        from,
        until,
        tooltip,
    }
}

/// Parse a monitor's creation time, logging and returning `None` if malformed.
pub fn monitor_created_at<Tz: TimeZone>(monitor: &Monitor, tz: &Tz) -> Option<DateTime<Utc>> {
    match parse_timestamp(&monitor.created_at, tz) {
        Ok(created) => Some(created),
        Err(e) => {
            warn!("Monitor {} has malformed created_at: {}", monitor.id, e);
            None
        }
    }
}

/// Enrich raw monitors and build their combined strip.
pub fn build_history<Tz>(monitors: &[Monitor], now: &DateTime<Tz>) -> Result<Vec<DayCell>, EnrichError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let enriched = monitors
        .iter()
        .map(|m| enrich_all(m, &tz))
        .collect::<Result<Vec<_>, _>>()?;

    let timelines: Vec<MonitorTimeline<'_>> = monitors
        .iter()
        .zip(&enriched)
        .map(|(monitor, incidents)| MonitorTimeline {
            created_at: monitor_created_at(monitor, &tz),
            incidents,
        })
        .collect();

    Ok(HistoryBuilder::new(now.clone()).build(&timelines))
}
