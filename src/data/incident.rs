//! Incident enrichment: display configuration and narrative text.
//!
//! Raw incidents carry a severity string, a lifecycle status and ISO
//! timestamps. Enrichment parses those, attaches the colour/title tokens for
//! the severity, and derives the banner message and tooltip shown in the UI.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use statuswatch_types::{Incident, IncidentStatus, IncidentType, Monitor};
use tracing::warn;

use super::timestamp::{format_clock, format_long_date, parse_timestamp};
use crate::error::EnrichError;

/// Colour tokens and title for one status.
///
/// Tokens are the status page's CSS class names; the TUI theme maps them to
/// terminal colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncidentDisplay {
    pub color: &'static str,
    pub bg_color: &'static str,
    pub border_color: &'static str,
    pub title: &'static str,
}

const MAJOR_OUTAGE: IncidentDisplay = IncidentDisplay {
    color: "bg-major-outage",
    bg_color: "bg-major-outage/20",
    border_color: "border-major-outage",
    title: "Major service outage",
};

const PARTIAL_OUTAGE: IncidentDisplay = IncidentDisplay {
    color: "bg-partial-outage",
    bg_color: "bg-partial-outage/20",
    border_color: "border-partial-outage",
    title: "Partial service disruption",
};

const DEGRADED: IncidentDisplay = IncidentDisplay {
    color: "bg-degraded",
    bg_color: "bg-degraded/20",
    border_color: "border-degraded",
    title: "Performance degradation detected",
};

/// Display data for "no active incident".
pub const OPERATIONAL: IncidentDisplay = IncidentDisplay {
    color: "bg-operational",
    bg_color: "bg-operational/20",
    border_color: "border-operational",
    title: "All systems operational",
};

/// Banner text when nothing is open.
pub const OPERATIONAL_MESSAGE: &str = "No active incidents";

/// Colour of days before any monitor existed.
pub const NO_DATA_COLOR: &str = "bg-empty";

/// Display configuration for a severity.
pub fn display_for(kind: IncidentType) -> &'static IncidentDisplay {
    match kind {
        IncidentType::MajorOutage => &MAJOR_OUTAGE,
        IncidentType::PartialOutage => &PARTIAL_OUTAGE,
        IncidentType::Degraded => &DEGRADED,
    }
}

/// An incident with parsed timestamps, display tokens and derived text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedIncident {
    pub id: String,
    pub monitor_id: String,
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub status: IncidentStatus,
    /// The incident's own free-text message.
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub display: IncidentDisplay,
    /// "{monitor} is currently affected. Issue started on {date} at {time}"
    pub message: String,
    pub tooltip: String,
}

impl EnrichedIncident {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn color(&self) -> &'static str {
        self.display.color
    }

    pub fn title(&self) -> &'static str {
        self.display.title
    }
}

/// Enrich one incident of `monitor`, formatting times in `tz`.
///
/// The severity is checked first so that a record that is both badly typed
/// and badly timestamped reports the fatal error. An open incident must have
/// no `ended_at` and a resolved one must have it.
pub fn enrich<Tz>(
    monitor: &Monitor,
    incident: &Incident,
    tz: &Tz,
) -> Result<EnrichedIncident, EnrichError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let kind = incident.severity()?;
    let created_at = parse_field("created_at", &incident.created_at, tz)?;
    let ended_at = incident
        .ended_at
        .as_deref()
        .map(|value| parse_field("ended_at", value, tz))
        .transpose()?;

    match (incident.is_open(), ended_at.is_some()) {
        (true, true) => {
            return Err(EnrichError::InvalidTimestamp {
                field: "ended_at",
                value: incident.ended_at.clone().unwrap_or_default(),
                reason: "open incident has an end time".to_string(),
            })
        }
        (false, false) => {
            return Err(EnrichError::InvalidTimestamp {
                field: "ended_at",
                value: "null".to_string(),
                reason: "resolved incident has no end time".to_string(),
            })
        }
        _ => {}
    }

    if let Some(end) = ended_at {
        if end < created_at {
            return Err(EnrichError::InvalidTimestamp {
                field: "ended_at",
                value: incident.ended_at.clone().unwrap_or_default(),
                reason: "ends before it was created".to_string(),
            });
        }
    }

    let message = format!(
        "{} is currently affected. Issue started on {} at {}",
        monitor.name,
        format_long_date(&created_at, tz),
        format_clock(&created_at, tz),
    );
    let tooltip = window_tooltip(&incident.message, &created_at, ended_at.as_ref(), tz);

    Ok(EnrichedIncident {
        id: incident.id.clone(),
        monitor_id: monitor.id.clone(),
        kind,
        status: incident.status,
        description: incident.message.clone(),
        created_at,
        ended_at,
        display: *display_for(kind),
        message,
        tooltip,
    })
}

/// Enrich every incident of `monitor`.
///
/// Records with malformed timestamps are logged and skipped; an unknown
/// severity aborts with the error.
pub fn enrich_all<Tz>(monitor: &Monitor, tz: &Tz) -> Result<Vec<EnrichedIncident>, EnrichError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut enriched = Vec::with_capacity(monitor.incidents.len());
    for incident in &monitor.incidents {
        match enrich(monitor, incident, tz) {
            Ok(e) => enriched.push(e),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!(
                "Skipping incident {} on monitor {}: {}",
                incident.id, monitor.id, e
            ),
        }
    }
    Ok(enriched)
}

/// Tooltip for an incident active from `from`, until `until` when it ended.
pub(crate) fn window_tooltip<Tz>(
    description: &str,
    from: &DateTime<Utc>,
    until: Option<&DateTime<Utc>>,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match until {
        Some(until) => format!(
            "{} ({} - {})",
            description,
            format_clock(from, tz),
            format_clock(until, tz)
        ),
        None => format!("{} (started at {})", description, format_clock(from, tz)),
    }
}

fn parse_field<Tz: TimeZone>(
    field: &'static str,
    value: &str,
    tz: &Tz,
) -> Result<DateTime<Utc>, EnrichError> {
    parse_timestamp(value, tz).map_err(|e| EnrichError::InvalidTimestamp {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Monitor {
        Monitor::new("m-1", "API", "2024-05-01T00:00:00Z")
    }

    #[test]
    fn every_severity_has_distinct_display() {
        let colors: Vec<&str> = IncidentType::PRIORITY_ORDER
            .iter()
            .map(|k| display_for(*k).color)
            .collect();
        assert_eq!(colors, vec!["bg-major-outage", "bg-partial-outage", "bg-degraded"]);
        assert_eq!(display_for(IncidentType::Degraded).title, "Performance degradation detected");
    }

    #[test]
    fn open_incident_message_and_tooltip() {
        let incident = Incident::open(
            "i-1",
            IncidentType::MajorOutage,
            "Requests failing",
            "2024-06-14T08:30:00Z",
        );

        let enriched = enrich(&api(), &incident, &Utc).unwrap();

        assert_eq!(
            enriched.message,
            "API is currently affected. Issue started on June 14 at 08:30 AM"
        );
        assert_eq!(enriched.tooltip, "Requests failing (started at 08:30 AM)");
        assert_eq!(enriched.color(), "bg-major-outage");
        assert_eq!(enriched.monitor_id, "m-1");
        assert!(enriched.is_open());
        assert!(enriched.ended_at.is_none());
    }

    #[test]
    fn resolved_incident_tooltip_shows_range() {
        let incident = Incident::resolved(
            "i-2",
            IncidentType::Degraded,
            "Slow responses",
            "2024-06-14T13:00:00Z",
            "2024-06-14T15:45:00Z",
        );

        let enriched = enrich(&api(), &incident, &Utc).unwrap();

        assert_eq!(enriched.tooltip, "Slow responses (01:00 PM - 03:45 PM)");
        assert_eq!(enriched.title(), "Performance degradation detected");
    }

    #[test]
    fn malformed_timestamp_is_not_fatal() {
        let mut incident =
            Incident::open("i-3", IncidentType::Degraded, "Slow", "2024-06-14T13:00:00Z");
        incident.created_at = "not a date".to_string();

        let err = enrich(&api(), &incident, &Utc).unwrap_err();
        assert!(matches!(
            err,
            EnrichError::InvalidTimestamp { field: "created_at", .. }
        ));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unknown_type_is_fatal_even_with_bad_timestamp() {
        let mut incident =
            Incident::open("i-4", IncidentType::Degraded, "Window", "garbage");
        incident.kind = "maintenance".to_string();

        let err = enrich(&api(), &incident, &Utc).unwrap_err();
        assert_eq!(err, EnrichError::UnknownIncidentType("maintenance".to_string()));
        assert!(err.is_fatal());
    }

    #[test]
    fn enrich_all_skips_only_malformed_records() {
        let mut bad = Incident::open("bad", IncidentType::Degraded, "Slow", "x");
        bad.created_at = "???".to_string();
        let monitor = api()
            .incident(bad)
            .incident(Incident::open("ok", IncidentType::Degraded, "Slow", "2024-06-14T13:00:00Z"));

        let enriched = enrich_all(&monitor, &Utc).unwrap();
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].id, "ok");

        let mut odd = Incident::open("odd", IncidentType::Degraded, "Window", "2024-06-14T13:00:00Z");
        odd.kind = "maintenance".to_string();
        assert!(enrich_all(&monitor.incident(odd), &Utc).unwrap_err().is_fatal());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let incident = Incident::resolved(
            "i-5",
            IncidentType::PartialOutage,
            "Flapping",
            "2024-06-14T13:00:00Z",
            "2024-06-14T12:00:00Z",
        );

        let err = enrich(&api(), &incident, &Utc).unwrap_err();
        assert!(matches!(err, EnrichError::InvalidTimestamp { field: "ended_at", .. }));
    }

    #[test]
    fn status_must_agree_with_end_time() {
        let mut unfinished = Incident::resolved(
            "i-6",
            IncidentType::MajorOutage,
            "Down",
            "2024-06-14T13:00:00Z",
            "2024-06-14T14:00:00Z",
        );
        unfinished.ended_at = None;
        let err = enrich(&api(), &unfinished, &Utc).unwrap_err();
        assert!(matches!(err, EnrichError::InvalidTimestamp { field: "ended_at", .. }));
        assert!(!err.is_fatal());

        let mut ended = Incident::open("i-7", IncidentType::Degraded, "Slow", "2024-06-14T13:00:00Z");
        ended.ended_at = Some("2024-06-14T14:00:00Z".to_string());
        let err = enrich(&api(), &ended, &Utc).unwrap_err();
        assert!(matches!(err, EnrichError::InvalidTimestamp { field: "ended_at", .. }));

        // Both are dropped from the batch; the well-formed record survives
        let monitor = api()
            .incident(unfinished)
            .incident(ended)
            .incident(Incident::open("ok", IncidentType::Degraded, "Slow", "2024-06-14T13:00:00Z"));
        let enriched = enrich_all(&monitor, &Utc).unwrap();
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].id, "ok");
    }
}
