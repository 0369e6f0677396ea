//! Active-incident resolution by severity priority.

use serde::Serialize;
use statuswatch_types::IncidentType;

use super::incident::{EnrichedIncident, IncidentDisplay, OPERATIONAL, OPERATIONAL_MESSAGE};

/// Anything that can be ranked by severity and filtered by lifecycle.
pub trait Severity {
    fn severity(&self) -> IncidentType;
    fn is_open(&self) -> bool;
}

impl Severity for EnrichedIncident {
    fn severity(&self) -> IncidentType {
        self.kind
    }

    fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// Order incidents most severe first, keeping input order among equals.
pub fn prioritize<T: Severity>(incidents: &[T]) -> Vec<&T> {
    let mut sorted: Vec<&T> = incidents.iter().collect();
    // sort_by_key is stable
    sorted.sort_by_key(|i| i.severity().priority());
    sorted
}

/// The most severe open incident, if any.
pub fn find_active<T: Severity>(incidents: &[T]) -> Option<&T> {
    prioritize(incidents).into_iter().find(|i| i.is_open())
}

/// What a monitor (or the whole page) currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CurrentStatus {
    /// No open incident.
    Operational,
    Incident(EnrichedIncident),
}

impl CurrentStatus {
    pub fn display(&self) -> &IncidentDisplay {
        match self {
            CurrentStatus::Operational => &OPERATIONAL,
            CurrentStatus::Incident(incident) => &incident.display,
        }
    }

    pub fn title(&self) -> &'static str {
        self.display().title
    }

    pub fn color(&self) -> &'static str {
        self.display().color
    }

    pub fn message(&self) -> &str {
        match self {
            CurrentStatus::Operational => OPERATIONAL_MESSAGE,
            CurrentStatus::Incident(incident) => &incident.message,
        }
    }

    pub fn incident(&self) -> Option<&EnrichedIncident> {
        match self {
            CurrentStatus::Operational => None,
            CurrentStatus::Incident(incident) => Some(incident),
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, CurrentStatus::Operational)
    }
}

/// Resolve the incident to display as current.
pub fn resolve(incidents: &[EnrichedIncident]) -> CurrentStatus {
    find_active(incidents).map_or(CurrentStatus::Operational, |incident| {
        CurrentStatus::Incident(incident.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::incident::enrich;
    use chrono::Utc;
    use statuswatch_types::{Incident, Monitor};

    #[derive(Debug, PartialEq)]
    struct Probe {
        name: &'static str,
        kind: IncidentType,
        open: bool,
    }

    impl Severity for Probe {
        fn severity(&self) -> IncidentType {
            self.kind
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    fn probe(name: &'static str, kind: IncidentType, open: bool) -> Probe {
        Probe { name, kind, open }
    }

    #[test]
    fn higher_priority_wins_regardless_of_order() {
        for (a, b) in [
            (IncidentType::MajorOutage, IncidentType::PartialOutage),
            (IncidentType::MajorOutage, IncidentType::Degraded),
            (IncidentType::PartialOutage, IncidentType::Degraded),
        ] {
            let forward = [probe("high", a, true), probe("low", b, true)];
            let backward = [probe("low", b, true), probe("high", a, true)];
            assert_eq!(find_active(&forward).unwrap().name, "high");
            assert_eq!(find_active(&backward).unwrap().name, "high");
        }
    }

    #[test]
    fn equal_severity_keeps_input_order() {
        let incidents = [
            probe("degraded-1", IncidentType::Degraded, true),
            probe("major", IncidentType::MajorOutage, false),
            probe("degraded-2", IncidentType::Degraded, true),
        ];

        let names: Vec<&str> = prioritize(&incidents).iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["major", "degraded-1", "degraded-2"]);
    }

    #[test]
    fn resolved_incidents_are_skipped() {
        let incidents = [
            probe("old-major", IncidentType::MajorOutage, false),
            probe("degraded", IncidentType::Degraded, true),
        ];
        assert_eq!(find_active(&incidents).unwrap().name, "degraded");

        let all_resolved = [probe("old", IncidentType::MajorOutage, false)];
        assert!(find_active(&all_resolved).is_none());
    }

    #[test]
    fn no_incidents_resolves_to_operational() {
        let status = resolve(&[]);
        assert!(status.is_operational());
        assert_eq!(status.title(), "All systems operational");
        assert_eq!(status.message(), "No active incidents");
        assert_eq!(status.color(), "bg-operational");
        assert!(status.incident().is_none());
    }

    #[test]
    fn resolve_returns_enriched_incident() {
        let monitor = Monitor::new("m", "API", "2024-01-01T00:00:00Z");
        let incidents: Vec<EnrichedIncident> = [
            Incident::open("i-1", IncidentType::Degraded, "Slow", "2024-06-01T10:00:00Z"),
            Incident::open("i-2", IncidentType::PartialOutage, "Errors", "2024-06-01T11:00:00Z"),
        ]
        .iter()
        .map(|i| enrich(&monitor, i, &Utc).unwrap())
        .collect();

        let status = resolve(&incidents);
        assert_eq!(status.incident().map(|i| i.id.as_str()), Some("i-2"));
        assert_eq!(status.title(), "Partial service disruption");
        assert!(status.message().starts_with("API is currently affected"));
    }
}
