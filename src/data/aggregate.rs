//! Status aggregation over the full component tree.
//!
//! [`aggregate_at`] is a pure transform: the same components and reference
//! instant always produce the same [`StatusView`].

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use statuswatch_types::{Component, IncidentType, Monitor};
use tracing::debug;

use super::history::{monitor_created_at, DayCell, HistoryBuilder, MonitorTimeline};
use super::incident::{enrich_all, EnrichedIncident};
use super::resolve::{resolve, CurrentStatus};
use crate::error::EnrichError;

/// One monitor's current status and day history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub id: String,
    pub name: String,
    pub current: CurrentStatus,
    pub history: Vec<DayCell>,
}

impl MonitorStatus {
    /// Day cell at `index`, `None` when out of range.
    pub fn day(&self, index: usize) -> Option<&DayCell> {
        self.history.get(index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatus {
    pub id: String,
    pub name: String,
    pub monitors: Vec<MonitorStatus>,
}

/// A top-level entry of the view, mirroring the input component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentStatus {
    Group(GroupStatus),
    Monitor(MonitorStatus),
}

impl ComponentStatus {
    pub fn id(&self) -> &str {
        match self {
            ComponentStatus::Group(g) => &g.id,
            ComponentStatus::Monitor(m) => &m.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ComponentStatus::Group(g) => &g.name,
            ComponentStatus::Monitor(m) => &m.name,
        }
    }

    pub fn monitors(&self) -> &[MonitorStatus] {
        match self {
            ComponentStatus::Group(g) => &g.monitors,
            ComponentStatus::Monitor(m) => std::slice::from_ref(m),
        }
    }
}

/// Monitor counts per current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub operational: usize,
    pub degraded: usize,
    pub partial_outage: usize,
    pub major_outage: usize,
}

impl StatusSummary {
    pub fn total(&self) -> usize {
        self.operational + self.degraded + self.partial_outage + self.major_outage
    }

    pub fn affected(&self) -> usize {
        self.total() - self.operational
    }
}

/// The enriched view model for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    /// Same order as the input components.
    pub components: Vec<ComponentStatus>,
    /// Every enriched incident, in component order.
    pub incidents: Vec<EnrichedIncident>,
    /// Page-wide current status across all monitors.
    pub current: CurrentStatus,
    pub generated_at: DateTime<Utc>,
}

impl StatusView {
    /// All monitors, flattened in display order.
    pub fn monitors(&self) -> impl Iterator<Item = &MonitorStatus> {
        self.components.iter().flat_map(ComponentStatus::monitors)
    }

    pub fn monitor_count(&self) -> usize {
        self.monitors().count()
    }

    pub fn summary(&self) -> StatusSummary {
        let mut summary = StatusSummary::default();
        for monitor in self.monitors() {
            match monitor.current.incident().map(|i| i.kind) {
                None => summary.operational += 1,
                Some(IncidentType::Degraded) => summary.degraded += 1,
                Some(IncidentType::PartialOutage) => summary.partial_outage += 1,
                Some(IncidentType::MajorOutage) => summary.major_outage += 1,
            }
        }
        summary
    }
}

/// Aggregate against the local clock and timezone.
pub fn aggregate(components: &[Component]) -> Result<StatusView, EnrichError> {
    aggregate_at(components, &Local::now())
}

/// Aggregate against a fixed reference instant; day bounds and formatting
/// use `now`'s timezone.
pub fn aggregate_at<Tz>(components: &[Component], now: &DateTime<Tz>) -> Result<StatusView, EnrichError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();

    // Groups contribute their monitors; groups do not nest.
    let flattened: Vec<&Monitor> = components.iter().flat_map(Component::monitors).collect();

    let mut per_monitor = Vec::with_capacity(flattened.len());
    for monitor in &flattened {
        per_monitor.push(enrich_all(monitor, &tz)?);
    }
    let incidents: Vec<EnrichedIncident> = per_monitor.iter().flatten().cloned().collect();

    // Matched by position, not id: the walk below visits monitors in the
    // same order as `flattened`.
    let mut own_incidents = per_monitor.iter().map(Vec::as_slice);
    let builder = HistoryBuilder::new(now.clone());
    let mut monitor_status = |monitor: &Monitor| {
        let own = own_incidents.next().unwrap_or_default();
        let timeline = MonitorTimeline {
            created_at: monitor_created_at(monitor, &tz),
            incidents: own,
        };
        MonitorStatus {
            id: monitor.id.clone(),
            name: monitor.name.clone(),
            current: resolve(own),
            history: builder.build(&[timeline]),
        }
    };

    let statuses: Vec<ComponentStatus> = components
        .iter()
        .map(|component| match component {
            Component::Group(group) => ComponentStatus::Group(GroupStatus {
                id: group.id.clone(),
                name: group.name.clone(),
                monitors: group.monitors.iter().map(&mut monitor_status).collect(),
            }),
            Component::Monitor(monitor) => ComponentStatus::Monitor(monitor_status(monitor)),
        })
        .collect();

    debug!(
        "Aggregated {} components, {} monitors, {} incidents",
        components.len(),
        flattened.len(),
        incidents.len()
    );

    Ok(StatusView {
        current: resolve(&incidents),
        components: statuses,
        incidents,
        generated_at: now.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use statuswatch_types::{Group, Incident};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(days: i64) -> String {
        (now() - Duration::days(days)).to_rfc3339()
    }

    fn sample() -> Vec<Component> {
        vec![
            Component::Group(
                Group::new("g-1", "Core")
                    .monitor(Monitor::new("api", "API", ago(40)).incident(Incident::open(
                        "i-1",
                        IncidentType::PartialOutage,
                        "Errors",
                        ago(1),
                    )))
                    .monitor(Monitor::new("db", "Database", ago(5))),
            ),
            Component::Monitor(Monitor::new("web", "Website", ago(90)).incident(
                Incident::resolved("i-2", IncidentType::MajorOutage, "Down", ago(3), ago(2)),
            )),
        ]
    }

    #[test]
    fn preserves_order_and_group_membership() {
        let view = aggregate_at(&sample(), &now()).unwrap();

        let ids: Vec<&str> = view.components.iter().map(ComponentStatus::id).collect();
        assert_eq!(ids, vec!["g-1", "web"]);
        let members: Vec<&str> = view.components[0]
            .monitors()
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(members, vec!["api", "db"]);
        assert_eq!(view.monitor_count(), 3);
    }

    #[test]
    fn group_members_keep_their_own_history() {
        let view = aggregate_at(&sample(), &now()).unwrap();
        let group = view.components[0].monitors();

        assert_eq!(group[0].day(29).unwrap().color(), "bg-partial-outage");
        assert_eq!(group[1].day(29).unwrap().color(), "bg-operational");
        // The database only exists for the last few days
        assert!(!group[1].day(0).unwrap().has_data());
        assert!(group[0].day(0).unwrap().has_data());
    }

    #[test]
    fn monitors_sharing_an_id_keep_their_own_incidents() {
        let components = vec![
            Component::Group(
                Group::new("g-1", "Core").monitor(Monitor::new("api", "API (eu)", ago(40)).incident(
                    Incident::open("i-1", IncidentType::MajorOutage, "Down", ago(1)),
                )),
            ),
            Component::Monitor(Monitor::new("api", "API (us)", ago(40))),
        ];
        let view = aggregate_at(&components, &now()).unwrap();

        let monitors: Vec<&MonitorStatus> = view.monitors().collect();
        assert_eq!(monitors[0].current.color(), "bg-major-outage");
        assert_eq!(monitors[0].day(29).unwrap().color(), "bg-major-outage");
        assert!(monitors[1].current.is_operational());
        assert_eq!(monitors[1].day(29).unwrap().color(), "bg-operational");
        assert_eq!(view.incidents.len(), 1);
        assert_eq!(view.summary().major_outage, 1);
    }

    #[test]
    fn resolved_incidents_colour_history_but_not_current() {
        let view = aggregate_at(&sample(), &now()).unwrap();
        let web = &view.components[1].monitors()[0];

        assert!(web.current.is_operational());
        assert_eq!(web.day(26).unwrap().color(), "bg-major-outage");
        assert_eq!(web.day(27).unwrap().color(), "bg-major-outage");
        assert_eq!(web.day(28).unwrap().color(), "bg-operational");
    }

    #[test]
    fn page_status_and_summary() {
        let view = aggregate_at(&sample(), &now()).unwrap();

        assert_eq!(view.incidents.len(), 2);
        assert_eq!(view.current.incident().map(|i| i.id.as_str()), Some("i-1"));
        assert_eq!(view.current.title(), "Partial service disruption");

        let summary = view.summary();
        assert_eq!(summary.operational, 2);
        assert_eq!(summary.partial_outage, 1);
        assert_eq!(summary.affected(), 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn scenario_major_outage_open_for_two_days() {
        let components = vec![Component::Monitor(
            Monitor::new("api", "API", ago(40)).incident(Incident::open(
                "i-1",
                IncidentType::MajorOutage,
                "Requests failing",
                ago(2),
            )),
        )];

        let view = aggregate_at(&components, &now()).unwrap();
        let api = &view.components[0].monitors()[0];

        // Opened two days ago: that day, yesterday and today.
        for index in 0..27 {
            assert_eq!(api.day(index).unwrap().color(), "bg-operational");
        }
        for index in 27..30 {
            assert_eq!(api.day(index).unwrap().color(), "bg-major-outage");
        }
        assert_eq!(api.current.incident().map(|i| i.id.as_str()), Some("i-1"));
    }

    #[test]
    fn day_lookup_fails_soft() {
        let view = aggregate_at(&sample(), &now()).unwrap();
        let api = &view.components[0].monitors()[0];

        assert_eq!(api.day(0).map(|d| d.index), Some(0));
        assert!(api.day(30).is_none());
        assert!(api.day(usize::MAX).is_none());
    }

    #[test]
    fn aggregate_is_idempotent() {
        let components = sample();
        assert_eq!(
            aggregate_at(&components, &now()).unwrap(),
            aggregate_at(&components, &now()).unwrap()
        );
    }

    #[test]
    fn unknown_type_fails_the_aggregation() {
        let mut odd = Incident::open("i-9", IncidentType::Degraded, "Window", ago(1));
        odd.kind = "maintenance".to_string();
        let components = vec![Component::Monitor(Monitor::new("api", "API", ago(40)).incident(odd))];

        let err = aggregate_at(&components, &now()).unwrap_err();
        assert_eq!(err, EnrichError::UnknownIncidentType("maintenance".to_string()));
    }

    #[test]
    fn empty_tree_is_operational() {
        let view = aggregate_at(&[], &now()).unwrap();
        assert!(view.components.is_empty());
        assert!(view.current.is_operational());
        assert_eq!(view.summary(), StatusSummary::default());
    }

    #[test]
    fn view_serializes_with_component_tags() {
        let view = aggregate_at(&sample(), &now()).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["components"][0]["type"], "group");
        assert_eq!(json["components"][1]["type"], "monitor");
        assert_eq!(json["current"]["state"], "incident");
        assert_eq!(json["components"][1]["history"].as_array().unwrap().len(), 30);
    }
}
