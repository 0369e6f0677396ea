//! The status endpoint response envelope.

use crate::Component;

/// Body of `GET /api/v1/status`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusResponse {
    pub components: Vec<Component>,
    /// Server-side generation time, when provided.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub last_updated: Option<String>,
}

impl StatusResponse {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            components,
            last_updated: None,
        }
    }

    /// Number of monitors across all components.
    pub fn monitor_count(&self) -> usize {
        self.components.iter().map(|c| c.monitors().len()).sum()
    }

    /// Number of incidents across all monitors.
    pub fn incident_count(&self) -> usize {
        self.components
            .iter()
            .flat_map(Component::monitors)
            .map(|m| m.incidents.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Group, Incident, IncidentType, Monitor};

    #[test]
    fn counts_span_groups_and_bare_monitors() {
        let response = StatusResponse::new(vec![
            Component::Group(
                Group::new("g", "Backend")
                    .monitor(Monitor::new("a", "API", "2024-01-01T00:00:00Z").incident(
                        Incident::open("i", IncidentType::Degraded, "slow", "2024-01-02T00:00:00Z"),
                    ))
                    .monitor(Monitor::new("b", "Worker", "2024-01-01T00:00:00Z")),
            ),
            Component::Monitor(Monitor::new("c", "Website", "2024-01-01T00:00:00Z")),
        ]);

        assert_eq!(response.monitor_count(), 3);
        assert_eq!(response.incident_count(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn last_updated_is_optional() {
        let response: StatusResponse = serde_json::from_str(r#"{"components": []}"#).unwrap();
        assert!(response.components.is_empty());
        assert!(response.last_updated.is_none());
    }
}
