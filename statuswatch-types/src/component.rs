//! Components - the top-level entries of a status page.

use crate::Incident;

/// A monitored endpoint with its recent incidents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Monitor {
    pub id: String,
    pub name: String,
    /// When the monitor was created (ISO 8601). Days before this render as "no data".
    pub created_at: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub incidents: Vec<Incident>,
}

impl Monitor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: created_at.into(),
            incidents: Vec::new(),
        }
    }

    /// Append an incident.
    pub fn incident(mut self, incident: Incident) -> Self {
        self.incidents.push(incident);
        self
    }
}

/// A named collection of monitors shown together. Groups do not nest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub monitors: Vec<Monitor>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            monitors: Vec::new(),
        }
    }

    /// Append a monitor.
    pub fn monitor(mut self, monitor: Monitor) -> Self {
        self.monitors.push(monitor);
        self
    }
}

/// A top-level status page entry, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Component {
    Group(Group),
    Monitor(Monitor),
}

impl Component {
    pub fn id(&self) -> &str {
        match self {
            Component::Group(g) => &g.id,
            Component::Monitor(m) => &m.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Component::Group(g) => &g.name,
            Component::Monitor(m) => &m.name,
        }
    }

    /// The monitors this component contributes: a group's members, or the
    /// monitor itself.
    pub fn monitors(&self) -> &[Monitor] {
        match self {
            Component::Group(g) => &g.monitors,
            Component::Monitor(m) => std::slice::from_ref(m),
        }
    }
}
