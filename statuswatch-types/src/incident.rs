//! Incidents - recorded disruptions of a single monitor.

use std::fmt;
use std::str::FromStr;

/// Severity of an incident.
///
/// The enumeration is closed: every variant has a display configuration in
/// the status engine, and anything else on the wire is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IncidentType {
    MajorOutage,
    PartialOutage,
    Degraded,
}

impl IncidentType {
    /// Severity order, most severe first.
    pub const PRIORITY_ORDER: [IncidentType; 3] = [
        IncidentType::MajorOutage,
        IncidentType::PartialOutage,
        IncidentType::Degraded,
    ];

    /// Position in [`IncidentType::PRIORITY_ORDER`]; lower is more severe.
    pub fn priority(self) -> usize {
        match self {
            IncidentType::MajorOutage => 0,
            IncidentType::PartialOutage => 1,
            IncidentType::Degraded => 2,
        }
    }

    /// The wire representation (`major_outage`, `partial_outage`, `degraded`).
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentType::MajorOutage => "major_outage",
            IncidentType::PartialOutage => "partial_outage",
            IncidentType::Degraded => "degraded",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a severity string is not part of [`IncidentType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIncidentType(pub String);

impl fmt::Display for UnknownIncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown incident type: {}", self.0)
    }
}

impl std::error::Error for UnknownIncidentType {}

impl FromStr for IncidentType {
    type Err = UnknownIncidentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major_outage" => Ok(IncidentType::MajorOutage),
            "partial_outage" => Ok(IncidentType::PartialOutage),
            "degraded" => Ok(IncidentType::Degraded),
            other => Err(UnknownIncidentType(other.to_string())),
        }
    }
}

/// Lifecycle of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IncidentStatus {
    Open,
    Resolved,
}

impl IncidentStatus {
    pub fn is_open(self) -> bool {
        self == IncidentStatus::Open
    }
}

/// A disruption affecting one monitor.
///
/// `ended_at` is `None` while the incident is open. Timestamps are ISO 8601
/// strings exactly as the server sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Incident {
    pub id: String,
    /// Free-text description written by the monitoring worker.
    pub message: String,
    /// Severity as sent on the wire; see [`Incident::severity`].
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub status: IncidentStatus,
    pub created_at: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ended_at: Option<String>,
}

impl Incident {
    /// Create an open incident.
    pub fn open(
        id: impl Into<String>,
        kind: IncidentType,
        message: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            kind: kind.as_str().to_string(),
            status: IncidentStatus::Open,
            created_at: created_at.into(),
            ended_at: None,
        }
    }

    /// Create a resolved incident.
    pub fn resolved(
        id: impl Into<String>,
        kind: IncidentType,
        message: impl Into<String>,
        created_at: impl Into<String>,
        ended_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            kind: kind.as_str().to_string(),
            status: IncidentStatus::Resolved,
            created_at: created_at.into(),
            ended_at: Some(ended_at.into()),
        }
    }

    /// Parse the wire severity into the closed [`IncidentType`] enumeration.
    pub fn severity(&self) -> Result<IncidentType, UnknownIncidentType> {
        self.kind.parse()
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}
