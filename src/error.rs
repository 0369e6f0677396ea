//! Error types for the status engine, data sources and scheduler.

use thiserror::Error;

/// Errors raised while enriching a single incident.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnrichError {
    /// A timestamp on the record could not be parsed. Only this record is affected.
    #[error("Invalid {field} timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The severity has no display configuration.
    #[error("Unknown incident type: {0}")]
    UnknownIncidentType(String),
}

impl EnrichError {
    /// Whether the error must abort the whole aggregation.
    ///
    /// Malformed timestamps are bad data and the record is skipped; an unknown
    /// severity means code and data disagree.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EnrichError::UnknownIncidentType(_))
    }
}

impl From<statuswatch_types::UnknownIncidentType> for EnrichError {
    fn from(err: statuswatch_types::UnknownIncidentType) -> Self {
        EnrichError::UnknownIncidentType(err.0)
    }
}

/// Errors that can occur when fetching the component tree.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The API answered with a non-success status.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Reading a local source failed.
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

/// A single fetch-aggregate-publish cycle failed.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Aggregate(#[from] EnrichError),
}

/// Misuse of the refresh scheduler.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Refresh scheduler is already running")]
    AlreadyRunning,
    #[error("Refresh scheduler is still stopping")]
    Stopping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unknown_type_is_fatal() {
        let bad_time = EnrichError::InvalidTimestamp {
            field: "created_at",
            value: "nope".to_string(),
            reason: "Unknown timestamp format: nope".to_string(),
        };
        assert!(!bad_time.is_fatal());
        assert!(EnrichError::UnknownIncidentType("maintenance".to_string()).is_fatal());
    }

    #[test]
    fn api_error_message() {
        let err = SourceError::Api {
            status: 503,
            message: "Service unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Service unavailable (status 503)");
    }
}
