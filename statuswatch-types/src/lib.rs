//! # statuswatch-types
//!
//! Wire types for the status endpoint consumed by statuswatch. These are the
//! shapes returned by `GET /api/v1/status`: a list of top-level components,
//! each either a group of monitors or a bare monitor, with every monitor
//! carrying its recent incidents.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: the types work without any serialization framework
//! - **Optional serialization**: enable the `serde` feature for JSON support
//! - **Lossless on bad records**: timestamps and severities stay strings on the
//!   wire so one malformed incident never fails decoding of the whole payload
//!
//! ## Example
//!
//! ```rust
//! use statuswatch_types::{Component, Group, Incident, IncidentType, Monitor};
//!
//! let api = Monitor::new("m-1", "API", "2024-05-01T00:00:00Z").incident(Incident::open(
//!     "i-1",
//!     IncidentType::MajorOutage,
//!     "Requests are failing",
//!     "2024-06-14T08:30:00Z",
//! ));
//! let web = Monitor::new("m-2", "Website", "2024-05-01T00:00:00Z");
//!
//! let components = vec![
//!     Component::Group(Group::new("g-1", "Backend").monitor(api)),
//!     Component::Monitor(web),
//! ];
//!
//! assert_eq!(components.iter().flat_map(Component::monitors).count(), 2);
//! ```

mod component;
mod incident;
mod response;

pub use component::*;
pub use incident::*;
pub use response::*;
