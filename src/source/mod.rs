//! Data source abstraction for fetching the component tree.
//!
//! The refresh scheduler only knows the [`StatusSource`] trait; where the
//! groups, monitors and incidents come from (the status API, a JSON file, an
//! in-process channel) is up to the implementation.

mod channel;
mod file;
mod http;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::{HttpSource, HttpSourceBuilder};

use std::fmt::Debug;

use async_trait::async_trait;
use statuswatch_types::Component;

use crate::error::SourceError;

/// Trait for fetching the current component tree.
///
/// # Example
///
/// ```
/// use statuswatch::{FileSource, StatusSource};
///
/// # tokio_test::block_on(async {
/// let source = FileSource::new("status.json");
/// match source.fetch_status().await {
///     Ok(components) => println!("Got {} components", components.len()),
///     Err(e) => eprintln!("{}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait StatusSource: Send + Sync + Debug {
    /// Fetch the full tree. Transport and decoding failures are returned, not retried.
    async fn fetch_status(&self) -> Result<Vec<Component>, SourceError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
