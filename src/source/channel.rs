//! Channel-based data source.
//!
//! Serves whatever component tree was last pushed through a tokio watch
//! channel. Useful for embedding, where the host application already holds the
//! data, and for tests.

use async_trait::async_trait;
use statuswatch_types::Component;
use tokio::sync::watch;

use super::StatusSource;
use crate::error::SourceError;

/// A data source that returns the latest tree sent on a channel.
///
/// # Example
///
/// ```
/// use statuswatch::ChannelSource;
///
/// // Create a channel pair
/// let (tx, source) = ChannelSource::create("embedded");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Vec<Component>>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - A description of where the data comes from
    pub fn new(receiver: watch::Receiver<Vec<Component>>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
        }
    }

    /// Create a channel pair, starting from an empty tree.
    ///
    /// Returns (sender, source) where the sender is used to push new trees.
    pub fn create(source_description: &str) -> (watch::Sender<Vec<Component>>, Self) {
        let (tx, rx) = watch::channel(Vec::new());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

#[async_trait]
impl StatusSource for ChannelSource {
    async fn fetch_status(&self) -> Result<Vec<Component>, SourceError> {
        // A dropped sender still leaves the last value readable
        Ok(self.receiver.borrow().clone())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
