//! File-based data source.
//!
//! Reads the component tree from a JSON file, either the API's response shape
//! (`{ "components": [...] }`) or a bare component array.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use statuswatch_types::{Component, StatusResponse};

use super::StatusSource;
use crate::error::SourceError;

/// A data source that reads the component tree from a JSON file.
///
/// The file is re-read on every fetch, so an external process can rewrite it
/// between refreshes.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatusSource for FileSource {
    async fn fetch_status(&self) -> Result<Vec<Component>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_components(&content)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

fn parse_components(content: &str) -> Result<Vec<Component>, SourceError> {
    if content.trim_start().starts_with('[') {
        Ok(serde_json::from_str(content)?)
    } else {
        let response: StatusResponse = serde_json::from_str(content)?;
        Ok(response.components)
    }
}
