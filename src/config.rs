//! Layered settings.
//!
//! Lowest to highest precedence: built-in defaults, an optional TOML file,
//! `STATUSWATCH_*` environment variables (nested keys joined by `__`, e.g.
//! `STATUSWATCH_SOURCE__URL`), then command-line flags.
//!
//! ```toml
//! refresh_interval_secs = 30
//!
//! [source]
//! url = "https://status.example.com"
//! timeout_secs = 5
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::SourceError;
use crate::source::{FileSource, HttpSource, StatusSource};

const ENV_PREFIX: &str = "STATUSWATCH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub source: SourceSettings,
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceSettings {
    /// Base URL of the status API. Takes precedence over `file`.
    pub url: Option<String>,
    pub file: PathBuf,
    pub timeout_secs: u64,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub refresh_interval_secs: Option<u64>,
}

/// Where the component tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Http { url: String, timeout: Duration },
    File(PathBuf),
}

impl Settings {
    /// Load settings from all layers.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_from(config_path, environment(), overrides)
    }

    fn load_from(
        config_path: Option<&Path>,
        env: Environment,
        overrides: &Overrides,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("source.file", "status.json")?
            .set_default("source.timeout_secs", 10)?
            .set_default("refresh_interval_secs", 20)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let mut settings: Settings = builder.add_source(env).build()?.try_deserialize()?;

        // A file given on the command line beats a configured URL
        if let Some(file) = &overrides.file {
            settings.source.file = file.clone();
            settings.source.url = None;
        }
        if let Some(url) = &overrides.url {
            settings.source.url = Some(url.clone());
        }
        if let Some(secs) = overrides.refresh_interval_secs {
            settings.refresh_interval_secs = secs;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be at least 1");
        }
        if self.source.timeout_secs == 0 {
            bail!("source.timeout_secs must be at least 1");
        }
        if matches!(&self.source.url, Some(url) if url.trim().is_empty()) {
            bail!("source.url is empty");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn source_kind(&self) -> SourceKind {
        match &self.source.url {
            Some(url) => SourceKind::Http {
                url: url.clone(),
                timeout: Duration::from_secs(self.source.timeout_secs),
            },
            None => SourceKind::File(self.source.file.clone()),
        }
    }

    /// Construct the configured data source.
    pub fn build_source(&self) -> Result<Arc<dyn StatusSource>, SourceError> {
        Ok(match self.source_kind() {
            SourceKind::Http { url, timeout } => Arc::new(
                HttpSource::builder()
                    .endpoint(url)
                    .timeout(timeout)
                    .build()?,
            ),
            SourceKind::File(path) => Arc::new(FileSource::new(path)),
        })
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
