//! Settings of the `fazebook` binary, read from a RON file.
//!
//! ```ron
//! (
//!     sources: ["data/zoo.txt", "data/more.txt"],
//!     report: Some("network.ron"),
//!     show_progress: true,
//! )
//! ```
//!
//! Every field is optional. Without a config file nothing is ingested unless
//! sources are passed on the command line.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::social::error::{Error, Result};
use crate::social::ingest::{IngestOptions, Source};

pub const CONFIG_FILE: &str = "fazebook.ron";
pub const CONFIG_ENV: &str = "FAZEBOOK_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files to ingest, one unit each.
    pub sources: Vec<PathBuf>,
    /// Where to write the network report. No report when `None`.
    pub report: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            report: None,
            show_progress: true,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|error| Error::ConfigIo {
            path: path.to_path_buf(),
            error,
        })?;

        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: impl AsRef<Path>) -> Result<Self> {
        ron::from_str(text).map_err(|error| Error::Config {
            path: path.as_ref().to_path_buf(),
            error,
        })
    }

    /// Loads the file named by `FAZEBOOK_CONFIG`, or `fazebook.ron` in the
    /// working directory if it exists, or falls back to the defaults.
    ///
    /// A missing file is only an error when it was named explicitly.
    pub fn discover() -> Result<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::load(PathBuf::from(path));
        }

        if fs::metadata(CONFIG_FILE).is_ok() {
            Self::load(CONFIG_FILE)
        } else {
            debug!("no {CONFIG_FILE} found, using defaults");
            Ok(Self::default())
        }
    }

    #[must_use]
    pub fn sources(&self) -> Vec<Source> {
        self.sources.iter().cloned().map(Source::from).collect()
    }

    #[must_use]
    #[inline]
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            show_progress: self.show_progress,
        }
    }
}
