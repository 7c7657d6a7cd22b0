use std::path::PathBuf;

use thiserror::Error;

use crate::social::directive::DirectiveKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Raised by [`WeightedDirectedGraph`](crate::social::graph::WeightedDirectedGraph)
/// operations. Absent vertices and edges are not errors, only missing arguments are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("missing `{parameter}` argument")]
    InvalidArgument { parameter: &'static str },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read source `{source_name}`: {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("`{directive}` in source `{source_name}` expects {expected} argument(s), found {found}")]
    MissingArgument {
        source_name: String,
        directive: DirectiveKind,
        expected: usize,
        found: usize,
    },

    #[error("could not start {units} ingestion unit(s): {error}")]
    Workers {
        units: usize,
        #[source]
        error: rayon::ThreadPoolBuildError,
    },

    #[error("could not read config `{}`: {error}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("invalid config `{}`: {error}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        error: ron::error::SpannedError,
    },

    #[error("could not write report `{}`: {error}", .path.display())]
    ReportIo {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("could not serialize report: {0}")]
    Report(#[from] ron::Error),
}
