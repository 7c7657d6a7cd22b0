use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, error, info, warn};

use crate::social::directive::Directives;
use crate::social::error::{Error, Result};
use crate::social::network::SocialNetwork;
use crate::social::utils::get_pb_if;

/// Where an ingestion unit reads its directives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    /// In-memory records, e.g. text handed over by another component.
    Inline { name: String, contents: String },
}

impl Source {
    #[must_use]
    pub fn inline(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self::Inline {
            name: name.into(),
            contents: contents.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline { name, .. } => name.clone(),
        }
    }

    fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        match self {
            Self::File(path) => {
                let file = File::open(path).map_err(|error| Error::Io {
                    source_name: self.name(),
                    error,
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
            Self::Inline { contents, .. } => Ok(Box::new(contents.as_bytes())),
        }
    }
}

impl From<PathBuf> for Source {
    #[inline]
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for Source {
    #[inline]
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<String> for Source {
    #[inline]
    fn from(path: String) -> Self {
        Self::File(path.into())
    }
}

impl From<&str> for Source {
    #[inline]
    fn from(path: &str) -> Self {
        Self::File(path.into())
    }
}

/// Lifecycle of one ingestion unit: `Pending -> Parsing -> Done | Failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitState {
    #[default]
    Pending,
    Parsing,
    Done,
    Failed,
}

/// What one unit did with its source.
///
/// Directives applied before a failure stay applied, `applied` counts them.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: String,
    pub state: UnitState,
    pub applied: usize,
    pub error: Option<Error>,
}

impl SourceOutcome {
    fn new(source: String) -> Self {
        Self {
            source,
            state: UnitState::Pending,
            applied: 0,
            error: None,
        }
    }

    #[must_use]
    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == UnitState::Done
    }
}

/// Outcomes of one batch, in the order the sources were given.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl IngestReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_done())
    }

    pub fn failed(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_done())
    }

    #[must_use]
    pub fn directives_applied(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.applied).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    pub show_progress: bool,
}

fn parse_into(
    network: &SocialNetwork,
    source: &Source,
    outcome: &mut SourceOutcome,
) -> Result<()> {
    let reader = source.open()?;

    for directive in Directives::new(reader, outcome.source.as_str()) {
        network.apply(&directive?);
        outcome.applied += 1;
    }

    Ok(())
}

fn run_unit(network: &SocialNetwork, source: &Source) -> SourceOutcome {
    let mut outcome = SourceOutcome::new(source.name());

    outcome.state = UnitState::Parsing;
    debug!(source = %outcome.source, "parsing source");

    match parse_into(network, source, &mut outcome) {
        Ok(()) => {
            outcome.state = UnitState::Done;
            debug!(source = %outcome.source, applied = outcome.applied, "source done");
        }
        Err(error) => {
            outcome.state = UnitState::Failed;
            warn!(
                source = %outcome.source,
                applied = outcome.applied,
                %error,
                "source failed, continuing with the others"
            );
            outcome.error = Some(error);
        }
    }

    outcome
}

impl SocialNetwork {
    /// Ingests every source concurrently and waits for all of them.
    ///
    /// Returns `false` when there is no source list at all, or when the
    /// ingestion threads could not be started. Failing sources are logged and
    /// skipped, see [`ingest_with`](Self::ingest_with) for the per-source
    /// outcomes.
    pub fn ingest(&self, sources: Option<&[Source]>) -> bool {
        let Some(sources) = sources else {
            return false;
        };

        match self.ingest_with(sources, &IngestOptions::default()) {
            Ok(_) => true,
            Err(err) => {
                error!(%err, "ingestion did not start");
                false
            }
        }
    }

    /// Runs every source as its own unit and waits for all of them.
    ///
    /// Each batch gets a rayon pool with one thread per source, so all units
    /// are live at once no matter how many cores there are. A unit blocked on
    /// a slow stream never holds back its siblings.
    pub fn ingest_with(
        &self,
        sources: &[Source],
        options: &IngestOptions,
    ) -> Result<IngestReport> {
        let units = sources.len().max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(units)
            .thread_name(|i| format!("ingest-{i}"))
            .build()
            .map_err(|error| Error::Workers { units, error })?;

        let pb = get_pb_if(options.show_progress, sources.len() as u64, "Ingesting sources");

        let outcomes = crate::time_it!(at once | "ingesting sources" => pool.install(|| {
            sources
                .par_iter()
                .with_max_len(1)
                .progress_with(pb)
                .map(|source| run_unit(self, source))
                .collect::<Vec<_>>()
        }));

        let report = IngestReport { outcomes };
        info!(
            sources = report.outcomes.len(),
            failed = report.failed().count(),
            directives = report.directives_applied(),
            users = self.user_count(),
            "ingestion finished"
        );

        Ok(report)
    }
}
