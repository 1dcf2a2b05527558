//! Extraction of a batch of archives into one output directory.

use std::path::{Path, PathBuf};

use tracing::{error, info, info_span};

use crate::error::Result;
use crate::extract::{ExtractOptions, ExtractSummary};
use crate::read::RezArchive;

/// Result of processing one archive
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub path: PathBuf,
    pub result: Result<ExtractSummary>,
}

/// Results of every archive of a session, in input order
#[derive(Debug, Default)]
pub struct SessionReport {
    pub outcomes: Vec<ArchiveOutcome>,
}

impl SessionReport {
    /// Archives that were decoded and extracted
    pub fn succeeded(&self) -> impl Iterator<Item = (&Path, &ExtractSummary)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|s| (o.path.as_path(), s)))
    }

    /// Archives that could not be decoded
    pub fn failed(&self) -> impl Iterator<Item = &ArchiveOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// Whether every archive was decoded
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Sum of the summaries of every successful archive
    pub fn total(&self) -> ExtractSummary {
        self.succeeded()
            .fold(ExtractSummary::default(), |mut total, (_, s)| {
                total.directories += s.directories;
                total.written += s.written;
                total.failed += s.failed;
                total.bytes += s.bytes;
                total
            })
    }
}

/// Opens, decodes and extracts archives one after the other.
///
/// An archive that fails to open or decode is logged and recorded, the remaining archives are
/// still processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveSession {
    options: ExtractOptions,
}

impl ArchiveSession {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract every archive of `archives` into `output`.
    pub fn extract<P: AsRef<Path>>(&self, archives: &[P], output: &Path) -> SessionReport {
        let mut report = SessionReport::default();

        for path in archives {
            let path = path.as_ref();
            let name = path
                .file_stem()
                .map_or_else(|| path.to_string_lossy(), |stem| stem.to_string_lossy());
            let span = info_span!("archive", name = %name);
            let _enter = span.enter();

            info!("extracting {}", path.display());
            let result = self.extract_archive(path, output);
            match &result {
                Ok(summary) => info!(
                    directories = summary.directories,
                    written = summary.written,
                    failed = summary.failed,
                    bytes = summary.bytes,
                    "extracted archive"
                ),
                Err(err) => error!("unable to extract archive: {err}"),
            }

            report.outcomes.push(ArchiveOutcome {
                path: path.to_path_buf(),
                result,
            });
        }

        report
    }

    /// Decode a single archive and extract it into `output`.
    pub fn extract_archive(&self, path: &Path, output: &Path) -> Result<ExtractSummary> {
        let mut archive = RezArchive::open(path)?;
        if archive.tree().is_empty() {
            info!("archive contains no directories");
        }

        Ok(archive.extract(output, self.options))
    }
}
