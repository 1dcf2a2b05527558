use clap::Args;
use itertools::Itertools;
use lith_rez::{extract::DEFAULT_CHUNK_SIZE, ArchiveSession, ExtractOptions};
use miette::{miette, Context, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

#[derive(Args)]
pub struct ExtractArgs {
    /// Input REZ files, directories are searched for `.rez` files
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Keep files that already exist in the target instead of replacing them
    #[arg(long, default_value_t = false)]
    no_clobber: bool,

    /// Write DTX textures exactly as stored
    #[arg(long, default_value_t = false)]
    no_dtx_patch: bool,

    /// Number of bytes copied per step
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let archives: Vec<PathBuf> = self
            .paths
            .iter()
            .map(|p| find_archives(p))
            .flatten_ok()
            .try_collect()?;
        if archives.is_empty() {
            return Err(miette!("no rez archives found"));
        }

        std::fs::create_dir_all(&self.directory)
            .into_diagnostic()
            .context(format!("creating {}", &self.directory.display()))?;

        let options = ExtractOptions::builder()
            .chunk_size(self.chunk_size)
            .patch_dtx(!self.no_dtx_patch)
            .skip_existing(self.no_clobber)
            .build();
        let report = ArchiveSession::new(options).extract(&archives, &self.directory);

        let total = report.total();
        info!(
            archives = report.outcomes.len(),
            written = total.written,
            failed = total.failed,
            bytes = total.bytes,
            "finished extracting into {}",
            self.directory.display()
        );

        if !report.is_success() {
            let failed = report.failed().map(|o| o.path.display()).join(", ");
            return Err(miette!(
                "unable to extract {} of {} archives: {failed}",
                report.failed().count(),
                report.outcomes.len()
            ));
        }

        Ok(())
    }
}

/// `path` itself, or every `.rez` file below it when it is a directory
fn find_archives(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_ok(|e| e.file_type().is_file() && is_rez(e.path()))
        .map_ok(|e| e.into_path())
        .collect::<std::result::Result<Vec<_>, _>>()
        .into_diagnostic()
        .context(format!("searching {}", path.display()))
}

fn is_rez(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("rez"))
}
