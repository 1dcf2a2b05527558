//! Extraction of decoded resources to the filesystem.

use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use bon::Builder;
use tracing::{debug, error, info, instrument, warn};

use crate::dtx;
use crate::error::{Error, Result};
use crate::read::RezFile;
use crate::tree::{plain_component, RezTree};
use crate::types::{DirectoryRecord, ResourceRecord};

/// Payload bytes copied per step, 10 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Smallest chunk size used, large enough to hold a DTX header's version fields
pub const MIN_CHUNK_SIZE: usize = 16;

/// Options for how resources should be extracted
#[derive(Debug, Clone, Copy, Builder)]
pub struct ExtractOptions {
    /// Number of payload bytes read and written per step
    #[builder(default = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Fix misplaced version fields of DTX textures, see [`crate::dtx`]
    #[builder(default = true)]
    pub patch_dtx: bool,

    /// Leave files that already exist in the output directory untouched, counting them as
    /// failures. Existing files are replaced otherwise.
    #[builder(default)]
    pub skip_existing: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Counters collected while extracting one archive
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Directories created or found in the output
    pub directories: usize,

    /// Resources written completely
    pub written: usize,

    /// Resources that could not be written
    pub failed: usize,

    /// Payload bytes written
    pub bytes: u64,
}

/// Streams resource payloads out of an archive into files.
///
/// One chunk buffer is reused for every resource.
#[derive(Debug)]
pub struct ResourceExtractor {
    options: ExtractOptions,
    buffer: Vec<u8>,
}

impl ResourceExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            buffer: Vec::new(),
        }
    }

    /// Extract every directory of `tree` below `output`.
    ///
    /// A directory whose path cannot be created is skipped together with its resources, a
    /// resource that cannot be written is skipped. Both are logged and counted as failures.
    #[instrument(skip_all, fields(output = %output.display()))]
    pub fn extract<R: Read + Seek>(
        &mut self,
        tree: &RezTree,
        source: &mut R,
        output: &Path,
    ) -> ExtractSummary {
        let mut summary = ExtractSummary::default();

        for (index, directory) in tree.directories().iter().enumerate() {
            info!(directory = %directory.name, "extracting directory");

            let target = match create_directory(tree, index, output) {
                Ok(target) => target,
                Err(err) => {
                    error!(directory = %directory.name, "skipping directory: {err}");
                    summary.failed += directory.resources.len();
                    continue;
                }
            };
            summary.directories += 1;

            self.extract_directory(directory, source, &target, &mut summary);
        }

        summary
    }

    fn extract_directory<R: Read + Seek>(
        &mut self,
        directory: &DirectoryRecord,
        source: &mut R,
        target: &Path,
        summary: &mut ExtractSummary,
    ) {
        for resource in &directory.resources {
            match self.extract_resource(source, resource, target) {
                Ok(bytes) => {
                    summary.written += 1;
                    summary.bytes += bytes;
                }
                Err(err) => {
                    error!(
                        directory = %directory.name,
                        resource = %resource.name,
                        "unable to extract resource: {err}"
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    /// Write one resource into `directory`, returning the number of bytes written.
    pub fn extract_resource<R: Read + Seek>(
        &mut self,
        source: &mut R,
        resource: &ResourceRecord,
        directory: &Path,
    ) -> Result<u64> {
        if resource.name.is_empty() {
            warn!(id = resource.id, "resource has an empty name");
        }

        let file_name = resource.os_file_name();
        let path = directory.join(plain_component(&file_name)?);
        debug!(path = %path.display(), size = resource.size(), "writing resource");

        let io_error = |source: std::io::Error| Error::ResourceIo {
            path: path.clone(),
            source,
        };

        let mut out = self.create_file(&path).map_err(io_error)?;
        let mut payload = RezFile::new(source, resource)?;

        let chunk_size = self.options.chunk_size.max(MIN_CHUNK_SIZE) as u64;
        let patch_dtx = self.options.patch_dtx && dtx::is_dtx(&resource.extension);

        let mut written = 0u64;
        while written < resource.size() {
            let step = chunk_size.min(resource.size() - written) as usize;
            if self.buffer.len() < step {
                self.buffer.resize(step, 0);
            }
            let chunk = &mut self.buffer[..step];

            payload.read_exact(chunk)?;
            if written == 0 && patch_dtx && dtx::patch_version_field(chunk) {
                debug!(path = %path.display(), "swapped dtx version field");
            }

            out.write_all(chunk).map_err(io_error)?;
            written += step as u64;
        }
        out.flush().map_err(io_error)?;

        Ok(written)
    }

    fn create_file(&self, path: &Path) -> std::io::Result<File> {
        if self.options.skip_existing {
            File::create_new(path)
        } else {
            File::create(path)
        }
    }
}

fn create_directory(tree: &RezTree, index: usize, output: &Path) -> Result<PathBuf> {
    let target = output.join(tree.relative_path(index)?);
    fs::create_dir_all(&target).map_err(|source| Error::ResourceIo {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::extract::{ExtractOptions, ResourceExtractor, DEFAULT_CHUNK_SIZE};
    use crate::types::{BlockHeader, EntryType, ResourceRecord};

    fn resource(name: &str, extension: &str, position: u32, size: u32) -> ResourceRecord {
        ResourceRecord {
            header: BlockHeader {
                kind: EntryType::Resource,
                position,
                size,
                time: 0,
            },
            id: 1,
            extension: extension.into(),
            extension_raw: extension.as_bytes().into(),
            num_keys: 0,
            name: name.into(),
            name_raw: name.as_bytes().into(),
            description: String::new(),
        }
    }

    #[test]
    fn default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(options.patch_dtx);
        assert!(!options.skip_existing);
    }

    #[test]
    fn extract_in_small_chunks() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let payload: Vec<u8> = (0..100u8).collect();
        let mut archive = vec![0xAA; 8];
        archive.extend(&payload);

        let mut extractor =
            ResourceExtractor::new(ExtractOptions::builder().chunk_size(1).build());
        let written = extractor.extract_resource(
            &mut Cursor::new(archive),
            &resource("data", "BIN", 8, 100),
            dir.path(),
        )?;

        assert_eq!(written, 100);
        assert_eq!(std::fs::read(dir.path().join("data.BIN"))?, payload);

        Ok(())
    }

    #[test]
    fn patch_only_first_chunk_of_dtx() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut payload = vec![0u8; 32];
        payload[4..8].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        payload[8..12].copy_from_slice(&[0x05, 0x06, 0x07, 0x08]);
        // same layout again inside the second chunk
        payload[20..24].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        payload[24..28].copy_from_slice(&[0x05, 0x06, 0x07, 0x08]);

        let mut extractor =
            ResourceExtractor::new(ExtractOptions::builder().chunk_size(16).build());
        extractor.extract_resource(
            &mut Cursor::new(payload.clone()),
            &resource("wall", "dtx", 0, 32),
            dir.path(),
        )?;

        let mut expected = payload;
        expected[4..8].copy_from_slice(&[0x05, 0x06, 0x07, 0x08]);
        expected[8..12].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(std::fs::read(dir.path().join("wall.dtx"))?, expected);

        Ok(())
    }

    #[test]
    fn patch_can_be_disabled() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut payload = vec![0u8; 16];
        payload[8] = 0xFE;

        let mut extractor =
            ResourceExtractor::new(ExtractOptions::builder().patch_dtx(false).build());
        extractor.extract_resource(
            &mut Cursor::new(payload.clone()),
            &resource("wall", "DTX", 0, 16),
            dir.path(),
        )?;

        assert_eq!(std::fs::read(dir.path().join("wall.DTX"))?, payload);

        Ok(())
    }

    #[test]
    fn overwrite_by_default() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("a.TXT"), b"old")?;

        let mut extractor = ResourceExtractor::new(ExtractOptions::default());
        extractor.extract_resource(
            &mut Cursor::new(b"new".to_vec()),
            &resource("a", "TXT", 0, 3),
            dir.path(),
        )?;
        assert_eq!(std::fs::read(dir.path().join("a.TXT"))?, b"new");

        let mut extractor =
            ResourceExtractor::new(ExtractOptions::builder().skip_existing(true).build());
        let err = extractor
            .extract_resource(
                &mut Cursor::new(b"xyz".to_vec()),
                &resource("a", "TXT", 0, 3),
                dir.path(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::ResourceIo { .. }));
        assert_eq!(std::fs::read(dir.path().join("a.TXT"))?, b"new");

        Ok(())
    }

    #[test]
    fn reject_escaping_names() {
        let dir = tempfile::tempdir().unwrap();

        let mut extractor = ResourceExtractor::new(ExtractOptions::default());
        let err = extractor
            .extract_resource(
                &mut Cursor::new(vec![0u8; 4]),
                &resource("../evil", "", 0, 4),
                dir.path(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsafeName { .. }));
    }

    #[test]
    fn truncated_payload_fails() {
        let dir = tempfile::tempdir().unwrap();

        let mut extractor = ResourceExtractor::new(ExtractOptions::default());
        let err = extractor
            .extract_resource(
                &mut Cursor::new(vec![0u8; 4]),
                &resource("short", "", 0, 8),
                dir.path(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::IOError(_)));
    }
}
