//! Types for reading REZ archives
//!

use std::{
    fmt::{self, Debug},
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use indexmap::{map::Entry, IndexMap};
use tracing::{instrument, warn};

use crate::{
    error::{Error, FileNotFoundError, Result},
    extract::{ExtractOptions, ExtractSummary, ResourceExtractor},
    header::RezHeader,
    tree::RezTree,
    types::ResourceRecord,
};

/// A struct for reading the payload of a single resource
pub struct RezFile<'a, R: Read + Seek> {
    resource: &'a ResourceRecord,
    reader: io::Take<&'a mut R>,
}

impl<R: Read + Seek> Debug for RezFile<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RezFile({:#?})", self.resource)
    }
}

impl<'a, R: Read + Seek> RezFile<'a, R> {
    /// Position `reader` at the payload of `resource` and limit it to the payload size
    pub(crate) fn new(reader: &'a mut R, resource: &'a ResourceRecord) -> Result<Self> {
        reader.seek(SeekFrom::Start(resource.data_start()))?;

        Ok(Self {
            resource,
            reader: reader.by_ref().take(resource.size()),
        })
    }

    /// Get the name of the resource, without extension
    pub fn name(&self) -> &str {
        &self.resource.name
    }

    /// Get the raw name of the resource
    ///
    /// Use this when `name` was incorrectly decoded, e.g. for names in legacy code pages.
    pub fn name_raw(&self) -> &[u8] {
        &self.resource.name_raw
    }

    /// Get the name the resource is extracted to
    ///
    /// # Warnings
    ///
    /// The name comes straight from the archive and may contain path separators or `..`.
    /// [`RezArchive::extract`] rejects such names, do the same before using it as a path.
    pub fn file_name(&self) -> String {
        self.resource.file_name()
    }

    pub fn extension(&self) -> &str {
        &self.resource.extension
    }

    pub fn description(&self) -> &str {
        &self.resource.description
    }

    pub fn id(&self) -> u32 {
        self.resource.id
    }

    /// Get the size of the resource, in bytes
    pub fn size(&self) -> u64 {
        self.resource.size()
    }

    /// Get the starting offset of the payload
    pub fn data_start(&self) -> u64 {
        self.resource.data_start()
    }

    pub fn record(&self) -> &ResourceRecord {
        self.resource
    }
}

impl<R: Read + Seek> Read for RezFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

#[derive(Debug, Clone)]
struct EntryLocation {
    directory: usize,
    resource: usize,
    path: Box<str>,
}

/// REZ archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_rez_contents(reader: impl Read + Seek) -> lith_rez::error::Result<()> {
///     let mut rez = lith_rez::RezArchive::new(reader)?;
///
///     for i in 0..rez.len() {
///         let mut file = rez.by_index(i)?;
///         println!("Filename: {}", file.file_name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct RezArchive<R> {
    reader: R,
    header: RezHeader,
    tree: RezTree,
    entries: IndexMap<Box<[u8]>, EntryLocation>,
}

impl<R> Debug for RezArchive<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RezArchive({:#?}, directories: {}, resources: {})",
            self.header,
            self.tree.len(),
            self.entries.len()
        )
    }
}

impl RezArchive<BufReader<File>> {
    /// Open the archive at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R> RezArchive<R> {
    pub fn header(&self) -> &RezHeader {
        &self.header
    }

    pub fn tree(&self) -> &RezTree {
        &self.tree
    }

    /// Total size of the resources in the archive, if it can be known.
    pub fn total_size(&self) -> Option<u128> {
        let mut total = 0u128;
        for directory in self.tree.directories() {
            for resource in &directory.resources {
                total = total.checked_add(resource.size() as u128)?;
            }
        }
        Some(total)
    }
}

impl<R: Read + Seek> RezArchive<R> {
    /// Read a REZ archive, decoding its header and complete directory tree.
    #[instrument(skip(reader), err)]
    pub fn new(mut reader: R) -> Result<RezArchive<R>> {
        reader.rewind()?;
        let header = RezHeader::read(&mut reader)?;
        let tree = RezTree::decode(&mut reader, header.root.position, header.root.size)?;
        let entries = Self::get_entries(&tree);

        Ok(RezArchive {
            reader,
            header,
            tree,
            entries,
        })
    }

    /// Number of resources contained in this REZ.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this REZ archive contains no resources
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the archive paths of all resources, `dir/sub/name.ext`.
    ///
    /// Paths that are not valid UTF-8 are decoded lossily and may repeat, see
    /// [`RezArchive::file_names_raw`].
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.path.as_ref())
    }

    /// Returns an iterator over the raw archive paths of all resources.
    pub fn file_names_raw(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.keys().map(|path| path.as_ref())
    }

    /// Get the index of a resource by archive path, if it's present.
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.index_for_name_raw(name.as_bytes())
    }

    /// Get the index of a resource by raw archive path, if it's present.
    pub fn index_for_name_raw(&self, name: &[u8]) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    /// Get the archive path of a resource, if it's present.
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.entries.get_index(index).map(|(_, e)| e.path.as_ref())
    }

    /// Search for a resource by archive path
    pub fn by_name(&mut self, name: &str) -> Result<RezFile<'_, R>> {
        let Some(index) = self.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained resource by index
    pub fn by_index(&mut self, file_number: usize) -> Result<RezFile<'_, R>> {
        let (_, entry) = self
            .entries
            .get_index(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;
        let resource = &self.tree.directories()[entry.directory].resources[entry.resource];

        RezFile::new(&mut self.reader, resource)
    }

    /// Extract every resource below `output`, mirroring the directory tree.
    ///
    /// Failures of single resources are logged and counted in the summary.
    pub fn extract(&mut self, output: &Path, options: ExtractOptions) -> ExtractSummary {
        ResourceExtractor::new(options).extract(&self.tree, &mut self.reader, output)
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Index every resource by raw archive path, the first of several equal paths wins.
    fn get_entries(tree: &RezTree) -> IndexMap<Box<[u8]>, EntryLocation> {
        let mut entries = IndexMap::with_capacity(tree.resource_count());
        for (directory, record) in tree.directories().iter().enumerate() {
            let mut prefix = tree.segments_raw(directory).join(&b'/');
            if !prefix.is_empty() {
                prefix.push(b'/');
            }

            for (resource, r) in record.resources.iter().enumerate() {
                let mut raw = prefix.clone();
                raw.extend(r.file_name_raw());
                let path: Box<str> = String::from_utf8_lossy(&raw).into();

                match entries.entry(raw.into_boxed_slice()) {
                    Entry::Occupied(_) => warn!(%path, "duplicate resource path"),
                    Entry::Vacant(e) => {
                        e.insert(EntryLocation {
                            directory,
                            resource,
                            path,
                        });
                    }
                }
            }
        }
        entries
    }
}
