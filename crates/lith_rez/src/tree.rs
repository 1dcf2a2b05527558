//! Recursive decoding of directory blocks into a flat directory tree.

use std::ffi::OsStr;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use tracing::{instrument, trace};

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::types::{BlockHeader, DirectoryRecord, EntryType, ResourceRecord};

/// Deepest chain of nested directory blocks that is decoded
pub const MAX_BLOCK_DEPTH: usize = 128;

/// Every directory of an archive in decode order.
///
/// Directories refer to their parent by index, a nested block is decoded completely before the
/// entries following it in the parent block, so a parent always precedes its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RezTree {
    directories: Vec<DirectoryRecord>,
}

impl RezTree {
    /// Decode the block at `position` and every block nested inside it.
    ///
    /// `source` is borrowed for the whole decode, its position is restored around every nested
    /// block and is undefined once this returns.
    pub fn decode<R: Read + Seek>(source: &mut R, position: u32, size: u32) -> Result<Self> {
        let mut decoder = TreeDecoder::new(source)?;
        decoder.decode_block(position, size)?;

        Ok(Self {
            directories: decoder.directories,
        })
    }

    /// Number of directories in the tree
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    pub fn directories(&self) -> &[DirectoryRecord] {
        &self.directories
    }

    pub fn get(&self, index: usize) -> Option<&DirectoryRecord> {
        self.directories.get(index)
    }

    /// Total number of resources over all directories
    pub fn resource_count(&self) -> usize {
        self.directories.iter().map(|d| d.resources.len()).sum()
    }

    /// Iterate over a directory and its parents, nearest first.
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(index),
        }
    }

    /// Directory names from the root down to the directory at `index`.
    ///
    /// Empty names do not contribute a segment.
    pub fn segments(&self, index: usize) -> Vec<&str> {
        let mut segments: Vec<&str> = self
            .ancestors(index)
            .map(|directory| directory.name.as_str())
            .filter(|name| !name.is_empty())
            .collect();
        segments.reverse();
        segments
    }

    /// Raw directory names from the root down to the directory at `index`.
    pub fn segments_raw(&self, index: usize) -> Vec<&[u8]> {
        let mut segments: Vec<&[u8]> = self
            .ancestors(index)
            .map(|directory| &*directory.name_raw)
            .filter(|name| !name.is_empty())
            .collect();
        segments.reverse();
        segments
    }

    /// Relative filesystem path of the directory at `index`.
    ///
    /// Fails when a segment is not a plain path component and could escape the output root.
    pub fn relative_path(&self, index: usize) -> Result<PathBuf> {
        let mut names: Vec<_> = self
            .ancestors(index)
            .filter(|directory| !directory.name_raw.is_empty())
            .map(DirectoryRecord::os_name)
            .collect();
        names.reverse();

        let mut path = PathBuf::new();
        for name in &names {
            path.push(plain_component(name)?);
        }
        Ok(path)
    }
}

/// Check that `name` maps to exactly one normal path component.
pub(crate) fn plain_component(name: &OsStr) -> Result<&Path> {
    let path = Path::new(name);
    let mut components = path.components();
    let separator = name
        .as_encoded_bytes()
        .iter()
        .any(|&b| matches!(b, b'/' | b'\\'));

    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !separator => Ok(path),
        _ => Err(Error::UnsafeName {
            name: name.to_string_lossy().into_owned(),
        }),
    }
}

/// Iterator returned by [`RezTree::ancestors`]
pub struct Ancestors<'a> {
    tree: &'a RezTree,
    next: Option<usize>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a DirectoryRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let directory = self.tree.directories.get(self.next?)?;
        self.next = directory.owner;
        Some(directory)
    }
}

struct TreeDecoder<'a, R: Read + Seek> {
    source: &'a mut R,
    source_len: u64,
    directories: Vec<DirectoryRecord>,
    /// Positions of the blocks currently being decoded, outermost first
    open_blocks: Vec<u32>,
}

impl<'a, R: Read + Seek> TreeDecoder<'a, R> {
    fn new(source: &'a mut R) -> Result<Self> {
        let start = source.stream_position()?;
        let source_len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(start))?;

        Ok(Self {
            source,
            source_len,
            directories: Vec::new(),
            open_blocks: Vec::new(),
        })
    }

    fn read_block(&mut self, position: u32, size: u32) -> Result<ByteCursor> {
        if position as u64 + size as u64 > self.source_len {
            return Err(Error::OutOfRange {
                offset: position as u64,
                requested: size as u64,
                available: self.source_len.saturating_sub(position as u64),
            });
        }

        let mut data = vec![0u8; size as usize];
        self.source.seek(SeekFrom::Start(position as u64))?;
        self.source.read_exact(&mut data)?;

        Ok(ByteCursor::new(data))
    }

    #[instrument(level = "debug", skip(self))]
    fn decode_block(&mut self, position: u32, size: u32) -> Result<()> {
        if size == 0 {
            return Err(Error::InvalidBlockSize { position });
        }
        if self.open_blocks.contains(&position) {
            return Err(Error::RecursiveBlock { position });
        }
        if self.open_blocks.len() >= MAX_BLOCK_DEPTH {
            return Err(Error::BlockTooDeep {
                position,
                depth: self.open_blocks.len(),
            });
        }

        let mut cursor = self.read_block(position, size)?;
        let owner = self.directories.len().checked_sub(1);

        self.open_blocks.push(position);
        while cursor.has_remaining() {
            let offset = cursor.position();
            let header = BlockHeader::read(&mut cursor)?;

            match header.kind {
                EntryType::Resource => {
                    let resource = ResourceRecord::read(header, &mut cursor)?;
                    trace!(name = %resource.name, "decoded resource");

                    self.directories
                        .last_mut()
                        .ok_or(Error::OrphanResource { offset })?
                        .resources
                        .push(resource);
                }
                EntryType::Directory => {
                    let directory = DirectoryRecord::new(header, cursor.read_cstr()?, owner);
                    trace!(name = %directory.name, "decoded directory");
                    self.directories.push(directory);

                    if header.size != 0 {
                        let resume = self.source.stream_position()?;
                        self.decode_block(header.position, header.size)?;
                        self.source.seek(SeekFrom::Start(resume))?;
                    }
                }
            }
        }
        self.open_blocks.pop();

        Ok(())
    }
}
