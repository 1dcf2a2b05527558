//! Base types for the entries stored in REZ directory blocks.

use std::ffi::OsString;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Discriminates what a [`BlockHeader`] describes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    /// A resource whose payload lives at the header's position
    Resource = 0,

    /// A directory whose own block lives at the header's position
    Directory = 1,
}

impl TryFrom<u32> for EntryType {
    type Error = u32;

    fn try_from(value: u32) -> core::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(EntryType::Resource),
            1 => Ok(EntryType::Directory),
            other => Err(other),
        }
    }
}

/// Header shared by every entry of a directory block
///
/// All fields are stored as little endian 32-bit integers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// The kind of entry that follows
    pub kind: EntryType,

    /// Offset from the beginning of the archive of the payload or nested block
    pub position: u32,

    /// Size in bytes of the payload or nested block
    pub size: u32,

    /// Modification time as written by the authoring tool
    pub time: u32,
}

impl BlockHeader {
    /// Read a block header, rejecting unknown entry kinds.
    pub fn read(cursor: &mut ByteCursor) -> Result<Self> {
        let offset = cursor.position();
        let kind = cursor.read::<u32>()?;
        let kind =
            EntryType::try_from(kind).map_err(|kind| Error::InvalidBlockType { kind, offset })?;

        Ok(Self {
            kind,
            position: cursor.read()?,
            size: cursor.read()?,
            time: cursor.read()?,
        })
    }
}

/// A single extractable resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Location of the payload inside the archive
    pub header: BlockHeader,

    /// Numeric identifier assigned by the authoring tool
    pub id: u32,

    /// Type tag used as the file extension, already un-reversed (`LMX` becomes `XML`)
    pub extension: String,

    /// Raw bytes of the type tag, in file extension order
    pub extension_raw: Box<[u8]>,

    /// Number of 32-bit keys attached to this resource
    pub num_keys: u32,

    pub name: String,

    /// Raw bytes of the name, to be used when `name` was incorrectly decoded
    pub name_raw: Box<[u8]>,

    pub description: String,
}

impl ResourceRecord {
    /// Read the resource specific fields that follow `header`.
    ///
    /// The key array is skipped.
    pub fn read(header: BlockHeader, cursor: &mut ByteCursor) -> Result<Self> {
        let id = cursor.read::<u32>()?;
        let mut extension_raw = cursor.read_string_pointer_raw()?.to_vec();
        extension_raw.reverse();
        let num_keys = cursor.read::<u32>()?;
        let name_raw: Box<[u8]> = cursor.read_cstr()?.into();
        let description = cursor.read_string()?;

        let keys_len = (num_keys as usize)
            .checked_mul(std::mem::size_of::<u32>())
            .ok_or(Error::OutOfRange {
                offset: cursor.position() as u64,
                requested: u64::MAX,
                available: cursor.remaining() as u64,
            })?;
        cursor.advance(keys_len)?;

        Ok(Self {
            header,
            id,
            extension: String::from_utf8_lossy(&extension_raw).into_owned(),
            extension_raw: extension_raw.into(),
            num_keys,
            name: String::from_utf8_lossy(&name_raw).into_owned(),
            name_raw,
            description,
        })
    }

    /// Name of the file this resource is extracted to, `name` or `name.extension`
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    /// Raw bytes of [`ResourceRecord::file_name`]
    pub fn file_name_raw(&self) -> Vec<u8> {
        let mut raw = self.name_raw.to_vec();
        if !self.extension_raw.is_empty() {
            raw.push(b'.');
            raw.extend_from_slice(&self.extension_raw);
        }
        raw
    }

    /// File name used on disk.
    ///
    /// Built from the raw bytes on unix, so names in legacy code pages stay distinct. Other
    /// platforms use the lossily decoded name.
    pub fn os_file_name(&self) -> OsString {
        os_string(self.file_name_raw(), || self.file_name())
    }

    /// Offset of the payload from the start of the archive
    pub fn data_start(&self) -> u64 {
        self.header.position as u64
    }

    /// Size of the payload in bytes
    pub fn size(&self) -> u64 {
        self.header.size as u64
    }
}

/// A directory and the resources listed directly inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Location of this directory's own block
    pub header: BlockHeader,

    pub name: String,

    /// Raw bytes of the name, to be used when `name` was incorrectly decoded
    pub name_raw: Box<[u8]>,

    /// Resources in stream order
    pub resources: Vec<ResourceRecord>,

    /// Index of the parent directory in the flat tree, `None` for roots.
    ///
    /// Always lower than the index of this directory.
    pub owner: Option<usize>,
}

impl DirectoryRecord {
    pub fn new(header: BlockHeader, name_raw: &[u8], owner: Option<usize>) -> Self {
        Self {
            header,
            name: String::from_utf8_lossy(name_raw).into_owned(),
            name_raw: name_raw.into(),
            resources: Vec::new(),
            owner,
        }
    }

    /// Directory name used on disk, see [`ResourceRecord::os_file_name`]
    pub fn os_name(&self) -> OsString {
        os_string(self.name_raw.to_vec(), || self.name.clone())
    }
}

#[cfg(unix)]
fn os_string(raw: Vec<u8>, _lossy: impl FnOnce() -> String) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(raw)
}

#[cfg(not(unix))]
fn os_string(_raw: Vec<u8>, lossy: impl FnOnce() -> String) -> OsString {
    OsString::from(lossy())
}
