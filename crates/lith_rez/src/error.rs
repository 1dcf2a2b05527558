//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is an invalid rez archive
    #[error("file is an invalid rez archive")]
    InvalidArchive(#[from] FormatError),

    /// header checksum does not match
    #[error("header checksum does not match")]
    HeaderIntegrity(#[from] IntegrityError),

    /// block at {position:#x} has a size of zero
    #[error("block at {position:#x} has a size of zero")]
    InvalidBlockSize { position: u32 },

    /// invalid block type {kind} at block offset {offset}
    #[error("invalid block type {kind} at block offset {offset}")]
    InvalidBlockType { kind: u32, offset: usize },

    /// resource entry at block offset {offset} has no owning directory
    #[error("resource entry at block offset {offset} has no owning directory")]
    OrphanResource { offset: usize },

    /// directory block at {position:#x} refers back to itself
    #[error("directory block at {position:#x} refers back to itself")]
    RecursiveBlock { position: u32 },

    /// directory block at {position:#x} is nested {depth} blocks deep
    #[error("directory block at {position:#x} is nested {depth} blocks deep")]
    BlockTooDeep { position: u32, depth: usize },

    /// read of {requested} bytes at offset {offset} exceeds the {available} available bytes
    #[error("read of {requested} bytes at offset {offset} exceeds the {available} available bytes")]
    OutOfRange {
        offset: u64,
        requested: u64,
        available: u64,
    },

    /// name {name:?} is not a plain path component
    #[error("name {name:?} is not a plain path component")]
    UnsafeName { name: String },

    /// unable to write {path}: {source}
    #[error("unable to write {}: {source}", path.display())]
    ResourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),
}

/// Error type to provide further information when the header layout is not recognised
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// unexpected sentinel byte {found:#04x} for {field}
    #[error("unexpected sentinel byte {found:#04x} for {field}")]
    Sentinel { field: &'static str, found: u8 },

    /// unsupported file format version {found}
    #[error("unsupported file format version {found}")]
    UnsupportedVersion { found: u32 },
}

/// Error type describing which checksum field failed validation
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum IntegrityError {
    /// invalid head {head}, detect {detect}
    #[error("invalid head {head}, detect {detect}")]
    Head { head: u8, detect: u8 },

    /// invalid encode {encode:?}, detect {detect:?}, expected {expected:?}
    #[error("invalid encode {encode:?}, detect {detect:?}, expected {expected:?}")]
    Encode {
        encode: String,
        detect: String,
        expected: String,
    },

    /// invalid tail {tail}, detect {detect}
    #[error("invalid tail {tail}, detect {detect}")]
    Tail { tail: u8, detect: u8 },
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
