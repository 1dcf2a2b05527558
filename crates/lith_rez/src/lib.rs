//! This library handles reading and extracting **REZ** archives used by *LithTech* games.
//!
//! # REZ Archive Format Documentation
//!
//! A REZ archive stores a tree of directories and resources. Every resource keeps a name, a
//! short type tag used as its file extension, and a description. REZ files are typically
//! identified with the `.rez` extension.
//!
//! ## File Structure
//!
//! A REZ file consists of a header, the resource payloads, and the directory blocks. The header
//! points to the root directory block, each directory entry points to its own nested block.
//!
//! ### Header
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Sentinel pair 1        | 2 bytes: `\r\n` (plain) or `&#` (checksummed)              |
//! | 0x0002         | File type              | 60 bytes: text padded with spaces                          |
//! | 0x003E         | Sentinel pair 2        | 2 bytes: `\r\n` (plain) or `!"` (checksummed)              |
//! | 0x0040         | User title             | 60 bytes: text padded with spaces                          |
//! | 0x007C         | Sentinel pair 3        | 2 bytes: `\r\n` (plain) or `%'` (checksummed)              |
//! | 0x007E         | EOF sentinel           | 1 byte: `0x1A` (plain) or `*` (checksummed)                |
//!
//! The checksummed layout continues with a self check:
//!
//! | Size (bytes) | Field          | Description                                                  |
//! |--------------|----------------|--------------------------------------------------------------|
//! | 1            | Head           | Any value                                                    |
//! | 32           | Encode         | Decimal numeral, NUL terminated                              |
//! | 1            | Tail           | Any value                                                    |
//! | 1            | Detect head    | `head ^ 0x11`                                                |
//! | 32           | Detect encode  | Decimal numeral of `encode ^ 0x16B4423`                      |
//! | 1            | Detect tail    | `tail ^ 0x11`                                                |
//!
//! Plain version 2 archives have 7 reserved bytes at this point instead. Then, for every
//! layout:
//!
//! | Size (bytes) | Field                    | Description                                        |
//! |--------------|--------------------------|----------------------------------------------------|
//! | 4            | File format version      | 1, or 2 for plain version 2 archives               |
//! | 4            | Root directory position  | Offset of the root directory block                 |
//! | 4            | Root directory size      | Size of the root directory block                   |
//!
//! Version 1 archives follow with the root directory time, the next write position, a time
//! stamp, the largest key array, directory name, resource name and comment sizes (4 bytes
//! each) and a 1-byte sorted flag.
//!
//! ### Directory Blocks
//!
//! A block is a sequence of entries with no terminator, it ends when its size is consumed.
//! Every entry starts with a block header:
//!
//! | Offset (bytes) | Field     | Description                                            |
//! |----------------|-----------|--------------------------------------------------------|
//! | 0x0000         | Type      | 4 bytes: `0` resource, `1` directory                   |
//! | 0x0004         | Position  | 4 bytes: offset of the payload or nested block         |
//! | 0x0008         | Size      | 4 bytes: size of the payload or nested block           |
//! | 0x000C         | Time      | 4 bytes: modification time                             |
//!
//! - **Directory**: followed by a NUL terminated name. A nonzero size means a nested block
//!   holding the directory's contents, which is decoded before the rest of the parent block.
//! - **Resource**: followed by a 4-byte id, a 4-byte field holding the type tag reversed
//!   (`LMX` for `XML`), a 4-byte key count, a NUL terminated name, a NUL terminated
//!   description and the keys (4 bytes each). A resource belongs to the directory decoded
//!   last.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.rez`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **DTX textures**: see [`dtx`] for the version field fix-up applied on extraction
//!

pub mod cursor;
pub mod dtx;
pub mod error;
pub mod extract;
pub mod header;
pub mod read;
pub mod session;
pub mod tree;
pub mod types;

pub use extract::{ExtractOptions, ExtractSummary, ResourceExtractor};
pub use header::RezHeader;
pub use read::RezArchive;
pub use session::{ArchiveSession, SessionReport};
pub use tree::RezTree;
