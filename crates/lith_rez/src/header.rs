//! Decoding of the leading REZ archive header.
//!
//! Two layouts exist. Both start with three text blocks separated by sentinel byte pairs and
//! closed by an end-of-file sentinel. The first sentinel pair selects the layout:
//!
//! | Layout      | Pair 1  | Pair 2  | Pair 3  | EOF    | Versions |
//! |-------------|---------|---------|---------|--------|----------|
//! | Plain       | `\r\n`  | `\r\n`  | `\r\n`  | `0x1A` | 1, 2     |
//! | Checksummed | `&#`    | `!"`    | `%'`    | `*`    | 1        |
//!
//! The checksummed layout carries a self check between the EOF sentinel and the format
//! version. In the plain layout a version 2 archive has 7 reserved bytes in front of the
//! version field.

use std::io::{Read, Seek, SeekFrom};

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, instrument};

use crate::error::{FormatError, IntegrityError, Result};

/// Length of the file type and user title text blocks
pub const LABEL_SIZE: usize = 60;

/// Length of the numeral text fields of the checksum block
pub const ENCODE_SIZE: usize = 32;

/// Value the head and tail bytes are XORed with to produce their detect counterparts
pub const CHECKSUM_XOR: u8 = 0x11;

/// Value the encode numeral is XORed with to produce the detect numeral
pub const ENCODE_XOR: i32 = 0x16B4423;

/// Reserved bytes in front of the version field of plain version 2 archives
pub const V2_RESERVED_SIZE: u64 = 7;

struct Sentinels {
    pairs: [[u8; 2]; 3],
    eof: u8,
}

const PLAIN: Sentinels = Sentinels {
    pairs: [[b'\r', b'\n'], [b'\r', b'\n'], [b'\r', b'\n']],
    eof: 0x1A,
};

const CHECKSUMMED: Sentinels = Sentinels {
    pairs: [[b'&', b'#'], [b'!', b'"'], [b'%', b'\'']],
    eof: b'*',
};

const PAIR_FIELDS: [[&str; 2]; 3] = [["cr1", "lf1"], ["cr2", "lf2"], ["cr3", "lf3"]];

/// Format version stored in the header
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormatVersion {
    V1 = 1,
    V2 = 2,
}

/// Self check carried by the checksummed header layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChecksum {
    pub head: u8,
    pub encode: String,
    pub tail: u8,
    pub detect_head: u8,
    pub detect_encode: String,
    pub detect_tail: u8,
}

/// Header layout selected by the sentinel bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderVariant {
    Plain,
    Checksummed(HeaderChecksum),
}

/// Location of the root directory block
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[br(little)]
pub struct RootDirectory {
    /// Offset from the beginning of the archive
    pub position: u32,

    /// Size of the root block in bytes
    pub size: u32,
}

/// Bookkeeping fields following the root directory in version 1 archives
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[br(little)]
pub struct HeaderTrailer {
    pub root_time: u32,
    pub next_write_pos: u32,
    pub time: u32,
    pub largest_key_ary: u32,
    pub largest_dir_name_size: u32,
    pub largest_rez_name_size: u32,
    pub largest_comment_size: u32,

    #[br(map = |flag: u8| flag != 0)]
    pub is_sorted: bool,
}

#[derive(BinRead, Debug, Clone, PartialEq, Eq)]
#[br(little)]
struct RawChecksum {
    head: u8,
    encode: [u8; ENCODE_SIZE],
    tail: u8,
    detect_head: u8,
    detect_encode: [u8; ENCODE_SIZE],
    detect_tail: u8,
}

impl RawChecksum {
    fn verify(self) -> core::result::Result<HeaderChecksum, IntegrityError> {
        if self.detect_head != self.head ^ CHECKSUM_XOR {
            return Err(IntegrityError::Head {
                head: self.head,
                detect: self.detect_head,
            });
        }

        let encode = c_string(&self.encode);
        let detect_encode = c_string(&self.detect_encode);
        let expected = (parse_decimal(&encode) ^ ENCODE_XOR).to_string();
        if detect_encode != expected {
            return Err(IntegrityError::Encode {
                encode,
                detect: detect_encode,
                expected,
            });
        }

        if self.detect_tail != self.tail ^ CHECKSUM_XOR {
            return Err(IntegrityError::Tail {
                tail: self.tail,
                detect: self.detect_tail,
            });
        }

        Ok(HeaderChecksum {
            head: self.head,
            encode,
            tail: self.tail,
            detect_head: self.detect_head,
            detect_encode,
            detect_tail: self.detect_tail,
        })
    }
}

/// REZ archive header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RezHeader {
    /// File type label, trailing spaces removed
    pub file_type: String,

    /// User title label, trailing spaces removed
    pub user_title: String,

    pub variant: HeaderVariant,

    pub version: FormatVersion,

    pub root: RootDirectory,

    /// Only decoded for version 1 archives, the remaining version 2 fields are opaque
    pub trailer: Option<HeaderTrailer>,
}

impl RezHeader {
    /// Decode and validate the header at the current position of `reader`.
    ///
    /// The reader is left positioned after the last decoded field.
    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let cr1 = reader.read_u8()?;
        let sentinels = match cr1 {
            b'\r' => &PLAIN,
            b'&' => &CHECKSUMMED,
            found => {
                return Err(FormatError::Sentinel {
                    field: "cr1",
                    found,
                }
                .into())
            }
        };
        expect_sentinel(reader, "lf1", sentinels.pairs[0][1])?;

        let file_type = read_label(reader)?;
        expect_pair(reader, sentinels, 1)?;

        let user_title = read_label(reader)?;
        expect_pair(reader, sentinels, 2)?;

        expect_sentinel(reader, "eof", sentinels.eof)?;

        let (variant, version) = if sentinels.eof == CHECKSUMMED.eof {
            let checksum = RawChecksum::read(reader)?.verify()?;

            let found = reader.read_u32::<LittleEndian>()?;
            if found != FormatVersion::V1 as u32 {
                return Err(FormatError::UnsupportedVersion { found }.into());
            }

            (HeaderVariant::Checksummed(checksum), FormatVersion::V1)
        } else {
            (HeaderVariant::Plain, read_plain_version(reader)?)
        };
        debug!(?version, "decoded header layout");

        let root = RootDirectory::read(reader)?;
        let trailer = match version {
            FormatVersion::V1 => Some(HeaderTrailer::read(reader)?),
            FormatVersion::V2 => None,
        };

        Ok(Self {
            file_type,
            user_title,
            variant,
            version,
            root,
            trailer,
        })
    }

    /// Whether the header carried the checksum block
    pub fn is_checksummed(&self) -> bool {
        matches!(self.variant, HeaderVariant::Checksummed(_))
    }
}

/// A version 1 archive stores its version right after the EOF sentinel, a version 2 archive
/// stores it after the reserved bytes.
fn read_plain_version<R: Read + Seek>(reader: &mut R) -> Result<FormatVersion> {
    let offset = reader.stream_position()?;

    if reader.read_u32::<LittleEndian>()? == FormatVersion::V1 as u32 {
        return Ok(FormatVersion::V1);
    }

    reader.seek(SeekFrom::Start(offset + V2_RESERVED_SIZE))?;
    match reader.read_u32::<LittleEndian>()? {
        2 => Ok(FormatVersion::V2),
        found => Err(FormatError::UnsupportedVersion { found }.into()),
    }
}

fn expect_pair<R: Read>(reader: &mut R, sentinels: &Sentinels, index: usize) -> Result<()> {
    let [cr, lf] = PAIR_FIELDS[index];
    expect_sentinel(reader, cr, sentinels.pairs[index][0])?;
    expect_sentinel(reader, lf, sentinels.pairs[index][1])
}

fn expect_sentinel<R: Read>(reader: &mut R, field: &'static str, expected: u8) -> Result<()> {
    let found = reader.read_u8()?;
    if found != expected {
        return Err(FormatError::Sentinel { field, found }.into());
    }
    Ok(())
}

fn read_label<R: Read>(reader: &mut R) -> Result<String> {
    let mut label = [0u8; LABEL_SIZE];
    reader.read_exact(&mut label)?;

    let end = label
        .iter()
        .rposition(|&b| b != b' ')
        .map_or(0, |last| last + 1);
    Ok(String::from_utf8_lossy(&label[..end]).into_owned())
}

fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Parse the leading decimal integer of `text` the way C's `atol` does, yielding 0 when there
/// are no digits. Overflow wraps.
fn parse_decimal(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, digit| {
            acc.wrapping_mul(10).wrapping_add((digit - b'0') as i32)
        });

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}
