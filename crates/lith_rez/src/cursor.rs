//! Bounds-checked cursor over an in-memory directory block.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Width in bytes of the string pointer fields written by the authoring tool (32-bit `char*`).
pub const STRING_POINTER_SIZE: usize = 4;

/// A fixed-width little-endian value that can be read from a [`ByteCursor`].
pub trait Primitive: Sized {
    /// Number of bytes the value occupies in the archive
    const SIZE: usize;

    /// Decode the value from exactly [`Primitive::SIZE`] bytes
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty => $read:expr),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    ($read)(bytes)
                }
            }
        )*
    };
}

impl_primitive! {
    u8 => |b: &[u8]| b[0],
    i8 => |b: &[u8]| b[0] as i8,
    u16 => LittleEndian::read_u16,
    i16 => LittleEndian::read_i16,
    u32 => LittleEndian::read_u32,
    i32 => LittleEndian::read_i32,
    u64 => LittleEndian::read_u64,
}

/// A forward cursor that owns one block of archive bytes.
///
/// Every read is checked against the end of the buffer and fails with
/// [`Error::OutOfRange`] instead of running past it.
#[derive(Debug, Clone, Default)]
pub struct ByteCursor {
    data: Vec<u8>,
    position: usize,
}

impl ByteCursor {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes that have not been consumed yet
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Read a value without moving the cursor
    pub fn peek<T: Primitive>(&self) -> Result<T> {
        self.bytes(T::SIZE).map(T::from_le_slice)
    }

    /// Read a value and move past it
    pub fn read<T: Primitive>(&mut self) -> Result<T> {
        let value = self.peek::<T>()?;
        self.position += T::SIZE;
        Ok(value)
    }

    /// Read a string stored in place of a 32-bit string pointer.
    ///
    /// The field is either a leading NUL (empty string) or the string bytes themselves,
    /// cut at the first NUL inside the field. The cursor always moves by
    /// [`STRING_POINTER_SIZE`] bytes whatever the string length.
    pub fn read_string_pointer(&mut self) -> Result<String> {
        let raw = self.read_string_pointer_raw()?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Raw bytes of a string stored in place of a 32-bit string pointer.
    pub fn read_string_pointer_raw(&mut self) -> Result<&[u8]> {
        let start = self.position;
        let field = self.bytes(STRING_POINTER_SIZE)?;
        let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());

        self.position += STRING_POINTER_SIZE;
        Ok(&self.data[start..start + end])
    }

    /// Read a NUL terminated string and move past the terminator.
    pub fn read_string(&mut self) -> Result<String> {
        let raw = self.read_cstr()?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Read the raw bytes of a NUL terminated string and move past the terminator.
    pub fn read_cstr(&mut self) -> Result<&[u8]> {
        let start = self.position;
        let Some(len) = self.data[start..].iter().position(|&b| b == 0) else {
            return Err(self.out_of_range(self.remaining() + 1));
        };

        self.position += len + 1;
        Ok(&self.data[start..start + len])
    }

    /// Skip `count` bytes
    pub fn advance(&mut self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(self.out_of_range(count));
        }

        self.position += count;
        Ok(())
    }

    fn bytes(&self, count: usize) -> Result<&[u8]> {
        if count > self.remaining() {
            return Err(self.out_of_range(count));
        }

        Ok(&self.data[self.position..self.position + count])
    }

    fn out_of_range(&self, requested: usize) -> Error {
        Error::OutOfRange {
            offset: self.position as u64,
            requested: requested as u64,
            available: self.remaining() as u64,
        }
    }
}
