//! Low-level byte order and safe reading/writing utilities for index decoding.
//!
//! This module provides bounds-checked reading and writing of the fixed-width integers used by
//! the binary index format. All multi-byte values in the format are stored big-endian, so only
//! the big-endian flavour is exposed.
//!
//! # Key Components
//!
//! - [`crate::file::io::IndexIO`] - Trait defining byte conversions for primitive types
//! - [`crate::file::io::read_be`] / [`crate::file::io::read_be_at`] - Bounds-checked reads
//! - [`crate::file::io::write_be_at`] - Bounds-checked writes with auto-advance
//! - [`crate::file::io::write_packed_u32_at`] / [`crate::file::io::packed_u32_size`] - The
//!   7-bit group encoding used for variable-length counts
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use annodex::file::io::{read_be_at, write_be_at};
//!
//! let mut data = [0u8; 6];
//! let mut offset = 0;
//! write_be_at(&mut data, &mut offset, 0xBABE_1F15_u32)?;
//! write_be_at(&mut data, &mut offset, 1_u16)?;
//!
//! offset = 0;
//! let magic: u32 = read_be_at(&data, &mut offset)?;
//! let version: u16 = read_be_at(&data, &mut offset)?;
//! assert_eq!((magic, version), (0xBABE_1F15, 1));
//! # Ok::<(), annodex::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All functions return [`crate::Error::OutOfBounds`] if there are insufficient bytes in the
//! buffer to complete the operation.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading and writing operations.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait IndexIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_index_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl IndexIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_index_io!(u8 => 1, u16 => 2, u32 => 4, u64 => 8);

/// Safely reads a value of type `T` in big-endian byte order from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too short.
pub fn read_be<T: IndexIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Safely reads a value of type `T` in big-endian byte order at `offset`, advancing it.
///
/// # Arguments
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the read position; advanced by `size_of::<T>()`
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `offset + size_of::<T>()` exceeds the buffer.
pub fn read_be_at<T: IndexIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };

    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}

/// Safely writes a value of type `T` in big-endian byte order at `offset`, advancing it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit into the buffer.
pub fn write_be_at<T: IndexIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_be_bytes();
    let bytes = bytes.as_ref();

    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(OutOfBounds);
    };

    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;

    Ok(())
}

/// Number of bytes the packed (7-bit group) encoding of `value` occupies.
#[must_use]
pub fn packed_u32_size(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

/// Writes `value` using the packed encoding: 7 bits per byte, least significant group first,
/// high bit set on every byte except the last.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the encoding does not fit into the buffer.
pub fn write_packed_u32_at(data: &mut [u8], offset: &mut usize, value: u32) -> Result<()> {
    let mut remaining = value;
    loop {
        // Truncation to the low 7 bits is the point of the mask
        #[allow(clippy::cast_possible_truncation)]
        let group = (remaining & 0x7F) as u8;
        remaining >>= 7;

        if remaining == 0 {
            return write_be_at(data, offset, group);
        }

        write_be_at(data, offset, group | 0x80)?;
    }
}
