//! Index header.
//!
//! Every index starts with a fixed 10-byte header:
//!
//! | Offset | Size | Field        |
//! |--------|------|--------------|
//! | 0      | 4    | `magic`      |
//! | 4      | 2    | `version`    |
//! | 6      | 4    | `class_count`|
//!
//! All values are big-endian.

use crate::{file::parser::Parser, Result};

/// Magic number identifying an annotation index.
pub const INDEX_MAGIC: u32 = 0xBABE_1F15;

/// The only format version this decoder understands.
pub const INDEX_VERSION: u16 = 1;

/// Size of the encoded header in bytes.
pub const HEADER_SIZE: usize = 10;

/// The decoded index header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    /// Magic number, always [`INDEX_MAGIC`] for a decoded header
    pub magic: u32,
    /// Format version
    pub version: u16,
    /// Number of class records following the name pool
    pub class_count: u32,
}

impl IndexHeader {
    /// Reads and validates the header at the parser's current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if fewer than [`HEADER_SIZE`] bytes remain, the
    /// magic does not match, or the version is not supported.
    pub fn read(parser: &mut Parser) -> Result<IndexHeader> {
        if parser.remaining() < HEADER_SIZE {
            return Err(malformed_error!(
                "Index is {} bytes long, the header alone needs {}",
                parser.remaining(),
                HEADER_SIZE
            ));
        }

        let magic = parser.read_be::<u32>()?;
        if magic != INDEX_MAGIC {
            return Err(malformed_error!("Invalid index magic - 0x{:08X}", magic));
        }

        let version = parser.read_be::<u16>()?;
        if version != INDEX_VERSION {
            return Err(malformed_error!("Unsupported index version - {}", version));
        }

        Ok(IndexHeader {
            magic,
            version,
            class_count: parser.read_be::<u32>()?,
        })
    }
}
