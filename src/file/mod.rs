//! Raw buffer access for binary indices.
//!
//! This module owns the immutable byte sequence an index is decoded from, and the low-level
//! primitives used to read it.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - Owner of the raw bytes, backed by memory or a memory-mapped file
//! - [`crate::file::Backend`] - Trait abstracting over the storage of the raw bytes
//! - [`crate::file::parser::Parser`] - Bounds-checked cursor over the raw bytes
//! - [`crate::file::io`] - Big-endian integer and packed-count primitives
//!
//! Once constructed, a [`crate::file::File`] never changes; every view handed out by the
//! decoder borrows from it.

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{Error::OutOfBounds, Result};
use memory::Memory;
use physical::Physical;

/// Storage abstraction for the raw bytes of an index.
///
/// Implementations must be immutable after construction; the decoder relies on the returned
/// slices staying identical for the lifetime of the backend.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// The immutable byte sequence an index is decoded from.
///
/// # Examples
///
/// ```rust,no_run
/// use annodex::File;
///
/// let file = File::from_mem(vec![0xBA, 0xBE, 0x1F, 0x15]);
/// assert_eq!(file.len(), 4);
/// assert_eq!(file.data_slice(0, 2)?, &[0xBA, 0xBE]);
/// # Ok::<(), annodex::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
}

impl File {
    /// Memory-maps the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, or
    /// [`crate::Error::Error`] if it cannot be mapped.
    pub fn from_file(path: impl AsRef<Path>) -> Result<File> {
        let input = Physical::new(path)?;

        Ok(File {
            data: Box::new(input),
        })
    }

    /// Takes ownership of an in-memory buffer.
    #[must_use]
    pub fn from_mem(data: Vec<u8>) -> File {
        File {
            data: Box::new(Memory::new(data)),
        }
    }

    /// Returns the total size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the complete raw buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the buffer.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        if len == 0 && offset <= self.len() {
            return Ok(&[]);
        }

        match self.data.data_slice(offset, len) {
            Ok(slice) => Ok(slice),
            Err(_) => Err(OutOfBounds),
        }
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_mem() {
        let file = File::from_mem(vec![0x01, 0x02, 0x03]);

        assert_eq!(file.len(), 3);
        assert!(!file.is_empty());
        assert_eq!(file.data(), &[0x01, 0x02, 0x03]);
        assert_eq!(file.data_slice(1, 2).unwrap(), &[0x02, 0x03]);
        assert!(file.data_slice(2, 2).is_err());
        assert!(file.data_slice(3, 0).unwrap().is_empty());
    }

    #[test]
    fn from_file() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(&[0xBA, 0xBE, 0x1F, 0x15]).unwrap();
        temp.flush().unwrap();

        let file = File::from_file(temp.path()).unwrap();
        assert_eq!(file.len(), 4);
        assert_eq!(file.data_slice(0, 4).unwrap(), &[0xBA, 0xBE, 0x1F, 0x15]);
    }

    #[test]
    fn from_file_missing() {
        let result = File::from_file("/nonexistent/annodex/index.bin");
        assert!(matches!(result, Err(crate::Error::FileError(_))));
    }
}
