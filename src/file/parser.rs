//! Low-level byte stream parser for index decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser over an immutable byte slice. It is the only way the decoder touches raw bytes: every
//! read is bounds-checked, and the cursor only ever moves forward implicitly. Jumps to
//! referenced regions (interfaces, members, annotations) are always explicit
//! [`crate::file::parser::Parser::seek`] calls.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to specific position
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::remaining`] - Bytes left after the cursor
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_be`] - Read fixed-width integers (big-endian)
//! - [`crate::file::parser::Parser::read_packed_u32`] - Read a variable-length count
//! - [`crate::file::parser::Parser::read_prefixed_bytes`] - Read a length-prefixed byte span
//! - [`crate::file::parser::Parser::read_prefixed_string_utf8`] - Read a length-prefixed UTF-8 string
//!
//! # Usage Examples
//!
//! ```rust
//! use annodex::Parser;
//!
//! let data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
//! let mut parser = Parser::new(&data);
//!
//! let first = parser.read_be::<u32>()?;
//! assert_eq!(first, 0x0001_0203);
//!
//! parser.seek(6)?;
//! let last = parser.read_be::<u16>()?;
//! assert_eq!(last, 0x0607);
//! # Ok::<(), annodex::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, IndexIO},
    Error::OutOfBounds,
    Result,
};

/// A cursor over an immutable byte buffer.
///
/// `Parser` maintains an internal position and validates data availability before every read,
/// so truncated or forged input produces [`crate::Error::OutOfBounds`] instead of a panic. A
/// failed read leaves the position unchanged.
///
/// # Examples
///
/// ```rust,no_run
/// use annodex::Parser;
///
/// let data = [0x03, b'F', b'o', b'o'];
/// let mut parser = Parser::new(&data);
///
/// assert_eq!(parser.read_prefixed_string_utf8()?, "Foo");
/// assert!(!parser.has_more_data());
/// # Ok::<(), annodex::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the current position to the specified index.
    ///
    /// # Arguments
    /// * `pos` - The position to move the cursor to
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use annodex::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    ///
    /// parser.seek(2)?;
    /// assert_eq!(parser.pos(), 2);
    /// assert_eq!(parser.read_be::<u8>()?, 0x03);
    /// # Ok::<(), annodex::Error>(())
    /// ```
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Arguments
    /// * `step` - Amount of bytes to advance
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(OutOfBounds);
        }

        self.position += step;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Read a value of type `T` in big-endian format and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `T` would exceed the data length.
    pub fn read_be<T: IndexIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Read a variable-length count in the packed 7-bit group encoding.
    ///
    /// Each byte carries 7 bits of the value, least significant group first; the high bit
    /// signals that another byte follows. At most five bytes are consumed, and the fifth may
    /// only carry the remaining four bits of a `u32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the encoding is cut off by the buffer end, or
    /// [`crate::Error::Malformed`] if it does not fit in a `u32`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use annodex::Parser;
    /// let data = [0xAC, 0x02];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_packed_u32()?, 300);
    /// # Ok::<(), annodex::Error>(())
    /// ```
    pub fn read_packed_u32(&mut self) -> Result<u32> {
        let start = self.position;
        let mut value = 0u32;
        let mut shift = 0;

        loop {
            if self.position >= self.data.len() {
                self.position = start;
                return Err(OutOfBounds);
            }

            let byte = self.data[self.position];
            self.position += 1;

            if shift == 28 && (byte & 0xF0) != 0 {
                self.position = start;
                return Err(malformed_error!(
                    "Packed integer at offset {} exceeds u32 capacity",
                    start
                ));
            }

            value |= u32::from(byte & 0x7F) << shift;
            shift += 7;

            if (byte & 0x80) == 0 {
                return Ok(value);
            }
        }
    }

    /// Read a length-prefixed byte span without interpreting its contents.
    ///
    /// Returns the absolute start offset of the span together with the borrowed bytes, so
    /// callers can record the location and defer decoding.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the declared length exceeds the remaining bytes.
    pub fn read_prefixed_bytes(&mut self) -> Result<(usize, &'a [u8])> {
        let start = self.position;
        let length = self.read_packed_u32()? as usize;

        if length > self.remaining() {
            self.position = start;
            return Err(OutOfBounds);
        }

        let span_start = self.position;
        self.position += length;

        Ok((span_start, &self.data[span_start..self.position]))
    }

    /// Read a length-prefixed UTF-8 string, borrowing from the underlying buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the declared length exceeds the remaining bytes,
    /// or [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_prefixed_string_utf8(&mut self) -> Result<&'a str> {
        let (start, bytes) = self.read_prefixed_bytes()?;

        std::str::from_utf8(bytes).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                start + bytes.len(),
                e
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn navigation() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.len(), 5);
        assert!(!parser.is_empty());
        assert_eq!(parser.remaining(), 5);

        parser.advance_by(3).unwrap();
        assert_eq!(parser.pos(), 3);
        assert_eq!(parser.remaining(), 2);

        assert!(parser.advance_by(3).is_err());
        assert_eq!(parser.pos(), 3);

        parser.seek(0).unwrap();
        assert_eq!(parser.read_be::<u8>().unwrap(), 0x01);

        assert!(matches!(parser.seek(5), Err(Error::OutOfBounds)));
        assert!(parser.seek(usize::MAX).is_err());
    }

    #[test]
    fn read_be_values() {
        let data = [0xBA, 0xBE, 0x1F, 0x15, 0x00, 0x01];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_be::<u32>().unwrap(), 0xBABE_1F15);
        assert_eq!(parser.read_be::<u16>().unwrap(), 1);
        assert!(!parser.has_more_data());
        assert!(matches!(parser.read_be::<u8>(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn packed_u32() {
        let test_cases = vec![
            (vec![0x00], 0),
            (vec![0x7F], 0x7F),
            (vec![0x80, 0x01], 0x80),
            (vec![0xAC, 0x02], 300),
            (vec![0xFF, 0x7F], 0x3FFF),
            (vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F], u32::MAX),
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            assert_eq!(parser.read_packed_u32().unwrap(), expected);
            assert_eq!(parser.pos(), input.len());
        }
    }

    #[test]
    fn packed_u32_errors() {
        let mut parser = Parser::new(&[]);
        assert!(matches!(parser.read_packed_u32(), Err(Error::OutOfBounds)));

        // Continuation bit set on the last available byte
        let mut parser = Parser::new(&[0x80, 0x80]);
        assert!(matches!(parser.read_packed_u32(), Err(Error::OutOfBounds)));
        assert_eq!(parser.pos(), 0);

        // Fifth byte carries bits beyond 32
        let mut parser = Parser::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert!(matches!(
            parser.read_packed_u32(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn prefixed_strings() {
        let data = [0x03, b'F', b'o', b'o', 0x00, 0x02, b'a'];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_prefixed_string_utf8().unwrap(), "Foo");
        assert_eq!(parser.read_prefixed_string_utf8().unwrap(), "");

        // Declared length 2, only one byte left
        let before = parser.pos();
        assert!(matches!(
            parser.read_prefixed_bytes(),
            Err(Error::OutOfBounds)
        ));
        assert_eq!(parser.pos(), before);
    }

    #[test]
    fn prefixed_bytes_span() {
        let data = [0xFF, 0x02, 0xC3, 0x28];
        let mut parser = Parser::new(&data);
        parser.seek(1).unwrap();

        let (start, bytes) = parser.read_prefixed_bytes().unwrap();
        assert_eq!(start, 2);
        assert_eq!(bytes, &[0xC3, 0x28]);

        parser.seek(1).unwrap();
        assert!(matches!(
            parser.read_prefixed_string_utf8(),
            Err(Error::Malformed { .. })
        ));
    }
}
