//! Name pool with lazily resolved, memoized entries.
//!
//! The name pool is the interning table of an index: every class, member and annotation name is
//! stored exactly once, and all other structures refer to it by a 0-based id. On disk the pool is
//! a `u32` entry count followed by that many length-prefixed UTF-8 byte spans.
//!
//! Decoding the pool only records where each span lives. The UTF-8 conversion happens the first
//! time an id is resolved, and the result is kept in a per-id memo slot, so each name is decoded
//! at most once per index and names that are never queried are never decoded at all.
//!
//! # Concurrency
//!
//! Memo slots are published with [`std::sync::OnceLock::set`], never with an initializer closure.
//! Two threads resolving the same id concurrently may both decode it; the first to publish wins
//! and the other drops its (identical) copy. Resolution therefore never waits on another
//! thread's decode work.

use std::sync::{Arc, OnceLock};

use crate::{file::parser::Parser, Error, Result};

/// Location of a single name inside the raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameSpan {
    /// Absolute offset of the first UTF-8 byte
    pub start: u32,
    /// Length of the name in bytes
    pub len: u32,
}

/// Interning table mapping name ids to byte spans and memoized strings.
pub struct NamePool {
    spans: Vec<NameSpan>,
    memo: Vec<OnceLock<Arc<str>>>,
}

impl NamePool {
    /// Decodes the pool table at the parser's current position.
    ///
    /// Only the span boundaries are recorded; no entry is converted to a string.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the declared entry count cannot possibly fit in the
    /// remaining bytes or an entry lies outside the `u32` address range, and
    /// [`crate::Error::OutOfBounds`] if an entry is cut off by the end of the buffer.
    pub fn read(parser: &mut Parser) -> Result<NamePool> {
        let count = parser.read_be::<u32>()?;

        // Every entry needs at least its one-byte length prefix
        if count as usize > parser.remaining() {
            return Err(malformed_error!(
                "Name pool declares {} entries but only {} bytes remain",
                count,
                parser.remaining()
            ));
        }

        let mut spans = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (start, bytes) = parser.read_prefixed_bytes()?;
            let Ok(start) = u32::try_from(start) else {
                return Err(malformed_error!(
                    "Name pool entry at offset {} exceeds the addressable range",
                    start
                ));
            };

            spans.push(NameSpan {
                start,
                // Bounded by read_prefixed_bytes, which decodes a u32 length
                len: u32::try_from(bytes.len()).unwrap_or(u32::MAX),
            });
        }

        let memo = std::iter::repeat_with(OnceLock::new)
            .take(spans.len())
            .collect();

        Ok(NamePool { spans, memo })
    }

    /// Number of entries in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if the pool has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Returns `true` if `id` addresses an entry of this pool.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        (id as usize) < self.spans.len()
    }

    /// Returns the byte span of `id`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NameResolution`] if `id` is out of bounds.
    pub fn span(&self, id: u32) -> Result<NameSpan> {
        match self.spans.get(id as usize) {
            Some(span) => Ok(*span),
            None => Err(self.out_of_pool(id)),
        }
    }

    /// Returns `true` if `id` has already been resolved and memoized.
    #[must_use]
    pub fn is_resolved(&self, id: u32) -> bool {
        self.memo
            .get(id as usize)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of entries resolved so far.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.memo.iter().filter(|slot| slot.get().is_some()).count()
    }

    /// Resolves `id` to its string, decoding and memoizing it on first request.
    ///
    /// # Arguments
    /// * `data` - The raw buffer this pool was decoded from
    /// * `id` - The name id to resolve
    ///
    /// # Errors
    /// Returns [`crate::Error::NameResolution`] if `id` is out of bounds, or
    /// [`crate::Error::Malformed`] if the entry is not valid UTF-8.
    pub fn resolve(&self, data: &[u8], id: u32) -> Result<Arc<str>> {
        let Some(slot) = self.memo.get(id as usize) else {
            return Err(self.out_of_pool(id));
        };

        if let Some(name) = slot.get() {
            return Ok(name.clone());
        }

        let decoded: Arc<str> = Arc::from(self.decode(data, id)?);
        if slot.set(decoded.clone()).is_err() {
            log::trace!("name {} was memoized concurrently", id);
        }

        match slot.get() {
            Some(winner) => Ok(winner.clone()),
            None => Ok(decoded),
        }
    }

    /// Checks that every entry is valid UTF-8 without memoizing anything.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] naming the first invalid entry.
    pub fn verify(&self, data: &[u8]) -> Result<()> {
        for id in 0..self.spans.len() {
            // Ids are bounded by the u32 entry count read from the buffer
            self.decode(data, u32::try_from(id).unwrap_or(u32::MAX))?;
        }

        Ok(())
    }

    fn decode<'a>(&self, data: &'a [u8], id: u32) -> Result<&'a str> {
        let span = self.span(id)?;
        let start = span.start as usize;
        let Some(bytes) = data.get(start..start + span.len as usize) else {
            return Err(Error::OutOfBounds);
        };

        std::str::from_utf8(bytes)
            .map_err(|e| malformed_error!("Name {} at offset {} is not valid UTF-8: {}", id, start, e))
    }

    fn out_of_pool(&self, id: u32) -> Error {
        Error::NameResolution {
            id,
            pool_size: u32::try_from(self.spans.len()).unwrap_or(u32::MAX),
        }
    }
}

impl std::fmt::Debug for NamePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamePool")
            .field("len", &self.len())
            .field("resolved", &self.resolved_count())
            .finish()
    }
}
