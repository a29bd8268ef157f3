// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # annodex
//!
//! A lazy decoder for binary annotation indices.
//!
//! An annotation index summarizes a set of compiled classes: names, access flags, superclass,
//! implemented interfaces, declared fields and methods, and which annotation types are applied
//! at class, field and method level. Tools that scan large class paths typically ask a handful
//! of questions about a few classes; `annodex` makes opening an index cost one pass over the
//! class table and decodes everything else only when it is asked for.
//!
//! ## Features
//!
//! - **Lazy decoding** - Interface lists, members and annotation blocks are read on access
//! - **Memoized names** - Each pool entry is UTF-8 decoded at most once, and only if queried
//! - **Memory-mapped input** - Large indices are mapped rather than read
//! - **Thread safe** - [`SparseIndex`] is `Send + Sync`, with a rayon based parallel iterator
//! - **Writer included** - [`IndexBuilder`] produces well-formed indices
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annodex::prelude::*;
//!
//! let index = SparseIndex::from_file("classes.idx")?;
//! println!("{} classes", index.class_count());
//!
//! if let Some(foo) = index.class_by_name("com.acme.Foo") {
//!     println!("super: {}", foo.super_name()?);
//!     println!("interfaces: {:?}", foo.interface_names()?);
//!     println!("method annotations: {:?}", foo.method_annotations()?);
//! }
//! # Ok::<(), annodex::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`index`] - Header, name pool, class table, views and the writer
//! - [`Error`] and [`Result`] - Error handling
//!
//! ### Error Model
//!
//! [`SparseIndex::decode`] either returns a complete index or fails with
//! [`Error::Malformed`]. Damage inside regions the decoder did not need to read is reported by
//! the accessor that reads it ([`Error::NameResolution`], [`Error::OutOfBounds`]), and only
//! fails that call. [`DecodeConfig::strict`] moves all of those checks to decode time.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

pub mod index;
pub mod prelude;

/// `annodex` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust,no_run
/// use annodex::{Result, SparseIndex};
///
/// fn open(path: &str) -> Result<SparseIndex> {
///     SparseIndex::from_file(path)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `annodex` Error type
///
/// # Examples
///
/// ```rust
/// use annodex::{Error, SparseIndex};
///
/// match SparseIndex::decode(&[0xCA, 0xFE, 0xBA, 0xBE]) {
///     Ok(_) => unreachable!(),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Main entry point for decoding indices.
///
/// # Example
///
/// ```rust,no_run
/// use annodex::SparseIndex;
/// let index = SparseIndex::from_file("classes.idx")?;
/// for class in index.annotated_classes("javax.inject.Singleton")? {
///     println!("{}", class.name());
/// }
/// # Ok::<(), annodex::Error>(())
/// ```
pub use index::SparseIndex;

/// Views and values handed out by a [`SparseIndex`].
pub use index::{ClassModifiers, SparseClassInfo, SparseDotName, SparseMemberInfo};

/// Validation settings for decoding.
pub use index::DecodeConfig;

/// Builders producing serialized indices.
pub use index::{ClassBuilder, IndexBuilder, MemberBuilder};

/// Provides access to the low-level buffer and cursor.
///
/// # Example
///
/// ```rust
/// use annodex::Parser;
/// let data = [0x00, 0x01, 0x83, 0x01];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_be::<u16>()?, 1);
/// assert_eq!(parser.read_packed_u32()?, 0x83);
/// # Ok::<(), annodex::Error>(())
/// ```
pub use file::{parser::Parser, File};
