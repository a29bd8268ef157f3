//! Annotation index decoding.
//!
//! An index is a compact binary summary of a set of compiled classes: their names, flags,
//! superclass, interfaces, members, and the annotation types applied at class, field and
//! method level. This module decodes it lazily. Decoding performs one structural pass over the
//! class table and defers everything else until it is asked for.
//!
//! # Layout
//!
//! ```text
//! +--------+-----------+---------------------+-----------------------------------+
//! | header | name pool | class table (N x 34)| interfaces / members / annotations |
//! +--------+-----------+---------------------+-----------------------------------+
//! ```
//!
//! # Key Components
//!
//! - [`SparseIndex`] - Owner of the buffer and entry point for all queries
//! - [`SparseClassInfo`] - Borrowed per-class view decoding its regions on demand
//! - [`SparseDotName`] - Resolved name with content-based identity
//! - [`namepool::NamePool`] - Lazily resolved, memoized name interning table
//! - [`classtable::ClassTable`] - Fixed-stride class records and the by-name lookup
//! - [`DecodeConfig`] - Controls how much validation happens up front
//! - [`writer::IndexBuilder`] - Produces well-formed indices
//!
//! # Error Model
//!
//! Structural defects make [`SparseIndex::decode`] fail with [`crate::Error::Malformed`].
//! Defects inside regions that decode does not read surface as errors of the accessor that
//! reads them, and leave the rest of the index usable.

pub mod classinfo;
pub mod classtable;
pub mod config;
pub mod dotname;
pub mod flags;
pub mod header;
pub mod namepool;
pub mod sparse;
pub mod writer;

pub use classinfo::{SparseClassInfo, SparseMemberInfo};
pub use config::DecodeConfig;
pub use dotname::SparseDotName;
pub use flags::{ClassModifiers, ROOT_CLASS_NAME};
pub use header::IndexHeader;
pub use sparse::SparseIndex;
pub use writer::{ClassBuilder, IndexBuilder, MemberBuilder};
