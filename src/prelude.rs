//! # annodex Prelude
//!
//! Re-exports the types needed for everyday index queries.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all annodex operations
pub use crate::Error;

/// The result type used throughout annodex
pub use crate::Result;

/// Validation settings for decoding
pub use crate::DecodeConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Decoded index
pub use crate::SparseIndex;

/// Low-level buffer access
pub use crate::{File, Parser};

// ================================================================================================
// Views
// ================================================================================================

/// Per-class and per-name views
pub use crate::index::{ClassModifiers, SparseClassInfo, SparseDotName, SparseMemberInfo};

/// Root class reported for classes without a stored superclass
pub use crate::index::ROOT_CLASS_NAME;

// ================================================================================================
// Writer
// ================================================================================================

/// Index serialization
pub use crate::index::{ClassBuilder, IndexBuilder, MemberBuilder};
