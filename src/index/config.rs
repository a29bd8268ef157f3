//! Decoder configuration.
//!
//! The default decode performs the single structural pass over the class table and nothing
//! else. Regions referenced by the class records (interfaces, members, annotations) are only
//! bounds-checked as a whole; their contents are validated lazily when queried. The stricter
//! presets move those checks to decode time, trading decode speed for the guarantee that no
//! accessor will ever fail on the decoded index.

/// Configuration for [`crate::SparseIndex::decode_with_config`].
///
/// # Examples
///
/// ```rust,no_run
/// use annodex::{DecodeConfig, SparseIndex};
///
/// let bytes = std::fs::read("classes.idx")?;
/// let index = SparseIndex::decode_with_config(&bytes, DecodeConfig::strict())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Walk every interface list, member record and annotation block during decode, checking
    /// that all name ids are within the pool and all nested pointers within the buffer
    pub validate_members: bool,

    /// Verify that every name pool entry is valid UTF-8 during decode. Entries are checked in
    /// place and not memoized
    pub validate_names: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self::minimal()
    }
}

impl DecodeConfig {
    /// Structural validation only; everything else is deferred to first access.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            validate_members: false,
            validate_names: false,
        }
    }

    /// Validates every reference in the index during decode.
    ///
    /// Accessors of an index decoded with this preset never return a query-time error.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            validate_members: true,
            validate_names: true,
        }
    }

    /// Returns `true` if any check beyond the structural pass is enabled.
    #[must_use]
    pub fn is_eager(&self) -> bool {
        self.validate_members || self.validate_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(DecodeConfig::default(), DecodeConfig::minimal());
        assert!(!DecodeConfig::minimal().is_eager());
        assert!(DecodeConfig::strict().is_eager());
        assert!(DecodeConfig::strict().validate_members);
        assert!(DecodeConfig::strict().validate_names);
    }
}
