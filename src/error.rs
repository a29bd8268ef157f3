use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two groups with different scopes:
///
/// ## Decode-time errors
/// - [`Error::Malformed`] - The buffer is not a well-formed index (bad magic or version,
///   truncation, an `(offset, count)` pair outside the buffer, an out-of-range name id in a
///   class record, duplicate class names). Returned by [`crate::SparseIndex::decode`]; no
///   partial index is ever produced.
///
/// ## Query-time errors
/// - [`Error::NameResolution`] - A name id read from a lazily decoded region lies outside the
///   name pool.
/// - [`Error::OutOfBounds`] - A lazily followed pointer addresses bytes past the buffer end.
///
/// Query-time errors only fail the accessor that encountered them, the index itself stays
/// usable.
///
/// ## I/O
/// - [`Error::FileError`] - Filesystem errors while opening an index file
/// - [`Error::Error`] - Miscellaneous failures such as a failed memory mapping
///
/// # Examples
///
/// ```rust,no_run
/// use annodex::{Error, SparseIndex};
///
/// match SparseIndex::from_file("classes.idx") {
///     Ok(index) => println!("{} classes", index.class_count()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed index: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The index is damaged and could not be decoded.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading the buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// A name id does not address an entry of the name pool.
    #[error("Name id {id} is outside of the name pool ({pool_size} entries)")]
    NameResolution {
        /// The offending id
        id: u32,
        /// Number of entries in the pool
        pool_size: u32,
    },

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Returns `true` for structural errors, which are fatal to decoding.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. })
    }

    /// Converts cursor overruns into the structural error reported by the decoder.
    ///
    /// Everything else is passed through unchanged.
    pub(crate) fn into_structural(self, context: &str) -> Error {
        match self {
            Error::OutOfBounds => malformed_error!("{} - buffer is truncated", context),
            other => other,
        }
    }
}
