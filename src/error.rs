//! Errors of the file and configuration helpers
//!
//! The redistribution routines themselves do not return errors. A violated precondition
//! there is a bug shared by all ranks and panics.
use std::path::PathBuf;
use thiserror::Error;

/// Error type for file input/output and configuration
#[derive(Debug, Error)]
pub enum RedistributeError {
    /// A file could not be read or written
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// The file
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
    /// A file ended before its element count header
    #[error("{path:?} has no element count header")]
    MissingHeader {
        /// The file
        path: PathBuf,
    },
    /// A token could not be parsed as a value
    #[error("cannot parse {token:?} in {path:?}")]
    Parse {
        /// The file
        path: PathBuf,
        /// The offending token
        token: String,
    },
    /// A file holds fewer values than requested
    #[error("{path:?} ended after {found} of {expected} values")]
    Truncated {
        /// The file
        path: PathBuf,
        /// Number of values requested
        expected: usize,
        /// Number of values present
        found: usize,
    },
    /// A configuration could not be parsed
    #[cfg(feature = "serde")]
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
    /// A configuration could not be serialized
    #[cfg(feature = "serde")]
    #[error("cannot serialize configuration: {0}")]
    ConfigWrite(#[from] ron::Error),
}

/// Result type for file input/output and configuration
pub type Result<T> = std::result::Result<T, RedistributeError>;
