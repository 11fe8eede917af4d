//! Error types for maskfs.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur while resolving masks and transferring entries, the
//! [`ErrorCode`] machine-readable classification, and the [`Result`] alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Backend | [`Error::Backend`], [`Error::NotFound`] |
//! | Usage | [`Error::InvalidMetadataKey`], [`Error::AmbiguousCaptureReference`], [`Error::InvalidMask`] |
//! | Paths | [`Error::OutsideRoot`], [`Error::RootNotFound`], [`Error::OverlappingPaths`] |
//! | Mounts | [`Error::DiskNotMounted`], [`Error::NotEjectable`] |
//! | Partial | [`Error::Interrupted`] |

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for maskfs operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable, machine-readable error classification.
///
/// Used by the `mfs` command for JSON output, where the display text of an
/// error is not a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A path or entry does not exist
    NotFound,
    /// The destination already exists and the backend refused to replace it
    AlreadyExists,
    /// Permission denied by the backend
    PermissionDenied,
    /// Any other backend I/O failure
    Io,
    /// The caller supplied an invalid argument (mask, key, path)
    InvalidInput,
    /// A multi-pair transfer stopped part way through
    Interrupted,
    /// Failure outside the library, such as writing command output
    Internal,
}

impl ErrorCode {
    /// Return the snake_case name of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::PermissionDenied => "permission_denied",
            Self::Io => "io",
            Self::InvalidInput => "invalid_input",
            Self::Interrupted => "interrupted",
            Self::Internal => "internal",
        }
    }

    /// Classify a raw I/O error.
    pub fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during mask resolution and transfers.
///
/// All errors include relevant path information to aid debugging.
/// Use the [`std::error::Error`] trait methods to access underlying
/// causes where applicable.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A storage primitive failed
    #[error("{op} failed for {path}: {source}")]
    Backend {
        /// Name of the primitive (`copy`, `rename`, `delete`, ...)
        op: &'static str,
        /// Root-relative path the primitive was called with
        path: String,
        /// Underlying error
        source: io::Error,
    },

    /// Requested entry does not exist
    #[error("Path does not exist: {0}")]
    NotFound(String),

    /// Requested metadata field is unknown or absent on the entry
    #[error("Could not fetch metadata: {key} for {path}")]
    InvalidMetadataKey {
        /// Entry the lookup was made for
        path: String,
        /// The requested key
        key: String,
    },

    /// Destination references a capture group the source mask does not produce
    ///
    /// Raised instead of silently substituting an empty string.
    #[error("Destination {destination} references ${index} but the source mask has {available} wildcard(s)")]
    AmbiguousCaptureReference {
        /// The destination expression
        destination: String,
        /// The offending 1-based group index
        index: usize,
        /// Number of capture groups the source mask produces
        available: usize,
    },

    /// The mask could not be compiled into a matcher
    #[error("Invalid mask {mask}: {source}")]
    InvalidMask {
        /// The mask as given
        mask: String,
        /// Underlying regex error
        source: regex::Error,
    },

    /// Path climbs above the disk root with `..`
    #[error("Path escapes the disk root: {0}")]
    OutsideRoot(String),

    /// One side of a transfer lies inside the other
    #[error("Source and destination overlap: {from} -> {to}")]
    OverlappingPaths {
        /// Normalized source path
        from: String,
        /// Normalized destination path
        to: String,
    },

    /// Disk root does not exist or is not a directory
    #[error("Disk root is not a directory: {0}")]
    RootNotFound(PathBuf),

    /// No disk is mounted under the given name
    #[error("No disk mounted as \"{0}\"")]
    DiskNotMounted(String),

    /// Attempted to eject a permanent disk
    #[error("The disk \"{0}\" is not ejectable")]
    NotEjectable(String),

    /// A multi-entry transfer or delete failed part way through
    ///
    /// Entries before the failing one were fully applied and are not rolled
    /// back. Re-running the same operation retries from the start.
    #[error("Interrupted after {completed} of {total} entries at {}: {source}", pair(.from, .to))]
    Interrupted {
        /// Number of entries applied before the failure
        completed: usize,
        /// Total number of resolved entries
        total: usize,
        /// Path of the failing entry
        from: String,
        /// Destination of the failing pair, empty for deletes
        to: String,
        /// The failure
        source: Box<Error>,
    },
}

fn pair(from: &str, to: &str) -> String {
    if to.is_empty() {
        from.to_owned()
    } else {
        format!("{from} -> {to}")
    }
}

impl Error {
    pub(crate) fn backend(op: &'static str, path: &str, source: io::Error) -> Self {
        Self::Backend {
            op,
            path: path.to_owned(),
            source,
        }
    }

    /// Machine-readable classification of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Backend { source, .. } => ErrorCode::from_io(source),
            Self::NotFound(_) | Self::RootNotFound(_) | Self::DiskNotMounted(_) => {
                ErrorCode::NotFound
            }
            Self::InvalidMetadataKey { .. }
            | Self::AmbiguousCaptureReference { .. }
            | Self::InvalidMask { .. }
            | Self::OutsideRoot(_)
            | Self::OverlappingPaths { .. }
            | Self::NotEjectable(_) => ErrorCode::InvalidInput,
            Self::Interrupted { .. } => ErrorCode::Interrupted,
        }
    }

    /// The innermost error, looking through [`Error::Interrupted`].
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Interrupted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
