//! Storage backends.
//!
//! The transfer engine never touches a filesystem directly. It talks to a
//! [`Storage`] implementation through root-relative paths that the
//! [`Disk`](crate::Disk) facade has already normalized.
//!
//! Two backends ship with the crate:
//!
//! - [`LocalStorage`]: a directory on the local filesystem
//! - [`MemoryStorage`]: an in-memory tree with an operation log and failure
//!   injection, used for tests and dry runs
//!
//! # Conflict behavior
//!
//! `copy` and `rename` must refuse to replace an existing destination with
//! [`io::ErrorKind::AlreadyExists`]. Overwrite policy is decided by the
//! engine, which deletes the destination first when asked to.

mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::{MemoryStorage, Op, Operation};

use crate::entry::{Entry, EntryKind, Metadata, Visibility};
use std::fmt;
use std::io;

/// Primitive operations the engine needs from a backend.
///
/// All paths are root-relative, `/`-separated and already normalized; the
/// empty string is the root directory. Implementations must not cache
/// results between calls.
pub trait Storage: fmt::Debug + Send + Sync {
    /// Display form of the backend root, stripped from caller paths.
    fn root(&self) -> &str;

    /// Whether an entry exists at `path`.
    fn exists(&self, path: &str) -> io::Result<bool>;

    /// Kind of the entry at `path`.
    fn kind(&self, path: &str) -> io::Result<EntryKind>;

    /// Fresh metadata for the entry at `path`.
    fn metadata(&self, path: &str) -> io::Result<Metadata>;

    /// Entries inside `directory`, sorted by path.
    ///
    /// A missing directory lists as empty.
    fn list(&self, directory: &str, recursive: bool) -> io::Result<Vec<Entry>>;

    /// Full contents of the file at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Create or replace the file at `path`, creating parent directories.
    fn write(&self, path: &str, contents: &[u8], visibility: Option<Visibility>)
    -> io::Result<()>;

    /// Copy a file or directory tree. Fails if `to` exists.
    fn copy(&self, from: &str, to: &str) -> io::Result<()>;

    /// Move a file or directory tree. Fails if `to` exists.
    fn rename(&self, from: &str, to: &str) -> io::Result<()>;

    /// Delete the file at `path`. Fails on directories.
    fn delete(&self, path: &str) -> io::Result<()>;

    /// Create a directory and any missing parents.
    fn make_directory(&self, path: &str) -> io::Result<()>;

    /// Delete a directory and everything below it.
    fn delete_directory(&self, path: &str) -> io::Result<()>;

    /// Delete a directory that holds no entries.
    ///
    /// Fails with [`io::ErrorKind::DirectoryNotEmpty`] when anything is left
    /// inside, including entries a listing would not show.
    fn delete_empty_directory(&self, path: &str) -> io::Result<()>;

    /// Visibility of the entry at `path`.
    fn visibility(&self, path: &str) -> io::Result<Visibility>;

    /// Change the visibility of the entry at `path`.
    fn set_visibility(&self, path: &str, visibility: Visibility) -> io::Result<()>;
}

pub(crate) fn already_exists(path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("destination already exists: {path}"),
    )
}

pub(crate) fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {path}"))
}
