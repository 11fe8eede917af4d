//! The disk facade.
//!
//! A [`Disk`] binds a [`Storage`] backend to its root and owns path
//! normalization: every path a caller hands in is made root-relative before
//! it reaches the backend, and every backend failure is wrapped in
//! [`Error::Backend`] with the primitive name and the normalized path.
//!
//! The facade is pass-through. It never caches listings or metadata, and it
//! never applies overwrite policy; that is the transfer engine's job.
//!
//! # Example
//!
//! ```
//! use maskfs::{Disk, MemoryStorage};
//!
//! let disk = Disk::new(MemoryStorage::new());
//! disk.write("docs/a.txt", b"hello")?;
//! assert!(disk.exists("./docs/a.txt")?);
//! assert_eq!(disk.mime_type("docs/a.txt")?, "text/plain");
//! # Ok::<(), maskfs::Error>(())
//! ```

use crate::entry::{Entry, EntryKind, Meta, Metadata, Visibility};
use crate::error::{Error, Result};
use crate::storage::{LocalStorage, Storage};
use crate::utils::path;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Listing split by entry kind, as returned by [`Disk::contents_by_type`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentsByType {
    /// Directory paths
    pub directories: Vec<String>,
    /// File paths
    pub files: Vec<String>,
}

/// A root-bound view over a storage backend.
///
/// Cloning a `Disk` is cheap and shares the backend.
#[derive(Debug, Clone)]
pub struct Disk {
    storage: Arc<dyn Storage>,
}

impl Disk {
    /// Wrap a backend.
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Wrap a backend that is shared with other owners.
    pub fn from_shared(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Open a disk over a local directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootNotFound`] if `root` is not an existing directory.
    pub fn local(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let storage =
            LocalStorage::new(root).map_err(|_| Error::RootNotFound(root.to_path_buf()))?;
        Ok(Self::new(storage))
    }

    /// Display form of the root.
    pub fn root(&self) -> &str {
        self.storage.root()
    }

    /// The underlying backend.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Make `path` relative to this disk's root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutsideRoot`] if the path climbs above the root.
    pub fn normalize(&self, path: &str) -> Result<String> {
        path::normalize(self.root(), path)
    }

    fn call<T>(
        &self,
        op: &'static str,
        path: &str,
        f: impl FnOnce(&dyn Storage, &str) -> io::Result<T>,
    ) -> Result<T> {
        let path = self.normalize(path)?;
        f(self.storage.as_ref(), &path).map_err(|e| Error::backend(op, &path, e))
    }

    fn call_pair<T>(
        &self,
        op: &'static str,
        from: &str,
        to: &str,
        f: impl FnOnce(&dyn Storage, &str, &str) -> io::Result<T>,
    ) -> Result<T> {
        let from = self.normalize(from)?;
        let to = self.normalize(to)?;
        f(self.storage.as_ref(), &from, &to).map_err(|e| Error::backend(op, &from, e))
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Whether an entry exists at `path`.
    pub fn exists(&self, path: &str) -> Result<bool> {
        self.call("exists", path, |s, p| s.exists(p))
    }

    /// Kind of the entry at `path`.
    pub fn kind(&self, path: &str) -> Result<EntryKind> {
        let normalized = self.normalize(path)?;
        match self.storage.kind(&normalized) {
            Ok(kind) => Ok(kind),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(normalized)),
            Err(e) => Err(Error::backend("kind", &normalized, e)),
        }
    }

    /// Kind of the entry at `path`, or `None` if nothing is there.
    pub fn kind_if_exists(&self, path: &str) -> Result<Option<EntryKind>> {
        match self.kind(path) {
            Ok(kind) => Ok(Some(kind)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether `path` is a directory.
    pub fn is_directory(&self, path: &str) -> Result<bool> {
        Ok(self.kind_if_exists(path)? == Some(EntryKind::Directory))
    }

    /// Fresh backend metadata for `path`.
    pub fn metadata(&self, path: &str) -> Result<Metadata> {
        self.call("metadata", path, |s, p| s.metadata(p))
    }

    /// Metadata plus path-derived fields, addressable by key.
    pub fn meta(&self, path: &str) -> Result<Meta> {
        let normalized = self.normalize(path)?;
        let metadata = self
            .storage
            .metadata(&normalized)
            .map_err(|e| Error::backend("metadata", &normalized, e))?;
        Ok(Meta {
            path: normalized,
            metadata,
        })
    }

    /// Size in bytes.
    pub fn size(&self, path: &str) -> Result<u64> {
        Ok(self.metadata(path)?.size)
    }

    /// Mime type (`directory` for directories).
    pub fn mime_type(&self, path: &str) -> Result<String> {
        Ok(self.metadata(path)?.mime_type)
    }

    /// Last modification time.
    pub fn last_modified(&self, path: &str) -> Result<SystemTime> {
        Ok(self.metadata(path)?.last_modified)
    }

    /// Last segment of the normalized path.
    pub fn basename(&self, path: &str) -> Result<String> {
        Ok(path::basename(&self.normalize(path)?).to_owned())
    }

    /// Extension of the normalized path, if any.
    pub fn extension(&self, path: &str) -> Result<Option<String>> {
        Ok(path::extension(&self.normalize(path)?).map(str::to_owned))
    }

    /// Last segment without its extension.
    pub fn filename(&self, path: &str) -> Result<String> {
        Ok(path::filename(&self.normalize(path)?).to_owned())
    }

    /// Parent directory of the normalized path.
    pub fn dirname(&self, path: &str) -> Result<String> {
        Ok(path::dirname(&self.normalize(path)?).to_owned())
    }

    // -------------------------------------------------------------------------
    // Listing
    // -------------------------------------------------------------------------

    /// Entries below `directory`, sorted by path.
    pub fn list(&self, directory: &str, recursive: bool) -> Result<Vec<Entry>> {
        self.call("list", directory, |s, p| s.list(p, recursive))
    }

    fn list_paths(
        &self,
        directory: &str,
        recursive: bool,
        kind: Option<EntryKind>,
    ) -> Result<Vec<String>> {
        Ok(self
            .list(directory, recursive)?
            .into_iter()
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .map(|e| e.path)
            .collect())
    }

    /// Direct children of `directory`.
    pub fn contents(&self, directory: &str) -> Result<Vec<String>> {
        self.list_paths(directory, false, None)
    }

    /// Every entry below `directory`.
    pub fn all_contents(&self, directory: &str) -> Result<Vec<String>> {
        self.list_paths(directory, true, None)
    }

    /// Files directly inside `directory`.
    pub fn files(&self, directory: &str) -> Result<Vec<String>> {
        self.list_paths(directory, false, Some(EntryKind::File))
    }

    /// Every file below `directory`.
    pub fn all_files(&self, directory: &str) -> Result<Vec<String>> {
        self.list_paths(directory, true, Some(EntryKind::File))
    }

    /// Directories directly inside `directory`.
    pub fn directories(&self, directory: &str) -> Result<Vec<String>> {
        self.list_paths(directory, false, Some(EntryKind::Directory))
    }

    /// Every directory below `directory`.
    pub fn all_directories(&self, directory: &str) -> Result<Vec<String>> {
        self.list_paths(directory, true, Some(EntryKind::Directory))
    }

    /// Listing of `directory` split into directories and files.
    pub fn contents_by_type(&self, directory: &str, recursive: bool) -> Result<ContentsByType> {
        let mut split = ContentsByType::default();
        for entry in self.list(directory, recursive)? {
            match entry.kind {
                EntryKind::Directory => split.directories.push(entry.path),
                EntryKind::File => split.files.push(entry.path),
            }
        }
        Ok(split)
    }

    // -------------------------------------------------------------------------
    // Raw primitives
    // -------------------------------------------------------------------------

    /// Read a whole file.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.call("read", path, |s, p| s.read(p))
    }

    /// Read a whole file as UTF-8 text (lossy).
    pub fn read_to_string(&self, path: &str) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.read(path)?).into_owned())
    }

    /// Create or replace a file.
    pub fn write(&self, path: &str, contents: impl AsRef<[u8]>) -> Result<()> {
        self.call("write", path, |s, p| s.write(p, contents.as_ref(), None))
    }

    /// Create or replace a file with an explicit visibility.
    pub fn write_with_visibility(
        &self,
        path: &str,
        contents: impl AsRef<[u8]>,
        visibility: Visibility,
    ) -> Result<()> {
        self.call("write", path, |s, p| {
            s.write(p, contents.as_ref(), Some(visibility))
        })
    }

    /// Backend copy, no overwrite policy and no mask resolution.
    pub fn copy_raw(&self, from: &str, to: &str) -> Result<()> {
        self.call_pair("copy", from, to, |s, f, t| s.copy(f, t))
    }

    /// Backend rename, no overwrite policy and no mask resolution.
    pub fn rename_raw(&self, from: &str, to: &str) -> Result<()> {
        self.call_pair("rename", from, to, |s, f, t| s.rename(f, t))
    }

    /// Delete one file.
    pub fn delete_file(&self, path: &str) -> Result<()> {
        self.call("delete", path, |s, p| s.delete(p))
    }

    /// Create a directory and any missing parents.
    pub fn make_directory(&self, path: &str) -> Result<()> {
        self.call("make_directory", path, |s, p| s.make_directory(p))
    }

    /// Delete one directory tree.
    pub fn delete_directory_raw(&self, path: &str) -> Result<()> {
        self.call("delete_directory", path, |s, p| s.delete_directory(p))
    }

    /// Delete one directory, refusing when it still holds entries.
    pub fn delete_empty_directory(&self, path: &str) -> Result<()> {
        self.call("delete_empty_directory", path, |s, p| {
            s.delete_empty_directory(p)
        })
    }

    /// Visibility of an entry.
    pub fn visibility(&self, path: &str) -> Result<Visibility> {
        self.call("visibility", path, |s, p| s.visibility(p))
    }

    /// Change the visibility of an entry.
    pub fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<()> {
        self.call("set_visibility", path, |s, p| s.set_visibility(p, visibility))
    }
}
