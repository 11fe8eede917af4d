//! Entries, kinds and metadata.
//!
//! An [`Entry`] is what a listing returns: a root-relative path and its kind
//! at the instant the listing was taken. Metadata is never carried on the
//! entry; it is fetched fresh from the backend through
//! [`Disk::metadata`](crate::Disk::metadata) or [`Disk::meta`](crate::Disk::meta).

use crate::error::{Error, Result};
use crate::utils::path;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Mime type reported for directories.
pub const DIRECTORY_MIME_TYPE: &str = "directory";

/// Kind of a filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    #[cfg_attr(feature = "serde", serde(rename = "dir"))]
    Directory,
}

impl EntryKind {
    /// Short name used in listings (`file` / `dir`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
        }
    }

    /// Whether this is [`EntryKind::Directory`].
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pass-through visibility of an entry.
///
/// Backends map this onto whatever they support; the local backend uses unix
/// permission bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Visibility {
    /// Readable by others
    #[default]
    Public,
    /// Owner only
    Private,
}

impl Visibility {
    /// Lowercase name (`public` / `private`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One object in a catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    /// Root-relative path, no leading slash
    pub path: String,
    /// Kind at the time of listing
    pub kind: EntryKind,
}

impl Entry {
    /// Create a file entry.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a directory entry.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }

    /// Whether the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Last path segment.
    pub fn basename(&self) -> &str {
        path::basename(&self.path)
    }
}

/// Backend metadata for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Kind of the entry
    pub kind: EntryKind,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Mime type; [`DIRECTORY_MIME_TYPE`] for directories
    pub mime_type: String,
    /// Last modification time
    pub last_modified: SystemTime,
    /// Visibility
    pub visibility: Visibility,
}

/// Metadata plus the path-derived fields, addressable by key.
///
/// | Key | Value |
/// |-----|-------|
/// | `path` | root-relative path |
/// | `type` | `file` or `dir` |
/// | `size` | bytes |
/// | `mimetype` | mime type |
/// | `timestamp` | seconds since the unix epoch |
/// | `visibility` | `public` or `private` |
/// | `dirname` | parent path |
/// | `basename` | last segment |
/// | `filename` | last segment without extension |
/// | `extension` | extension, absent when the name has none |
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Meta {
    /// Root-relative path
    pub path: String,
    /// Backend metadata
    pub metadata: Metadata,
}

impl Meta {
    /// Known metadata keys, in display order.
    pub const KEYS: [&'static str; 10] = [
        "path",
        "type",
        "size",
        "mimetype",
        "timestamp",
        "visibility",
        "dirname",
        "basename",
        "filename",
        "extension",
    ];

    /// Parent directory of the entry.
    pub fn dirname(&self) -> &str {
        path::dirname(&self.path)
    }

    /// Last path segment.
    pub fn basename(&self) -> &str {
        path::basename(&self.path)
    }

    /// Last path segment without extension.
    pub fn filename(&self) -> &str {
        path::filename(&self.path)
    }

    /// Extension, if the name has one.
    pub fn extension(&self) -> Option<&str> {
        path::extension(&self.path)
    }

    /// Modification time as seconds since the unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.metadata
            .last_modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// Look up one field by key, rendered as text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMetadataKey`] if the key is unknown or the
    /// field is absent on this entry (e.g. `extension` of `Makefile`).
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "path" => Some(self.path.clone()),
            "type" => Some(self.metadata.kind.as_str().to_owned()),
            "size" => Some(self.metadata.size.to_string()),
            "mimetype" => Some(self.metadata.mime_type.clone()),
            "timestamp" => Some(self.timestamp().to_string()),
            "visibility" => Some(self.metadata.visibility.as_str().to_owned()),
            "dirname" => Some(self.dirname().to_owned()),
            "basename" => Some(self.basename().to_owned()),
            "filename" => Some(self.filename().to_owned()),
            "extension" => self.extension().map(str::to_owned),
            _ => None,
        };

        value.ok_or_else(|| Error::InvalidMetadataKey {
            path: self.path.clone(),
            key: key.to_owned(),
        })
    }
}
