//! Catalog snapshots.

use super::glob::Mask;
use crate::disk::Disk;
use crate::entry::{Entry, EntryKind};
use crate::error::Result;

/// A read-only snapshot of a directory subtree.
///
/// The snapshot records path and kind as they were when it was taken. It is
/// never refreshed; take a new one to see later changes. Metadata is not
/// stored and must be fetched from the [`Disk`] on demand.
#[derive(Debug, Clone)]
pub struct Catalog {
    directory: String,
    recursive: bool,
    entries: Vec<Entry>,
}

impl Catalog {
    /// List `directory` on `disk`.
    pub fn capture(disk: &Disk, directory: &str, recursive: bool) -> Result<Self> {
        let directory = disk.normalize(directory)?;
        let entries = disk.list(&directory, recursive)?;
        Ok(Self {
            directory,
            recursive,
            entries,
        })
    }

    /// Normalized directory the snapshot was taken of.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Whether the snapshot descends into subdirectories.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// All entries, sorted by path.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Consume the snapshot.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kind of `path` at capture time.
    pub fn kind_of(&self, path: &str) -> Option<EntryKind> {
        self.entries
            .binary_search_by(|e| e.path.as_str().cmp(path))
            .ok()
            .map(|idx| self.entries[idx].kind)
    }

    /// All entry paths.
    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    /// File entries only.
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::File)
    }

    /// Directory entries only.
    pub fn directories(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Directory)
    }

    /// Entries whose path matches `mask` in full.
    pub fn matching(&self, mask: &Mask) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| mask.is_match(&e.path))
            .cloned()
            .collect()
    }
}
