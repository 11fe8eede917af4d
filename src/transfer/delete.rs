//! Deleting by path or mask.

use crate::disk::Disk;
use crate::entry::{Entry, EntryKind};
use crate::error::{Error, Result};
use crate::mask::{Mask, filter_actionable, resolve_entries};
use crate::options::TransferOptions;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Statistics from [`delete`] and [`delete_directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeleteStats {
    /// Files removed with the file primitive
    pub files_deleted: u64,
    /// Directory trees removed with the directory primitive
    pub directories_deleted: u64,
    /// Literal paths that were missing or of the wrong kind
    pub skipped: u64,
    /// Duration of the operation
    pub duration: Duration,
}

fn collect(
    disk: &Disk,
    exprs: &[&str],
    literal_kind: EntryKind,
    options: &TransferOptions,
    stats: &mut DeleteStats,
) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for expr in exprs {
        let normalized = disk.normalize(expr)?;
        let wildcard = Mask::new(&normalized)?.is_wildcard();
        let resolved = resolve_entries(disk, &normalized)?;

        if wildcard {
            entries.extend(resolved);
            continue;
        }
        match resolved.into_iter().next() {
            Some(entry) if entry.kind == literal_kind => entries.push(entry),
            Some(entry) => {
                options.warn(&format!(
                    "Skipping {}: expected a {}, found a {}",
                    entry.path, literal_kind, entry.kind
                ));
                stats.skipped += 1;
            }
            None => {
                options.warn(&format!("Skipping {normalized}: no such entry"));
                stats.skipped += 1;
            }
        }
    }

    let mut seen = HashSet::new();
    Ok(filter_actionable(entries)
        .into_iter()
        .filter(|e| seen.insert(e.path.clone()))
        .collect())
}

fn interrupted(completed: usize, total: usize, path: &str) -> impl FnOnce(Error) -> Error {
    move |e| {
        if total > 1 {
            Error::Interrupted {
                completed,
                total,
                from: path.to_owned(),
                to: String::new(),
                source: Box::new(e),
            }
        } else {
            e
        }
    }
}

/// Delete files by path or mask.
///
/// Each expression is handled on its own terms:
///
/// - a literal path must name a file; missing paths and directories are
///   skipped with a warning
/// - a mask is matched against a recursive listing of its static prefix and
///   reduced to actionable entries; matched files are deleted with the file
///   primitive and matched directories with the directory primitive
///
/// # Errors
///
/// The first failing primitive stops the run. Entries deleted before it stay
/// deleted. When more than one entry was collected, the failure is reported
/// as [`Error::Interrupted`] with the number of entries already deleted.
pub fn delete(disk: &Disk, exprs: &[&str], options: &TransferOptions) -> Result<DeleteStats> {
    let start = Instant::now();
    let mut stats = DeleteStats::default();

    let entries = collect(disk, exprs, EntryKind::File, options, &mut stats)?;
    let total = entries.len();
    for (index, entry) in entries.iter().enumerate() {
        match entry.kind {
            EntryKind::File => {
                disk.delete_file(&entry.path)
                    .map_err(interrupted(index, total, &entry.path))?;
                stats.files_deleted += 1;
            }
            EntryKind::Directory => {
                disk.delete_directory_raw(&entry.path)
                    .map_err(interrupted(index, total, &entry.path))?;
                stats.directories_deleted += 1;
            }
        }
        options.verbose(&format!("delete {}", entry.path));
    }

    stats.duration = start.elapsed();
    Ok(stats)
}

/// Delete directory trees by path or mask.
///
/// Only directories are acted on: files matched by a mask are ignored, and
/// a literal path that is missing or names a file is skipped with a warning.
///
/// # Errors
///
/// Same as [`delete`]; matched files do not count towards the total.
pub fn delete_directory(disk: &Disk, expr: &str, options: &TransferOptions) -> Result<DeleteStats> {
    let start = Instant::now();
    let mut stats = DeleteStats::default();

    let directories: Vec<Entry> = collect(disk, &[expr], EntryKind::Directory, options, &mut stats)?
        .into_iter()
        .filter(|e| e.kind == EntryKind::Directory)
        .collect();
    let total = directories.len();
    for (index, entry) in directories.iter().enumerate() {
        disk.delete_directory_raw(&entry.path)
            .map_err(interrupted(index, total, &entry.path))?;
        stats.directories_deleted += 1;
        options.verbose(&format!("delete directory {}", entry.path));
    }

    stats.duration = start.elapsed();
    Ok(stats)
}
