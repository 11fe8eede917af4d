//! Applying one resolved pair.
//!
//! The overwrite policy is split in two: [`decide`] is a pure function of the
//! flags and the kinds found on disk, and [`apply`] queries only the kinds
//! the decision needs, then carries the plan out.
//!
//! | dest exists | overwrite | dest dir | source dir | recursive | plan |
//! |---|---|---|---|---|---|
//! | no | any | | | | [`Plan::Direct`] |
//! | yes | false | | | | [`Plan::Direct`] (backend decides) |
//! | yes | true | no | | | [`Plan::ReplaceFile`] |
//! | yes | true | yes | no | | [`Plan::ReplaceDirectory`] |
//! | yes | true | yes | yes | false | [`Plan::ReplaceDirectory`] |
//! | yes | true | yes | yes | true | [`Plan::Merge`] |

use super::TransferStats;
use crate::disk::Disk;
use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::options::{Action, TransferOptions};
use crate::utils::path;

/// What to do with one `(from, to)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Call the primitive straight away
    Direct,
    /// Delete the destination file, then call the primitive
    ReplaceFile,
    /// Delete the destination directory tree, then call the primitive
    ReplaceDirectory,
    /// Apply every source file onto its mirrored destination path
    Merge,
}

/// Choose a plan from the flags and the kinds present on disk.
///
/// `destination` is `None` when nothing exists at the destination. `source`
/// only matters when the destination is a directory.
pub fn decide(
    overwrite: bool,
    recursive: bool,
    destination: Option<EntryKind>,
    source: Option<EntryKind>,
) -> Plan {
    match (overwrite, destination) {
        (false, _) | (_, None) => Plan::Direct,
        (true, Some(EntryKind::File)) => Plan::ReplaceFile,
        (true, Some(EntryKind::Directory)) => match (source, recursive) {
            (Some(EntryKind::Directory), true) => Plan::Merge,
            _ => Plan::ReplaceDirectory,
        },
    }
}

/// Apply one already-resolved pair.
///
/// Paths are taken literally; no mask resolution happens here. A pair whose
/// source and destination normalize to the same path is skipped with a
/// warning.
///
/// # Errors
///
/// [`Error::OverlappingPaths`] when one side lies inside the other, before
/// anything is touched. Otherwise the first failing primitive aborts the
/// call. Work already done, such as files moved earlier in a merge, is not
/// rolled back.
pub fn apply(
    disk: &Disk,
    action: Action,
    from: &str,
    to: &str,
    options: &TransferOptions,
) -> Result<TransferStats> {
    let mut stats = TransferStats::default();
    apply_into(
        disk,
        action,
        from,
        to,
        options.overwrite,
        options.recursive,
        options,
        &mut stats,
    )?;
    stats.pairs = 1;
    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_into(
    disk: &Disk,
    action: Action,
    from: &str,
    to: &str,
    overwrite: bool,
    recursive: bool,
    options: &TransferOptions,
    stats: &mut TransferStats,
) -> Result<()> {
    let from = disk.normalize(from)?;
    let to = disk.normalize(to)?;
    if from == to {
        options.warn(&format!("Skipping {from}: source and destination are the same"));
        return Ok(());
    }
    if path::is_descendant(&to, &from) || path::is_descendant(&from, &to) {
        return Err(Error::OverlappingPaths { from, to });
    }
    let (from, to) = (from.as_str(), to.as_str());

    let destination = if overwrite {
        disk.kind_if_exists(to)?
    } else {
        None
    };
    let source = if destination == Some(EntryKind::Directory) {
        disk.kind_if_exists(from)?
    } else {
        None
    };

    match decide(overwrite, recursive, destination, source) {
        Plan::Direct => perform(disk, action, from, to, options, stats),
        Plan::ReplaceFile => {
            disk.delete_file(to)?;
            stats.entries_replaced += 1;
            perform(disk, action, from, to, options, stats)
        }
        Plan::ReplaceDirectory => {
            disk.delete_directory_raw(to)?;
            stats.entries_replaced += 1;
            perform(disk, action, from, to, options, stats)
        }
        Plan::Merge => merge(disk, action, from, to, options, stats),
    }
}

fn perform(
    disk: &Disk,
    action: Action,
    from: &str,
    to: &str,
    options: &TransferOptions,
    stats: &mut TransferStats,
) -> Result<()> {
    match action {
        Action::Copy => disk.copy_raw(from, to)?,
        Action::Rename => disk.rename_raw(from, to)?,
    }
    stats.entries_transferred += 1;
    options.verbose(&format!("{action} {from} -> {to}"));
    Ok(())
}

fn merge(
    disk: &Disk,
    action: Action,
    from: &str,
    to: &str,
    options: &TransferOptions,
    stats: &mut TransferStats,
) -> Result<()> {
    options.verbose(&format!("merge {from} -> {to}"));

    for file in disk.all_files(from)? {
        let target = path::rebase(&file, from, to)
            .unwrap_or_else(|| path::join(to, path::basename(&file)));
        apply_into(disk, action, &file, &target, true, true, options, stats)?;
    }

    // Only after every file has been moved.
    if action == Action::Rename && remove_emptied_source(disk, from, options)? {
        stats.sources_removed += 1;
    }
    stats.directories_merged += 1;
    Ok(())
}

/// Remove the merged source tree bottom-up, one empty directory at a time.
///
/// Entries the listing does not show, such as system files and symlinks,
/// were never moved; their directories are left in place with a warning.
/// Returns whether `from` itself was removed.
fn remove_emptied_source(disk: &Disk, from: &str, options: &TransferOptions) -> Result<bool> {
    let mut directories = disk.all_directories(from)?;
    directories.push(from.to_owned());

    let mut removed = false;
    // Sorted listing, reversed: children come before their parents.
    for directory in directories.iter().rev() {
        match disk.delete_empty_directory(directory) {
            Ok(()) => removed = directory == from,
            Err(Error::Backend { ref source, .. })
                if source.kind() == std::io::ErrorKind::DirectoryNotEmpty =>
            {
                options.warn(&format!(
                    "Leaving {directory} in place: it still holds entries that were not moved"
                ));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}
