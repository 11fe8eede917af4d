//! Transfer operations.
//!
//! Top-level copy, rename and delete resolve their expressions with
//! [`resolve_mask`](crate::resolve_mask) and then work through the resolved
//! pairs one at a time, in order. The first failure stops the run; pairs
//! applied before it stay applied.

mod apply;
mod delete;
mod replace;

pub use apply::{Plan, apply, decide};
pub use delete::{DeleteStats, delete, delete_directory};
pub use replace::{Placeholder, copy_with_replacements};

use crate::disk::Disk;
use crate::error::{Error, Result};
use crate::mask::resolve_mask;
use crate::options::{Action, TransferOptions};
use std::time::Instant;

/// Statistics from a copy or rename.
///
/// # Example
///
/// ```
/// use maskfs::{Disk, MemoryStorage, TransferOptions, copy};
///
/// let storage = MemoryStorage::new();
/// storage.insert_file("docs/a.txt", "a");
/// storage.insert_file("docs/b.txt", "b");
/// let disk = Disk::new(storage);
///
/// let stats = copy(&disk, "docs/*", "backup", &TransferOptions::default())?;
/// assert_eq!(stats.pairs, 2);
/// # Ok::<(), maskfs::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferStats {
    /// Number of resolved pairs fully applied
    pub pairs: usize,
    /// Number of copy/rename primitives issued
    pub entries_transferred: u64,
    /// Number of destinations deleted before being replaced
    pub entries_replaced: u64,
    /// Number of directory merges
    pub directories_merged: u64,
    /// Number of source directories removed after a merging rename
    pub sources_removed: u64,
    /// Duration of the operation
    pub duration: std::time::Duration,
}

/// Copy every entry `from` resolves to onto its destination.
///
/// # Errors
///
/// Resolution errors are returned before anything is touched. When more
/// than one pair was resolved, a failing pair is reported as
/// [`Error::Interrupted`] with the number of pairs completed before it.
pub fn copy(disk: &Disk, from: &str, to: &str, options: &TransferOptions) -> Result<TransferStats> {
    transfer(disk, Action::Copy, from, to, options)
}

/// Move every entry `from` resolves to onto its destination.
///
/// # Errors
///
/// Same as [`copy`].
pub fn rename(
    disk: &Disk,
    from: &str,
    to: &str,
    options: &TransferOptions,
) -> Result<TransferStats> {
    transfer(disk, Action::Rename, from, to, options)
}

/// Resolve `from`/`to` and apply `action` to every pair.
pub fn transfer(
    disk: &Disk,
    action: Action,
    from: &str,
    to: &str,
    options: &TransferOptions,
) -> Result<TransferStats> {
    let start = Instant::now();
    let resolution = resolve_mask(disk, from, Some(to), options.recursive)?;
    let pairs = resolution.pairs();
    let total = pairs.len();
    let mut stats = TransferStats::default();

    if total == 0 {
        options.warn(&format!("Nothing matches {from}, nothing to {action}"));
    }

    for (index, (source, destination)) in pairs.into_iter().enumerate() {
        apply::apply_into(
            disk,
            action,
            source,
            destination,
            options.overwrite,
            resolution.recursive,
            options,
            &mut stats,
        )
        .map_err(|e| {
            if total > 1 {
                Error::Interrupted {
                    completed: index,
                    total,
                    from: source.to_owned(),
                    to: destination.to_owned(),
                    source: Box::new(e),
                }
            } else {
                e
            }
        })?;
        stats.pairs += 1;
        options.report_progress((index + 1) as u64, total as u64);
    }

    stats.duration = start.elapsed();
    Ok(stats)
}
