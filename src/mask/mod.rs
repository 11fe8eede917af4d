//! Mask resolution.
//!
//! Turns a source expression and an optional destination expression into a
//! concrete, ordered set of `(source, destination)` paths.
//!
//! | Source shape | Sources | Destinations |
//! |--------------|---------|--------------|
//! | no `*` | the expression itself | the destination itself |
//! | `prefix/*` | direct children of `prefix` | `prefix` span replaced, forces recursive |
//! | anything else | regex matches in the listing of the static prefix, actionable only | `$n` substituted, or static prefix span replaced |
//!
//! Every resolution lists the backend afresh. Entries created or removed
//! between resolution and the transfer that uses it are not accounted for.
//!
//! # Example
//!
//! ```
//! use maskfs::{Disk, MemoryStorage, resolve_mask};
//!
//! let storage = MemoryStorage::new();
//! storage.insert_file("reports/2023-q1.csv", "");
//! let disk = Disk::new(storage);
//!
//! let resolution = resolve_mask(&disk, "reports/*-*.csv", Some("archive/$1.csv"), false)?;
//! assert_eq!(resolution.pairs(), vec![("reports/2023-q1.csv", "archive/2023.csv")]);
//! # Ok::<(), maskfs::Error>(())
//! ```

mod actionable;
mod catalog;
mod glob;

pub use actionable::filter_actionable;
pub use catalog::Catalog;
pub use glob::{Mask, MaskShape, capture_references, glob_to_regex, static_prefix, substitute};

use crate::disk::Disk;
use crate::entry::Entry;
use crate::error::Result;
use crate::utils::path;

/// Resolved paths, collapsed to a scalar when there is exactly one source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Resolved {
    /// Exactly one source
    Single {
        /// Source path
        from: String,
        /// Destination path, if one was requested
        to: Option<String>,
    },
    /// Zero or several sources
    Many {
        /// Source paths
        from: Vec<String>,
        /// Destination paths, same length as `from`, if requested
        to: Option<Vec<String>>,
    },
}

/// Outcome of [`resolve_mask`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskResolution {
    /// The resolved paths
    pub resolved: Resolved,
    /// Effective recursive flag (forced on for shallow masks with a destination)
    pub recursive: bool,
}

impl MaskResolution {
    fn new(from: Vec<String>, to: Option<Vec<String>>, recursive: bool) -> Self {
        let resolved = if from.len() == 1 {
            let mut from = from;
            let single = from.pop().unwrap_or_default();
            Resolved::Single {
                from: single,
                to: to.and_then(|mut t| t.pop()),
            }
        } else {
            Resolved::Many { from, to }
        };
        Self {
            resolved,
            recursive,
        }
    }

    /// Source paths in order.
    pub fn sources(&self) -> Vec<&str> {
        match &self.resolved {
            Resolved::Single { from, .. } => vec![from.as_str()],
            Resolved::Many { from, .. } => from.iter().map(String::as_str).collect(),
        }
    }

    /// Destination paths in order, if a destination was given.
    pub fn destinations(&self) -> Option<Vec<&str>> {
        match &self.resolved {
            Resolved::Single { to, .. } => to.as_deref().map(|t| vec![t]),
            Resolved::Many { to, .. } => to
                .as_ref()
                .map(|t| t.iter().map(String::as_str).collect()),
        }
    }

    /// `(source, destination)` pairs; empty when no destination was given.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        match self.destinations() {
            Some(destinations) => self.sources().into_iter().zip(destinations).collect(),
            None => Vec::new(),
        }
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        match &self.resolved {
            Resolved::Single { .. } => 1,
            Resolved::Many { from, .. } => from.len(),
        }
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve a source expression and optional destination into concrete paths.
///
/// Both expressions are normalized against the disk root first. `recursive`
/// decides whether a general mask is matched against a recursive listing;
/// shallow masks always look at direct children only.
///
/// # Errors
///
/// - [`Error::AmbiguousCaptureReference`](crate::Error::AmbiguousCaptureReference)
///   if the destination references a group the source does not produce
/// - [`Error::OutsideRoot`](crate::Error::OutsideRoot) for paths escaping the root
/// - [`Error::Backend`](crate::Error::Backend) if listing fails
///
/// Zero matches is not an error.
pub fn resolve_mask(
    disk: &Disk,
    from: &str,
    to: Option<&str>,
    recursive: bool,
) -> Result<MaskResolution> {
    let from = disk.normalize(from)?;
    let to = to.map(|t| disk.normalize(t)).transpose()?;
    let mask = Mask::new(&from)?;

    if let Some(destination) = &to {
        if mask.is_wildcard() {
            mask.check_references(destination)?;
        }
    }

    let entries = match mask.shape() {
        MaskShape::Literal => {
            return Ok(MaskResolution::new(
                vec![from],
                to.map(|t| vec![t]),
                recursive,
            ));
        }
        MaskShape::Shallow { prefix } => Catalog::capture(disk, prefix, false)?.into_entries(),
        MaskShape::General { static_prefix } => {
            let catalog = Catalog::capture(disk, static_prefix, recursive)?;
            filter_actionable(catalog.matching(&mask))
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(mask = %from, matches = entries.len(), "resolved mask");

    let sources: Vec<String> = entries.into_iter().map(|e| e.path).collect();
    let Some(destination) = to else {
        return Ok(MaskResolution::new(sources, None, recursive));
    };

    match mask.shape() {
        MaskShape::Shallow { prefix } => {
            let destinations = sources
                .iter()
                .map(|source| rebase_onto(source, prefix, &destination))
                .collect();
            Ok(MaskResolution::new(sources, Some(destinations), true))
        }
        _ => {
            let base = static_prefix(&from);
            let has_references = !capture_references(&destination).is_empty();
            let destinations = sources
                .iter()
                .map(|source| match mask.captures(source) {
                    Some(captures) if has_references => substitute(&destination, &captures),
                    _ => rebase_onto(source, base, &destination),
                })
                .collect();
            Ok(MaskResolution::new(sources, Some(destinations), recursive))
        }
    }
}

fn rebase_onto(source: &str, prefix: &str, destination: &str) -> String {
    path::rebase(source, prefix, destination)
        .unwrap_or_else(|| path::join(destination, path::basename(source)))
}

/// List a directory, or the entries a mask matches.
///
/// `None` lists the disk root. A literal path lists that directory; a mask
/// returns the matching entries of its catalog without actionable filtering.
pub fn list_contents(disk: &Disk, directory: Option<&str>, recursive: bool) -> Result<Vec<Entry>> {
    let expr = disk.normalize(directory.unwrap_or(""))?;
    let mask = Mask::new(&expr)?;
    match mask.shape() {
        MaskShape::Literal => disk.list(&expr, recursive),
        MaskShape::Shallow { prefix } => {
            let catalog = Catalog::capture(disk, prefix, recursive)?;
            Ok(catalog
                .entries()
                .iter()
                .filter(|e| recursive || path::dirname(&e.path) == prefix)
                .cloned()
                .collect())
        }
        MaskShape::General { static_prefix } => {
            Ok(Catalog::capture(disk, static_prefix, recursive)?.matching(&mask))
        }
    }
}

/// Paths a resolution would act on, split by kind as of resolution time.
pub(crate) fn resolve_entries(disk: &Disk, expr: &str) -> Result<Vec<Entry>> {
    let expr = disk.normalize(expr)?;
    let mask = Mask::new(&expr)?;
    match mask.shape() {
        MaskShape::Literal => Ok(disk
            .kind_if_exists(&expr)?
            .map(|kind| Entry {
                path: expr.clone(),
                kind,
            })
            .into_iter()
            .collect()),
        MaskShape::Shallow { .. } | MaskShape::General { .. } => {
            let base = static_prefix(&expr);
            let catalog = Catalog::capture(disk, base, true)?;
            Ok(filter_actionable(catalog.matching(&mask)))
        }
    }
}
