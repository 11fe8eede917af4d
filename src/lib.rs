//! # maskfs
//!
//! Mask-driven bulk copy, move and delete over a pluggable storage backend.
//!
//! ## Core Features
//!
//! - **Path masks**: `docs/*` takes direct children, any other `*` becomes a
//!   regex capture group matched against a directory listing
//! - **Capture substitution**: destinations reference groups as `$1`, `$2`, ...
//! - **Actionable filtering**: a matched directory subsumes matched entries
//!   inside it, so nothing is acted on twice
//! - **Overwrite and merge policy**: replace destinations, or merge directory
//!   trees file by file while keeping destination-only files
//! - **Pluggable backends**: [`LocalStorage`] for a directory on disk,
//!   [`MemoryStorage`] with an operation log and failure injection
//! - **Atomic local writes**: temp file + `persist_noclobber`, so a copy never
//!   clobbers a destination that appeared after the check
//! - **Mount table**: named disks, ejectable or permanent, merged by common root
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use maskfs::{Disk, TransferBuilder};
//!
//! let disk = Disk::local("/srv/data")?;
//!
//! // reports/2023-q1.csv -> archive/2023.csv
//! let stats = TransferBuilder::copy(&disk, "reports/*-*.csv", "archive/$1.csv").run()?;
//! println!("Copied {} entries", stats.entries_transferred);
//! # Ok::<(), maskfs::Error>(())
//! ```
//!
//! ### Merging Directories
//!
//! ```no_run
//! use maskfs::{Disk, TransferBuilder};
//!
//! let disk = Disk::local("/srv/data")?;
//! let stats = TransferBuilder::rename(&disk, "incoming/*", "library")
//!     .overwrite()
//!     .run()?;
//! println!("Merged {} directories", stats.directories_merged);
//! # Ok::<(), maskfs::Error>(())
//! ```
//!
//! ## Function API
//!
//! ```
//! use maskfs::{Disk, MemoryStorage, TransferOptions, copy, delete, resolve_mask};
//!
//! let storage = MemoryStorage::new();
//! storage.insert_file("docs/a.txt", "a");
//! storage.insert_file("docs/b.txt", "b");
//! storage.insert_file("docs/sub/c.txt", "c");
//! let disk = Disk::new(storage);
//!
//! let resolution = resolve_mask(&disk, "docs/*.txt", None, false)?;
//! assert_eq!(resolution.sources(), vec!["docs/a.txt", "docs/b.txt"]);
//!
//! let options = TransferOptions::default().with_overwrite(true);
//! copy(&disk, "docs/*", "backup", &options)?;
//! delete(&disk, &["docs/*.txt"], &options)?;
//! assert!(disk.exists("backup/sub/c.txt")?);
//! # Ok::<(), maskfs::Error>(())
//! ```
//!
//! ## Failure Semantics
//!
//! Bulk operations run sequentially and stop at the first failing
//! primitive. Nothing is rolled back: pairs applied before the failure stay
//! applied, and [`Error::Interrupted`] reports how many completed.
//!
//! Every resolution lists the backend afresh. Changes made by other
//! processes between listing and acting are not detected.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Progress bar support with indicatif |
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for options, entries and stats |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod disk;
mod entry;
mod error;
mod mask;
mod mounts;
mod options;
mod storage;
mod transfer;
mod utils;

#[cfg(feature = "progress")]
mod progress;

pub use builder::TransferBuilder;
pub use disk::{ContentsByType, Disk};
pub use entry::{DIRECTORY_MIME_TYPE, Entry, EntryKind, Meta, Metadata, Visibility};
pub use error::{Error, ErrorCode, Result};
pub use mask::{
    Catalog, Mask, MaskResolution, MaskShape, Resolved, capture_references, filter_actionable,
    glob_to_regex, list_contents, resolve_mask, static_prefix, substitute,
};
pub use mounts::Mounts;
pub use options::{Action, ProgressCallback, TransferOptions};
pub use storage::{LocalStorage, MemoryStorage, Op, Operation, Storage};
pub use transfer::{
    DeleteStats, Placeholder, Plan, TransferStats, apply, copy, copy_with_replacements, decide,
    delete, delete_directory, rename, transfer,
};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::{create_progress_bar, progress_callback};
