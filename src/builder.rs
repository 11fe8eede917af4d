//! Builder API for ergonomic transfers.
//!
//! The builder pattern provides a fluent interface for configuring and
//! executing copy and rename operations. This is often more convenient than
//! manually constructing [`TransferOptions`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use maskfs::{Disk, TransferBuilder};
//!
//! let disk = Disk::local("/srv/data")?;
//! let stats = TransferBuilder::copy(&disk, "docs/*.txt", "backup").run()?;
//! println!("Applied {} pairs", stats.pairs);
//! # Ok::<(), maskfs::Error>(())
//! ```
//!
//! ## Merging Directories
//!
//! ```no_run
//! use maskfs::{Disk, TransferBuilder};
//!
//! let disk = Disk::local("/srv/data")?;
//! let stats = TransferBuilder::rename(&disk, "incoming", "library")
//!     .overwrite()   // Replace files that exist on both sides
//!     .recursive()   // Merge instead of replacing the whole directory
//!     .run()?;
//! # Ok::<(), maskfs::Error>(())
//! ```

use crate::disk::Disk;
use crate::error::Result;
use crate::options::{Action, TransferOptions};
use crate::transfer::{TransferStats, transfer};

/// A builder for configuring and executing transfers on one disk.
///
/// # Example
///
/// ```
/// use maskfs::{Disk, MemoryStorage, TransferBuilder};
///
/// let storage = MemoryStorage::new();
/// storage.insert_file("reports/2023-q1.csv", "q1");
/// let disk = Disk::new(storage);
///
/// TransferBuilder::copy(&disk, "reports/*-*.csv", "archive/$1.csv").run()?;
/// assert!(disk.exists("archive/2023.csv")?);
/// # Ok::<(), maskfs::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TransferBuilder<'a> {
    disk: &'a Disk,
    action: Action,
    from: String,
    to: String,
    options: TransferOptions,
}

impl<'a> TransferBuilder<'a> {
    /// Create a builder for `action` with default options.
    pub fn new(disk: &'a Disk, action: Action, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            disk,
            action,
            from: from.into(),
            to: to.into(),
            options: TransferOptions::default(),
        }
    }

    /// Create a copy builder.
    pub fn copy(disk: &'a Disk, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(disk, Action::Copy, from, to)
    }

    /// Create a rename (move) builder.
    pub fn rename(disk: &'a Disk, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(disk, Action::Rename, from, to)
    }

    /// Replace existing destinations.
    #[must_use]
    pub fn overwrite(mut self) -> Self {
        self.options = self.options.with_overwrite(true);
        self
    }

    /// Merge directories and match general masks recursively.
    #[must_use]
    pub fn recursive(mut self) -> Self {
        self.options = self.options.with_recursive(true);
        self
    }

    /// Set a warning handler for non-fatal issues.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use maskfs::{Disk, TransferBuilder};
    ///
    /// let disk = Disk::local("/srv/data")?;
    /// let stats = TransferBuilder::copy(&disk, "docs/*.pdf", "out")
    ///     .on_warning(|msg| eprintln!("Warning: {}", msg))
    ///     .run()?;
    /// # Ok::<(), maskfs::Error>(())
    /// ```
    #[must_use]
    pub fn on_warning(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Enable one message per primitive issued.
    #[must_use]
    pub fn verbose(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_verbose_handler(handler);
        self
    }

    /// Report progress over resolved pairs.
    #[must_use]
    pub fn on_progress(mut self, callback: impl Fn(u64, u64) + Send + Sync + 'static) -> Self {
        self.options = self.options.with_progress(callback);
        self
    }

    /// Get a reference to the current options.
    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    /// Resolve and apply the transfer.
    ///
    /// # Errors
    ///
    /// See [`copy`](crate::copy).
    pub fn run(self) -> Result<TransferStats> {
        transfer(self.disk, self.action, &self.from, &self.to, &self.options)
    }
}
