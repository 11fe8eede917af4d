//! Configuration options for transfers.
//!
//! This module provides [`TransferOptions`] for configuring how resolved
//! pairs are applied and [`Action`] for choosing between copy and move.
//!
//! # Example
//!
//! ```
//! use maskfs::TransferOptions;
//!
//! let options = TransferOptions::default()
//!     .with_overwrite(true)
//!     .with_recursive(true);
//! ```

use std::fmt;
use std::sync::Arc;

/// The primitive a transfer applies to each resolved pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Action {
    /// Leave the source in place
    Copy,
    /// Remove the source once the destination is written
    Rename,
}

impl Action {
    /// Name of the backend primitive (`copy` / `rename`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Rename => "rename",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress callback: `(pairs completed, total pairs)`.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Options for copy and rename operations.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `overwrite` | `false` | Leave conflicts to the backend |
/// | `recursive` | `false` | Replace directories instead of merging |
///
/// With `overwrite` off, an existing destination is handed to the backend
/// as is, which normally refuses it. With `overwrite` on, the destination is
/// deleted first, unless both sides are directories and `recursive` is on,
/// in which case the source is merged file by file into the destination.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferOptions {
    /// Replace existing destinations
    pub overwrite: bool,

    /// Merge directories into existing directories, and match general masks
    /// against a recursive listing
    pub recursive: bool,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    /// Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,

    /// Callback for one line per applied pair (optional)
    ///
    /// Falls back to `tracing::debug!` under the `tracing` feature.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub verbose_handler: Option<fn(&str)>,

    /// Called after each top-level pair completes
    #[cfg_attr(feature = "serde", serde(skip))]
    pub progress: Option<ProgressCallback>,
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("overwrite", &self.overwrite)
            .field("recursive", &self.recursive)
            .field("warn_handler", &self.warn_handler.is_some())
            .field("verbose_handler", &self.verbose_handler.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl TransferOptions {
    /// Replace existing destinations
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Merge directories recursively
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Create options with a per-operation message handler
    #[must_use]
    pub fn with_verbose_handler(mut self, handler: fn(&str)) -> Self {
        self.verbose_handler = Some(handler);
        self
    }

    /// Report progress over resolved pairs
    #[must_use]
    pub fn with_progress(mut self, callback: impl Fn(u64, u64) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }

    pub(crate) fn verbose(&self, msg: &str) {
        if let Some(handler) = self.verbose_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("{}", msg);
        }
    }

    pub(crate) fn report_progress(&self, done: u64, total: u64) {
        if let Some(progress) = &self.progress {
            progress(done, total);
        }
    }
}
