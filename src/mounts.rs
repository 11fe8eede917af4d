//! Named disks.
//!
//! A [`Mounts`] table hands out [`Disk`]s by name. Disks are either
//! permanent or ejectable; only ejectable disks can be removed again.
//!
//! ```no_run
//! use maskfs::Mounts;
//!
//! let mut mounts = Mounts::new();
//! mounts.mount("media", "/srv/media", false)?;
//! mounts.mount("inbox", "/srv/media/inbox", true)?;
//!
//! // The inbox lives under the media root, so the media disk covers both.
//! let disk = mounts.merge("media", "inbox", true)?;
//! assert_eq!(disk.root(), mounts.disk("media")?.root());
//! assert!(!mounts.has_disk("inbox"));
//! # Ok::<(), maskfs::Error>(())
//! ```

use crate::disk::Disk;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// A table of named disks.
#[derive(Debug, Clone, Default)]
pub struct Mounts {
    disks: BTreeMap<String, Disk>,
    ejectable: BTreeSet<String>,
}

impl Mounts {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a local directory as `name`.
    ///
    /// If `name` is already mounted, the existing disk is returned and
    /// `root` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootNotFound`] if `root` is not a directory.
    pub fn mount(&mut self, name: &str, root: impl AsRef<Path>, ejectable: bool) -> Result<Disk> {
        if let Some(disk) = self.disks.get(name) {
            return Ok(disk.clone());
        }
        let disk = Disk::local(root)?;
        Ok(self.mount_disk(name, disk, ejectable))
    }

    /// Mount an existing disk as `name`, returning the one already mounted
    /// under that name if there is one.
    pub fn mount_disk(&mut self, name: &str, disk: Disk, ejectable: bool) -> Disk {
        if let Some(existing) = self.disks.get(name) {
            return existing.clone();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(name, root = disk.root(), ejectable, "mounted disk");

        self.disks.insert(name.to_owned(), disk.clone());
        if ejectable {
            self.ejectable.insert(name.to_owned());
        }
        disk
    }

    /// Mount a local directory anonymously, named after its root.
    pub fn create(&mut self, root: impl AsRef<Path>) -> Result<Disk> {
        let disk = Disk::local(root)?;
        let name = disk.root().to_owned();
        Ok(self.mount_disk(&name, disk, true))
    }

    /// The disk mounted as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiskNotMounted`] if nothing is mounted under `name`.
    pub fn disk(&self, name: &str) -> Result<&Disk> {
        self.disks
            .get(name)
            .ok_or_else(|| Error::DiskNotMounted(name.to_owned()))
    }

    /// Whether a disk is mounted as `name`.
    pub fn has_disk(&self, name: &str) -> bool {
        self.disks.contains_key(name)
    }

    /// Whether the disk mounted as `name` may be ejected.
    ///
    /// Unknown names count as ejectable.
    pub fn is_ejectable(&self, name: &str) -> bool {
        self.ejectable.contains(name) || !self.has_disk(name)
    }

    /// Mounted names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.disks.keys().map(String::as_str)
    }

    /// Unmount an ejectable disk. Ejecting an unknown name does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEjectable`] for permanent disks.
    pub fn eject(&mut self, name: &str) -> Result<()> {
        if !self.is_ejectable(name) {
            return Err(Error::NotEjectable(name.to_owned()));
        }
        self.ejectable.remove(name);
        self.disks.remove(name);
        Ok(())
    }

    fn eject_if_ejectable(&mut self, name: &str) {
        if self.is_ejectable(name) {
            self.ejectable.remove(name);
            self.disks.remove(name);
        }
    }

    /// A disk covering both `a` and `b`.
    ///
    /// If one root contains the other, that disk is returned. Otherwise a
    /// new anonymous disk is created at the deepest common ancestor
    /// directory. With `eject`, the ejectable inputs that were not returned
    /// are unmounted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiskNotMounted`] if either name is unknown, or
    /// [`Error::RootNotFound`] if the common ancestor cannot be opened.
    pub fn merge(&mut self, a: &str, b: &str, eject: bool) -> Result<Disk> {
        let first = self.disk(a)?.clone();
        let second = self.disk(b)?.clone();
        let root_a = PathBuf::from(first.root());
        let root_b = PathBuf::from(second.root());

        if root_b.starts_with(&root_a) {
            if eject && a != b {
                self.eject_if_ejectable(b);
            }
            return Ok(first);
        }
        if root_a.starts_with(&root_b) {
            if eject {
                self.eject_if_ejectable(a);
            }
            return Ok(second);
        }

        let base = common_ancestor(&root_a, &root_b);
        if eject {
            self.eject_if_ejectable(a);
            self.eject_if_ejectable(b);
        }
        self.create(base)
    }
}

/// Deepest directory containing both paths, compared by whole components.
fn common_ancestor(a: &Path, b: &Path) -> PathBuf {
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}
