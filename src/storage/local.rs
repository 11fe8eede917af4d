//! Local directory backend.
//!
//! Files are written and copied through a temporary file in the destination
//! directory that is then persisted into place, so a destination never holds
//! a half-written file. Symlinks are never followed and never listed.

use super::{Storage, already_exists, not_found};
use crate::entry::{DIRECTORY_MIME_TYPE, Entry, EntryKind, Metadata, Visibility};
use crate::utils::path;
use filetime::{FileTime, set_file_times};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Housekeeping files created by desktop environments and file managers.
const SYSTEM_FILES: &[&str] = &[
    "*~",
    ".directory",
    ".Trash-*",
    ".DS_Store",
    ".AppleDouble",
    ".LSOverride",
    "Icon\r",
    ".DocumentRevisions-V100",
    ".fseventsd",
    ".Spotlight-V100",
    ".TemporaryItems",
    ".Trashes",
    ".VolumeIcon.icns",
    ".AppleDB",
    ".AppleDesktop",
    ".apdisk",
    "Thumbs.db",
    "ehthumbs.db",
    "Desktop.ini",
    "$RECYCLE.BIN",
    "*.lnk",
];

/// A [`Storage`] rooted at a directory on the local filesystem.
///
/// # Example
///
/// ```no_run
/// use maskfs::{Disk, LocalStorage};
///
/// let storage = LocalStorage::new("/srv/data")?.include_system_files();
/// let disk = Disk::new(storage);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    display_root: String,
    system_files: Option<GlobSet>,
}

impl LocalStorage {
    /// Open a backend rooted at `root`.
    ///
    /// The root is canonicalized so that absolute caller paths under it can
    /// be recognized and stripped.
    ///
    /// # Errors
    ///
    /// Fails if `root` does not exist or is not a directory.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", root.display()),
            ));
        }

        let display_root = root.to_string_lossy().replace('\\', "/");
        Ok(Self {
            root,
            display_root,
            system_files: Some(system_file_set()?),
        })
    }

    /// List OS housekeeping files (`.DS_Store`, `Thumbs.db`, ...) too.
    #[must_use]
    pub fn include_system_files(mut self) -> Self {
        self.system_files = None;
        self
    }

    /// Absolute root directory.
    pub fn root_path(&self) -> &Path {
        &self.root
    }

    fn full(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    fn is_system_file(&self, name: &str) -> bool {
        self.system_files
            .as_ref()
            .is_some_and(|set| set.is_match(name))
    }

    fn collect(
        &self,
        dir: &Path,
        rel: &str,
        recursive: bool,
        out: &mut Vec<Entry>,
    ) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                #[cfg(feature = "tracing")]
                tracing::warn!(dir = %dir.display(), "skipping entry with non UTF-8 name");
                continue;
            };
            if self.is_system_file(name) {
                continue;
            }

            let rel_path = path::join(rel, name);
            // Check symlink FIRST (before is_dir/is_file which follow symlinks)
            let file_type = entry.file_type()?;

            if file_type.is_symlink() {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %rel_path, "skipping symlink");
            } else if file_type.is_dir() {
                out.push(Entry::directory(rel_path.clone()));
                if recursive {
                    self.collect(&entry.path(), &rel_path, true, out)?;
                }
            } else if file_type.is_file() {
                out.push(Entry::file(rel_path));
            } else {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %rel_path, "skipping special file");
            }
        }

        Ok(())
    }
}

fn system_file_set() -> io::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in SYSTEM_FILES {
        let glob = Glob::new(pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
}

fn kind_of(meta: &fs::Metadata) -> EntryKind {
    if meta.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}

#[cfg(unix)]
fn visibility_of(meta: &fs::Metadata) -> Visibility {
    use std::os::unix::fs::PermissionsExt;
    if meta.permissions().mode() & 0o077 == 0 {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

#[cfg(not(unix))]
fn visibility_of(_meta: &fs::Metadata) -> Visibility {
    Visibility::Public
}

#[cfg(unix)]
fn apply_visibility(target: &Path, kind: EntryKind, visibility: Visibility) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = match (kind, visibility) {
        (EntryKind::Directory, Visibility::Public) => 0o755,
        (EntryKind::Directory, Visibility::Private) => 0o700,
        (EntryKind::File, Visibility::Public) => 0o644,
        (EntryKind::File, Visibility::Private) => 0o600,
    };
    fs::set_permissions(target, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_visibility(_target: &Path, _kind: EntryKind, _visibility: Visibility) -> io::Result<()> {
    Ok(())
}

fn ensure_parent(target: &Path) -> io::Result<&Path> {
    let parent = target.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;
    Ok(parent)
}

/// Copy one file through a temp file, refusing to clobber `dst`.
fn copy_file(src: &Path, dst: &Path, src_meta: &fs::Metadata) -> io::Result<()> {
    let parent = ensure_parent(dst)?;
    let mut src_file = File::open(src)?;

    // Create temp file in destination directory for atomic rename
    let temp_file = tempfile::NamedTempFile::new_in(parent)?;
    io::copy(&mut src_file, &mut temp_file.as_file())?;
    temp_file.as_file().sync_all()?;
    fs::set_permissions(temp_file.path(), src_meta.permissions())?;

    // persist_noclobber fails if the destination appeared since the check
    temp_file.persist_noclobber(dst).map_err(|e| e.error)?;

    // Timestamps are best effort
    let mtime = FileTime::from_last_modification_time(src_meta);
    let atime = FileTime::from_last_access_time(src_meta);
    let _ = set_file_times(dst, atime, mtime);

    Ok(())
}

fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    ensure_parent(dst)?;
    fs::create_dir(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_symlink() {
            continue;
        } else if file_type.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            let meta = entry.metadata()?;
            copy_file(&src_path, &dst_path, &meta)?;
        }
    }

    Ok(())
}

impl Storage for LocalStorage {
    fn root(&self) -> &str {
        &self.display_root
    }

    fn exists(&self, path: &str) -> io::Result<bool> {
        match fs::symlink_metadata(self.full(path)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn kind(&self, path: &str) -> io::Result<EntryKind> {
        fs::symlink_metadata(self.full(path)).map(|m| kind_of(&m))
    }

    fn metadata(&self, path: &str) -> io::Result<Metadata> {
        let meta = fs::symlink_metadata(self.full(path))?;
        let kind = kind_of(&meta);
        let (size, mime_type) = match kind {
            EntryKind::Directory => (0, DIRECTORY_MIME_TYPE.to_owned()),
            EntryKind::File => (
                meta.len(),
                mime_guess::from_path(path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_owned(),
            ),
        };

        Ok(Metadata {
            kind,
            size,
            mime_type,
            last_modified: meta.modified()?,
            visibility: visibility_of(&meta),
        })
    }

    fn list(&self, directory: &str, recursive: bool) -> io::Result<Vec<Entry>> {
        let dir = self.full(directory);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        self.collect(&dir, directory, recursive, &mut entries)?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.full(path))
    }

    fn write(
        &self,
        path: &str,
        contents: &[u8],
        visibility: Option<Visibility>,
    ) -> io::Result<()> {
        let target = self.full(path);
        let parent = ensure_parent(&target)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;
        apply_visibility(
            temp_file.path(),
            EntryKind::File,
            visibility.unwrap_or_default(),
        )?;
        temp_file.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }

    fn copy(&self, from: &str, to: &str) -> io::Result<()> {
        let src = self.full(from);
        let dst = self.full(to);
        let src_meta = fs::symlink_metadata(&src)?;
        if self.exists(to)? {
            return Err(already_exists(to));
        }

        if src_meta.is_dir() {
            copy_tree(&src, &dst)
        } else {
            copy_file(&src, &dst, &src_meta)
        }
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        if !self.exists(from)? {
            return Err(not_found(from));
        }
        if self.exists(to)? {
            return Err(already_exists(to));
        }

        let dst = self.full(to);
        ensure_parent(&dst)?;
        fs::rename(self.full(from), dst)
    }

    fn delete(&self, path: &str) -> io::Result<()> {
        let target = self.full(path);
        if fs::symlink_metadata(&target)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path}"),
            ));
        }
        fs::remove_file(target)
    }

    fn make_directory(&self, path: &str) -> io::Result<()> {
        fs::create_dir_all(self.full(path))
    }

    fn delete_directory(&self, path: &str) -> io::Result<()> {
        if path.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "refusing to delete the disk root",
            ));
        }

        let target = self.full(path);
        if !fs::symlink_metadata(&target)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {path}"),
            ));
        }
        fs::remove_dir_all(target)
    }

    fn delete_empty_directory(&self, path: &str) -> io::Result<()> {
        if path.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "refusing to delete the disk root",
            ));
        }
        fs::remove_dir(self.full(path))
    }

    fn visibility(&self, path: &str) -> io::Result<Visibility> {
        fs::symlink_metadata(self.full(path)).map(|m| visibility_of(&m))
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> io::Result<()> {
        let target = self.full(path);
        let kind = kind_of(&fs::symlink_metadata(&target)?);
        apply_visibility(&target, kind, visibility)
    }
}

// =============================================================================
// Tests
// =============================================================================
