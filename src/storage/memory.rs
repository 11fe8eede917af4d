//! In-memory backend.
//!
//! Mirrors the conflict semantics of [`LocalStorage`](super::LocalStorage)
//! and additionally records every primitive call and can be told to fail
//! specific calls. That makes it the backend of choice for asserting which
//! primitives a transfer issued and in what order.
//!
//! ```
//! use maskfs::{Disk, MemoryStorage, Op};
//! use std::sync::Arc;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! storage.insert_file("docs/a.txt", "hello");
//! storage.fail_on(Op::Copy, "docs/a.txt");
//!
//! let disk = Disk::from_shared(storage.clone());
//! assert!(disk.copy_raw("docs/a.txt", "b.txt").is_err());
//! assert_eq!(storage.count(Op::Copy), 1);
//! ```

use super::{Storage, already_exists, not_found};
use crate::entry::{DIRECTORY_MIME_TYPE, Entry, EntryKind, Metadata, Visibility};
use crate::utils::path;
use std::collections::BTreeMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// Primitive call kinds recorded by [`MemoryStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `exists`
    Exists,
    /// `kind`
    Kind,
    /// `metadata`
    Metadata,
    /// `list`
    List,
    /// `read`
    Read,
    /// `write`
    Write,
    /// `copy`
    Copy,
    /// `rename`
    Rename,
    /// `delete`
    Delete,
    /// `make_directory`
    MakeDirectory,
    /// `delete_directory`
    DeleteDirectory,
    /// `delete_empty_directory`
    DeleteEmptyDirectory,
    /// `visibility`
    Visibility,
    /// `set_visibility`
    SetVisibility,
}

/// One recorded primitive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Which primitive
    pub op: Op,
    /// First path argument
    pub path: String,
    /// Second path argument (`copy` / `rename` destination)
    pub target: Option<String>,
}

#[derive(Debug, Clone)]
struct Node {
    kind: EntryKind,
    contents: Vec<u8>,
    visibility: Visibility,
    modified: SystemTime,
}

impl Node {
    fn file(contents: Vec<u8>, visibility: Visibility) -> Self {
        Self {
            kind: EntryKind::File,
            contents,
            visibility,
            modified: SystemTime::now(),
        }
    }

    fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            contents: Vec::new(),
            visibility: Visibility::Public,
            modified: SystemTime::now(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    log: Vec<Operation>,
    failures: Vec<(Op, String)>,
}

impl State {
    fn record(&mut self, op: Op, path: &str, target: Option<&str>) -> io::Result<()> {
        self.log.push(Operation {
            op,
            path: path.to_owned(),
            target: target.map(str::to_owned),
        });

        if self.failures.iter().any(|(o, p)| *o == op && p == path) {
            return Err(io::Error::other(format!("injected {op:?} failure: {path}")));
        }
        Ok(())
    }

    fn kind(&self, path: &str) -> Option<EntryKind> {
        if path.is_empty() {
            return Some(EntryKind::Directory);
        }
        self.nodes.get(path).map(|n| n.kind)
    }

    fn ensure_parents(&mut self, path: &str) -> io::Result<()> {
        let mut ancestors = Vec::new();
        let mut current = path::dirname(path);
        while !current.is_empty() {
            ancestors.push(current);
            current = path::dirname(current);
        }

        for ancestor in ancestors.into_iter().rev() {
            match self.nodes.get(ancestor).map(|n| n.kind) {
                Some(EntryKind::Directory) => {}
                Some(EntryKind::File) => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("not a directory: {ancestor}"),
                    ));
                }
                None => {
                    self.nodes.insert(ancestor.to_owned(), Node::directory());
                }
            }
        }
        Ok(())
    }

    /// The node at `path` and every node below it, keyed by full path.
    fn subtree(&self, path: &str) -> Vec<(String, Node)> {
        self.nodes
            .range(path.to_owned()..)
            .take_while(|(key, _)| key.starts_with(path))
            .filter(|(key, _)| key.as_str() == path || path::is_descendant(key, path))
            .map(|(key, node)| (key.clone(), node.clone()))
            .collect()
    }

    fn check_transfer(&self, from: &str, to: &str) -> io::Result<()> {
        if from.is_empty() || to.is_empty() || path::is_descendant(to, from) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot move {from} into {to}"),
            ));
        }
        if self.kind(from).is_none() {
            return Err(not_found(from));
        }
        if self.kind(to).is_some() {
            return Err(already_exists(to));
        }
        Ok(())
    }

    fn place(&mut self, from: &str, to: &str, subtree: Vec<(String, Node)>) {
        for (key, node) in subtree {
            if let Some(dest) = path::rebase(&key, from, to) {
                self.nodes.insert(dest, node);
            }
        }
    }
}

/// A [`Storage`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    root: String,
    state: Mutex<State>,
}

impl MemoryStorage {
    /// Create an empty store rooted at `""`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that reports `root` as its display root.
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            state: Mutex::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a file (and its parents) without recording an operation.
    pub fn insert_file(&self, path: &str, contents: impl AsRef<[u8]>) {
        let mut state = self.lock();
        if state.ensure_parents(path).is_ok() {
            state.nodes.insert(
                path.to_owned(),
                Node::file(contents.as_ref().to_vec(), Visibility::Public),
            );
        }
    }

    /// Seed a directory (and its parents) without recording an operation.
    pub fn insert_directory(&self, path: &str) {
        let mut state = self.lock();
        if state.ensure_parents(path).is_ok() {
            state
                .nodes
                .entry(path.to_owned())
                .or_insert_with(Node::directory);
        }
    }

    /// Make every future `op` call on exactly `path` fail.
    pub fn fail_on(&self, op: Op, path: &str) {
        self.lock().failures.push((op, path.to_owned()));
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Every primitive call so far, in order.
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().log.clone()
    }

    /// Number of recorded calls of one kind.
    pub fn count(&self, op: Op) -> usize {
        self.lock().log.iter().filter(|o| o.op == op).count()
    }

    /// Forget recorded calls.
    pub fn clear_operations(&self) {
        self.lock().log.clear();
    }

    /// Contents of a file, bypassing the operation log.
    pub fn file_contents(&self, path: &str) -> Option<Vec<u8>> {
        self.lock()
            .nodes
            .get(path)
            .filter(|n| n.kind == EntryKind::File)
            .map(|n| n.contents.clone())
    }

    /// All stored paths in sorted order, bypassing the operation log.
    pub fn paths(&self) -> Vec<String> {
        self.lock().nodes.keys().cloned().collect()
    }
}

impl Storage for MemoryStorage {
    fn root(&self) -> &str {
        &self.root
    }

    fn exists(&self, path: &str) -> io::Result<bool> {
        let mut state = self.lock();
        state.record(Op::Exists, path, None)?;
        Ok(state.kind(path).is_some())
    }

    fn kind(&self, path: &str) -> io::Result<EntryKind> {
        let mut state = self.lock();
        state.record(Op::Kind, path, None)?;
        state.kind(path).ok_or_else(|| not_found(path))
    }

    fn metadata(&self, path: &str) -> io::Result<Metadata> {
        let mut state = self.lock();
        state.record(Op::Metadata, path, None)?;

        if path.is_empty() {
            let root = Node::directory();
            return Ok(Metadata {
                kind: EntryKind::Directory,
                size: 0,
                mime_type: DIRECTORY_MIME_TYPE.to_owned(),
                last_modified: root.modified,
                visibility: root.visibility,
            });
        }

        let node = state.nodes.get(path).ok_or_else(|| not_found(path))?;
        let mime_type = match node.kind {
            EntryKind::Directory => DIRECTORY_MIME_TYPE.to_owned(),
            EntryKind::File => mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_owned(),
        };
        Ok(Metadata {
            kind: node.kind,
            size: node.contents.len() as u64,
            mime_type,
            last_modified: node.modified,
            visibility: node.visibility,
        })
    }

    fn list(&self, directory: &str, recursive: bool) -> io::Result<Vec<Entry>> {
        let mut state = self.lock();
        state.record(Op::List, directory, None)?;

        if state.kind(directory) != Some(EntryKind::Directory) {
            return Ok(Vec::new());
        }

        Ok(state
            .nodes
            .iter()
            .filter(|(key, _)| path::is_descendant(key, directory))
            .filter(|(key, _)| recursive || path::dirname(key) == directory)
            .map(|(key, node)| Entry {
                path: key.clone(),
                kind: node.kind,
            })
            .collect())
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let mut state = self.lock();
        state.record(Op::Read, path, None)?;
        match state.nodes.get(path) {
            Some(node) if node.kind == EntryKind::File => Ok(node.contents.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path}"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write(
        &self,
        path: &str,
        contents: &[u8],
        visibility: Option<Visibility>,
    ) -> io::Result<()> {
        let mut state = self.lock();
        state.record(Op::Write, path, None)?;
        if state.kind(path) == Some(EntryKind::Directory) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path}"),
            ));
        }
        state.ensure_parents(path)?;
        state.nodes.insert(
            path.to_owned(),
            Node::file(contents.to_vec(), visibility.unwrap_or_default()),
        );
        Ok(())
    }

    fn copy(&self, from: &str, to: &str) -> io::Result<()> {
        let mut state = self.lock();
        state.record(Op::Copy, from, Some(to))?;
        state.check_transfer(from, to)?;
        state.ensure_parents(to)?;

        let subtree = state.subtree(from);
        state.place(from, to, subtree);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        let mut state = self.lock();
        state.record(Op::Rename, from, Some(to))?;
        state.check_transfer(from, to)?;
        state.ensure_parents(to)?;

        let subtree = state.subtree(from);
        for (key, _) in &subtree {
            state.nodes.remove(key);
        }
        state.place(from, to, subtree);
        Ok(())
    }

    fn delete(&self, path: &str) -> io::Result<()> {
        let mut state = self.lock();
        state.record(Op::Delete, path, None)?;
        match state.kind(path) {
            Some(EntryKind::File) => {
                state.nodes.remove(path);
                Ok(())
            }
            Some(EntryKind::Directory) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path}"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn make_directory(&self, path: &str) -> io::Result<()> {
        let mut state = self.lock();
        state.record(Op::MakeDirectory, path, None)?;
        match state.kind(path) {
            Some(EntryKind::Directory) => Ok(()),
            Some(EntryKind::File) => Err(already_exists(path)),
            None => {
                state.ensure_parents(path)?;
                state.nodes.insert(path.to_owned(), Node::directory());
                Ok(())
            }
        }
    }

    fn delete_directory(&self, path: &str) -> io::Result<()> {
        let mut state = self.lock();
        state.record(Op::DeleteDirectory, path, None)?;
        if path.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "refusing to delete the disk root",
            ));
        }
        match state.kind(path) {
            Some(EntryKind::Directory) => {
                state
                    .nodes
                    .retain(|key, _| key != path && !path::is_descendant(key, path));
                Ok(())
            }
            Some(EntryKind::File) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {path}"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn delete_empty_directory(&self, path: &str) -> io::Result<()> {
        let mut state = self.lock();
        state.record(Op::DeleteEmptyDirectory, path, None)?;
        if path.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "refusing to delete the disk root",
            ));
        }
        match state.kind(path) {
            Some(EntryKind::Directory) => {
                if state.nodes.keys().any(|key| path::is_descendant(key, path)) {
                    return Err(io::Error::new(
                        io::ErrorKind::DirectoryNotEmpty,
                        format!("directory not empty: {path}"),
                    ));
                }
                state.nodes.remove(path);
                Ok(())
            }
            Some(EntryKind::File) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {path}"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn visibility(&self, path: &str) -> io::Result<Visibility> {
        let mut state = self.lock();
        state.record(Op::Visibility, path, None)?;
        state
            .nodes
            .get(path)
            .map(|n| n.visibility)
            .ok_or_else(|| not_found(path))
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> io::Result<()> {
        let mut state = self.lock();
        state.record(Op::SetVisibility, path, None)?;
        let node = state.nodes.get_mut(path).ok_or_else(|| not_found(path))?;
        node.visibility = visibility;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
