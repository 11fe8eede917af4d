//! Common test utilities for integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory used as the `--root` of the default disk.
pub struct TestFixture {
    pub root: TempDir,
}

impl TestFixture {
    /// Create a fixture with an empty root.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp root"),
        }
    }

    /// Absolute path of a root-relative path.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory and its parents.
    pub fn mkdir(&self, rel: &str) {
        fs::create_dir_all(self.path(rel)).expect("Failed to create directory");
    }

    /// Read a file as text.
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("Failed to read file")
    }

    /// Whether a root-relative path exists.
    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// The `mfs` binary with `--root` pointing at this fixture.
    pub fn mfs(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("mfs");
        cmd.env_remove("RUST_LOG")
            .env_remove("MASKFS_ROOT")
            .arg("--root")
            .arg(self.root.path());
        cmd
    }

    /// Populate the layout most tests start from:
    ///
    /// ```text
    /// docs/a.txt
    /// docs/b.txt
    /// docs/sub/c.txt
    /// reports/2023-q1.csv
    /// reports/2024-q2.csv
    /// ```
    pub fn with_sample_tree(self) -> Self {
        self.write("docs/a.txt", "alpha");
        self.write("docs/b.txt", "bravo");
        self.write("docs/sub/c.txt", "charlie");
        self.write("reports/2023-q1.csv", "q1");
        self.write("reports/2024-q2.csv", "q2");
        self
    }

    /// Check that a file exists and has the expected content.
    pub fn assert_file_content(&self, rel: &str, expected: &str) {
        let path = self.path(rel);
        assert!(path.exists(), "File does not exist: {:?}", path);
        assert_eq!(self.read(rel), expected, "File content mismatch in {rel}");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a single JSON object from command stdout.
pub fn parse_json(stdout: &[u8]) -> serde_json::Value {
    let text = std::str::from_utf8(stdout).expect("stdout is not UTF-8");
    serde_json::from_str(text.trim()).expect("stdout is not a JSON object")
}

/// Canonical form of a directory, as disks report their roots.
pub fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).expect("Failed to canonicalize path")
}
