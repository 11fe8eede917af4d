//! Error handling integration tests for mfs CLI.
//!
//! These tests verify exit codes and messages for:
//! - Missing sources and unknown metadata keys
//! - Invalid masks, capture references and arguments
//! - Conflicts part way through a multi-pair transfer

#[path = "../common/mod.rs"]
mod common;

use common::TestFixture;
use predicates::prelude::*;

#[test]
fn test_missing_source() {
    let fx = TestFixture::new();

    fx.mfs()
        .args(["cp", "missing.txt", "out.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("mfs: error[not_found]"));
}

#[test]
fn test_stat_missing_entry() {
    let fx = TestFixture::new();

    fx.mfs()
        .args(["stat", "nope.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nope.txt"));
}

#[test]
fn test_unknown_metadata_key() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["stat", "docs/a.txt", "--key", "colour"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Could not fetch metadata: colour"));
}

#[test]
fn test_absent_extension_is_invalid_key() {
    let fx = TestFixture::new();
    fx.write("Makefile", "all:");

    fx.mfs()
        .args(["stat", "Makefile", "--key", "extension"])
        .assert()
        .failure()
        .code(2);

    // Without --key the absent field is simply left out.
    fx.mfs()
        .args(["stat", "Makefile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extension").not());
}

#[test]
fn test_capture_reference_out_of_range() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["cp", "docs/*.txt", "out/$2.txt"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("error[invalid_input]"))
        .stderr(predicate::str::contains("$2"));

    assert!(!fx.exists("out"));
}

#[test]
fn test_capture_reference_on_shallow_mask() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["cp", "docs/*", "out/$1"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_path_outside_root() {
    let fx = TestFixture::new();

    fx.mfs()
        .args(["cp", "../escape.txt", "in.txt"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("escapes the disk root"));
}

#[test]
fn test_invalid_mount_argument() {
    let fx = TestFixture::new();

    fx.mfs()
        .args(["--mount", "nameonly", "ls"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid mount 'nameonly'"));
}

#[test]
fn test_mount_root_missing() {
    let fx = TestFixture::new();
    let missing = fx.path("does-not-exist");

    fx.mfs()
        .arg("--mount")
        .arg(format!("gone={}", missing.display()))
        .arg("ls")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_default_root_missing() {
    let fx = TestFixture::new();

    assert_cmd::cargo::cargo_bin_cmd!("mfs")
        .env_remove("MASKFS_ROOT")
        .arg("--root")
        .arg(fx.path("nowhere"))
        .arg("ls")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_invalid_replacement_argument() {
    let fx = TestFixture::new();
    fx.write("t.txt", "{{ a }}");

    fx.mfs()
        .args(["render", "t.txt", "o.txt", "--set", "novalue"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("expected KEY=VALUE"));

    assert!(!fx.exists("o.txt"));
}

#[test]
fn test_interrupted_transfer_keeps_completed_pairs() {
    let fx = TestFixture::new();
    fx.write("src/a.txt", "a");
    fx.write("src/b.txt", "b");
    fx.write("src/c.txt", "c");
    fx.write("dst/b.txt", "existing");

    fx.mfs()
        .args(["cp", "src/*.txt", "dst"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error[interrupted]"))
        .stderr(predicate::str::contains("after 1 of 3 entries"));

    // The first pair stays applied, the conflicting one is untouched and the
    // rest never ran.
    fx.assert_file_content("dst/a.txt", "a");
    fx.assert_file_content("dst/b.txt", "existing");
    assert!(!fx.exists("dst/c.txt"));
}

#[test]
fn test_missing_subcommand() {
    let fx = TestFixture::new();
    fx.mfs().assert().failure().code(2);
}

#[test]
fn test_rm_requires_paths() {
    let fx = TestFixture::new();
    fx.mfs()
        .arg("rm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
