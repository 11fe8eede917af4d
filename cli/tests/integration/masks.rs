//! Mask resolution integration tests for mfs CLI.
//!
//! These tests cover how path masks expand on the command line:
//! - Shallow masks (`dir/*`) and general masks with captures
//! - Capture references in destinations
//! - Recursive matching
//! - Named mounts (`NAME:PATH`) and transfers between them

#[path = "../common/mod.rs"]
mod common;

use common::TestFixture;
use predicates::prelude::*;
use rstest::rstest;

// =============================================================================
// Resolution
// =============================================================================

#[rstest]
#[case::literal("docs/a.txt", "docs/a.txt\n")]
#[case::shallow("docs/*", "docs/a.txt\ndocs/b.txt\ndocs/sub\n")]
#[case::general("docs/*.txt", "docs/a.txt\ndocs/b.txt\n")]
#[case::name_prefix("reports/2024*", "reports/2024-q2.csv\n")]
#[case::no_match("docs/*.pdf", "")]
fn test_resolve_lists_sources(#[case] mask: &str, #[case] expected: &str) {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["resolve", mask])
        .assert()
        .success()
        .stdout(expected.to_string());
}

#[test]
fn test_resolve_recursive_reaches_nested_files() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["resolve", "-r", "docs/*.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docs/sub/c.txt"));
}

#[test]
fn test_resolve_shows_substituted_destinations() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["resolve", "reports/*-*.csv", "archive/$2-$1.csv"])
        .assert()
        .success()
        .stdout("reports/2023-q1.csv -> archive/q1-2023.csv\nreports/2024-q2.csv -> archive/q2-2024.csv\n");
}

#[test]
fn test_resolve_shallow_rebases_children() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["resolve", "docs/*", "backup"])
        .assert()
        .success()
        .stdout(
            "docs/a.txt -> backup/a.txt\ndocs/b.txt -> backup/b.txt\ndocs/sub -> backup/sub\n",
        );
}

#[test]
fn test_resolve_does_not_touch_disk() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["resolve", "docs/*", "backup"])
        .assert()
        .success();

    assert!(!fx.exists("backup"));
}

// =============================================================================
// Transfers
// =============================================================================

#[test]
fn test_copy_with_capture_substitution() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["cp", "reports/*-*.csv", "archive/$1.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 2 entries"));

    fx.assert_file_content("archive/2023.csv", "q1");
    fx.assert_file_content("archive/2024.csv", "q2");
}

#[test]
fn test_copy_shallow_mask_takes_directories_whole() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs().args(["cp", "docs/*", "backup"]).assert().success();

    fx.assert_file_content("backup/a.txt", "alpha");
    fx.assert_file_content("backup/b.txt", "bravo");
    fx.assert_file_content("backup/sub/c.txt", "charlie");
}

#[test]
fn test_copy_general_mask_stays_shallow_without_recursive() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs().args(["cp", "docs/*.txt", "out"]).assert().success();

    assert!(fx.exists("out/a.txt"));
    assert!(fx.exists("out/b.txt"));
    assert!(!fx.exists("out/sub"));
}

#[test]
fn test_copy_general_mask_recursive_mirrors_layout() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["cp", "-r", "docs/*.txt", "out"])
        .assert()
        .success();

    fx.assert_file_content("out/a.txt", "alpha");
    fx.assert_file_content("out/sub/c.txt", "charlie");
}

#[test]
fn test_move_by_mask() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["mv", "reports/*.csv", "old"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved 2 entries"));

    assert!(!fx.exists("reports/2023-q1.csv"));
    fx.assert_file_content("old/2023-q1.csv", "q1");
    fx.assert_file_content("old/2024-q2.csv", "q2");
}

#[test]
fn test_matched_directory_subsumes_its_contents() {
    let fx = TestFixture::new();
    fx.write("src/app-core/lib.txt", "core");
    fx.write("src/app-core/app-extra.txt", "extra");

    // Both the directory and the file inside it match; only the directory is
    // moved.
    fx.mfs()
        .args(["mv", "-r", "src/app-*", "dst"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved 1 entry"));

    fx.assert_file_content("dst/app-core/lib.txt", "core");
    fx.assert_file_content("dst/app-core/app-extra.txt", "extra");
}

#[test]
fn test_no_match_is_a_warning() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["cp", "docs/*.pdf", "out"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Nothing matches"));

    assert!(!fx.exists("out"));
}

#[test]
fn test_ls_with_mask() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["ls", "reports/2023*"])
        .assert()
        .success()
        .stdout("reports/2023-q1.csv\n");
}

#[test]
fn test_rm_mask_removes_matched_directories_whole() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["rm", "docs/*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 files and 1 directory"));

    assert!(!fx.exists("docs/sub"));
    assert!(fx.path("docs").is_dir());
}

// =============================================================================
// Mounts
// =============================================================================

#[test]
fn test_mount_addressing() {
    let fx = TestFixture::new();
    fx.write("media/photos/a.jpg", "jpg");

    let media = fx.path("media");
    fx.mfs()
        .arg("--mount")
        .arg(format!("media={}", media.display()))
        .args(["ls", "media:photos"])
        .assert()
        .success()
        .stdout("photos/a.jpg\n");
}

#[test]
fn test_transfer_between_sibling_mounts() {
    let fx = TestFixture::new();
    fx.write("inbox/a.txt", "a");
    fx.write("inbox/b.txt", "b");
    fx.mkdir("outbox");

    fx.mfs()
        .arg("--mount")
        .arg(format!("in={}", fx.path("inbox").display()))
        .arg("--mount")
        .arg(format!("out={}", fx.path("outbox").display()))
        .args(["mv", "in:*.txt", "out:"])
        .assert()
        .success();

    assert!(!fx.exists("inbox/a.txt"));
    fx.assert_file_content("outbox/a.txt", "a");
    fx.assert_file_content("outbox/b.txt", "b");
}

#[test]
fn test_transfer_from_mount_to_default_disk() {
    let fx = TestFixture::new();
    fx.write("media/report.txt", "report");

    fx.mfs()
        .arg("--mount")
        .arg(format!("media={}", fx.path("media").display()))
        .args(["cp", "media:report.txt", "copies/report.txt"])
        .assert()
        .success();

    fx.assert_file_content("copies/report.txt", "report");
}

#[cfg(unix)]
#[test]
fn test_unmounted_prefix_is_a_plain_path() {
    let fx = TestFixture::new();
    fx.write("notes:old/a.txt", "a");

    fx.mfs()
        .args(["cp", "notes:old/a.txt", "a.txt"])
        .assert()
        .success();

    fx.assert_file_content("a.txt", "a");
}
