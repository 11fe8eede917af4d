//! Basic functionality integration tests for mfs CLI.

#[path = "../common/mod.rs"]
mod common;

use common::TestFixture;
use predicates::prelude::*;

#[test]
fn test_copy_single_file() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["cp", "docs/a.txt", "copy/a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 1 entry"));

    fx.assert_file_content("copy/a.txt", "alpha");
    fx.assert_file_content("docs/a.txt", "alpha");
}

#[test]
fn test_copy_refuses_existing_destination() {
    let fx = TestFixture::new().with_sample_tree();
    fx.write("copy/a.txt", "old");

    fx.mfs()
        .args(["cp", "docs/a.txt", "copy/a.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("mfs: error[already_exists]"));

    fx.assert_file_content("copy/a.txt", "old");
}

#[test]
fn test_copy_force_replaces_destination() {
    let fx = TestFixture::new().with_sample_tree();
    fx.write("copy/a.txt", "old");

    fx.mfs()
        .args(["cp", "-f", "docs/a.txt", "copy/a.txt"])
        .assert()
        .success();

    fx.assert_file_content("copy/a.txt", "alpha");
}

#[test]
fn test_copy_directory_into_new_path() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs().args(["cp", "docs", "backup"]).assert().success();

    fx.assert_file_content("backup/a.txt", "alpha");
    fx.assert_file_content("backup/sub/c.txt", "charlie");
}

#[test]
fn test_move_file() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["mv", "docs/a.txt", "moved.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved 1 entry"));

    assert!(!fx.exists("docs/a.txt"));
    fx.assert_file_content("moved.txt", "alpha");
}

#[test]
fn test_move_merge_keeps_destination_only_files() {
    let fx = TestFixture::new();
    fx.write("incoming/shared.txt", "new");
    fx.write("incoming/nested/deep.txt", "deep");
    fx.write("library/shared.txt", "old");
    fx.write("library/keep.txt", "keep");

    fx.mfs()
        .args(["mv", "-f", "-r", "incoming", "library"])
        .assert()
        .success();

    fx.assert_file_content("library/shared.txt", "new");
    fx.assert_file_content("library/nested/deep.txt", "deep");
    fx.assert_file_content("library/keep.txt", "keep");
    assert!(!fx.exists("incoming"));
}

#[test]
fn test_move_merge_leaves_unlisted_files_in_source() {
    let fx = TestFixture::new();
    fx.write("incoming/a.txt", "a");
    fx.write("incoming/draft.txt~", "unsaved work");
    fx.mkdir("library");

    fx.mfs()
        .args(["mv", "-f", "-r", "incoming", "library"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Leaving incoming in place"));

    fx.assert_file_content("library/a.txt", "a");
    fx.assert_file_content("incoming/draft.txt~", "unsaved work");
    assert!(!fx.exists("incoming/a.txt"));
}

#[test]
fn test_move_force_without_recursive_replaces_directory() {
    let fx = TestFixture::new();
    fx.write("incoming/shared.txt", "new");
    fx.write("library/keep.txt", "keep");

    fx.mfs()
        .args(["mv", "-f", "incoming", "library"])
        .assert()
        .success();

    fx.assert_file_content("library/shared.txt", "new");
    assert!(!fx.exists("library/keep.txt"));
}

#[test]
fn test_rm_files_by_mask() {
    let fx = TestFixture::new();
    fx.write("logs/a.log", "a");
    fx.write("logs/b.log", "b");
    fx.write("logs/keep.txt", "keep");

    fx.mfs()
        .args(["rm", "logs/*.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 files and 0 directories"));

    assert!(!fx.exists("logs/a.log"));
    assert!(!fx.exists("logs/b.log"));
    assert!(fx.exists("logs/keep.txt"));
}

#[test]
fn test_rm_skips_literal_directory() {
    let fx = TestFixture::new();
    fx.write("logs/a.log", "a");

    fx.mfs()
        .args(["rm", "logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped 1 path"));

    assert!(fx.exists("logs/a.log"));
}

#[test]
fn test_rm_several_paths() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["rm", "docs/a.txt", "docs/*", "reports/2023-q1.csv"])
        .assert()
        .success();

    assert!(!fx.exists("docs/a.txt"));
    assert!(!fx.exists("docs/sub"));
    assert!(!fx.exists("reports/2023-q1.csv"));
    assert!(fx.exists("reports/2024-q2.csv"));
}

#[test]
fn test_rmdir_by_mask_leaves_files() {
    let fx = TestFixture::new();
    fx.write("build/debug/out.o", "o");
    fx.write("build/release/out.o", "o");
    fx.write("build/README", "keep");

    fx.mfs()
        .args(["rmdir", "build/*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 directories"));

    assert!(!fx.exists("build/debug"));
    assert!(!fx.exists("build/release"));
    assert!(fx.exists("build/README"));
}

#[test]
fn test_mkdir_then_ls() {
    let fx = TestFixture::new();

    fx.mfs().args(["mkdir", "a/b/c"]).assert().success();
    assert!(fx.path("a/b/c").is_dir());

    fx.mfs()
        .args(["ls", "-r", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a/b\n"))
        .stdout(predicate::str::contains("a/b/c\n"));
}

#[test]
fn test_ls_by_type_lists_directories_first() {
    let fx = TestFixture::new().with_sample_tree();

    let output = fx
        .mfs()
        .args(["ls", "--by-type", "docs"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines, vec!["dir\tdocs/sub", "file\tdocs/a.txt", "file\tdocs/b.txt"]);
}

#[test]
fn test_stat_prints_fields() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["stat", "docs/a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("type: file"))
        .stdout(predicate::str::contains("size: 5"))
        .stdout(predicate::str::contains("mimetype: text/plain"))
        .stdout(predicate::str::contains("extension: txt"));

    fx.mfs()
        .args(["stat", "docs/a.txt", "--key", "filename"])
        .assert()
        .success()
        .stdout("a\n");
}

#[test]
fn test_render_fills_placeholders() {
    let fx = TestFixture::new();
    fx.write("templates/greet.txt", "Hello {{ name }}, {{ $year }}!");

    fx.mfs()
        .args([
            "render",
            "templates/greet.txt",
            "out/greet.txt",
            "--set",
            "name=World",
            "--set",
            "year=2024",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 1 file"));

    fx.assert_file_content("out/greet.txt", "Hello World, 2024!");
}

#[test]
fn test_render_custom_delimiters() {
    let fx = TestFixture::new();
    fx.write("t/a.txt", "<% name %> {{ name }}");

    fx.mfs()
        .args([
            "render", "t/a.txt", "o/a.txt", "--set", "name=x", "--prefix", "<%", "--suffix", "%>",
        ])
        .assert()
        .success();

    fx.assert_file_content("o/a.txt", "x {{ name }}");
}

#[test]
fn test_quiet_suppresses_summary() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["-q", "cp", "docs/a.txt", "copy.txt"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_verbose_reports_primitives() {
    let fx = TestFixture::new().with_sample_tree();

    fx.mfs()
        .args(["-v", "cp", "docs/a.txt", "copy.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Primitives issued: 1"))
        .stderr(predicate::str::contains("docs/a.txt"));
}

#[test]
fn test_root_from_environment() {
    let fx = TestFixture::new().with_sample_tree();

    assert_cmd::cargo::cargo_bin_cmd!("mfs")
        .env("MASKFS_ROOT", fx.root.path())
        .args(["cp", "docs/b.txt", "b.txt"])
        .assert()
        .success();

    fx.assert_file_content("b.txt", "bravo");
}

#[test]
fn test_help() {
    let fx = TestFixture::new();
    fx.mfs()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Copy, move and delete files by path mask"));
}
