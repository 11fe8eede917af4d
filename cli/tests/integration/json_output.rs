//! JSON output integration tests for mfs CLI.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, parse_json};

#[test]
fn test_copy_json_stats() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "cp", "reports/*-*.csv", "archive/$1.csv"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    assert_eq!(value["schema_version"], "1.0");
    assert_eq!(value["command"], "cp");
    assert_eq!(value["status"], "ok");
    assert_eq!(value["from"], "reports/*-*.csv");
    assert_eq!(value["stats"]["pairs"], 2);
    assert_eq!(value["stats"]["entries_transferred"], 2);
    assert_eq!(value["stats"]["entries_replaced"], 0);
    assert!(value["stats"]["duration_ms"].is_u64());
}

#[test]
fn test_merge_json_stats() {
    let fx = TestFixture::new();
    fx.write("incoming/a.txt", "new");
    fx.write("incoming/b.txt", "b");
    fx.write("library/a.txt", "old");

    let assert = fx
        .mfs()
        .args(["--output", "json", "mv", "-f", "-r", "incoming", "library"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    assert_eq!(value["command"], "mv");
    assert_eq!(value["stats"]["pairs"], 1);
    assert_eq!(value["stats"]["directories_merged"], 1);
    assert_eq!(value["stats"]["entries_replaced"], 1);
    assert_eq!(value["stats"]["sources_removed"], 1);
}

#[test]
fn test_resolve_json_single() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "resolve", "docs/a.txt", "copy/a.txt"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    assert_eq!(value["resolution"]["resolved"]["from"], "docs/a.txt");
    assert_eq!(value["resolution"]["resolved"]["to"], "copy/a.txt");
    assert_eq!(value["resolution"]["recursive"], false);
}

#[test]
fn test_resolve_json_many() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "resolve", "docs/*"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    let from = value["resolution"]["resolved"]["from"].as_array().unwrap();
    assert_eq!(from.len(), 3);
    assert!(value["resolution"]["resolved"]["to"].is_null());
}

#[test]
fn test_ls_json_entries() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "ls", "docs"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    let entries = value["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["path"], "docs/a.txt");
    assert_eq!(entries[0]["kind"], "file");
    assert_eq!(entries[2]["path"], "docs/sub");
    assert_eq!(entries[2]["kind"], "dir");
}

#[test]
fn test_ls_json_by_type() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "ls", "-r", "--by-type", "docs"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    assert_eq!(value["directories"], serde_json::json!(["docs/sub"]));
    assert_eq!(
        value["files"],
        serde_json::json!(["docs/a.txt", "docs/b.txt", "docs/sub/c.txt"])
    );
}

#[test]
fn test_stat_json() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "stat", "docs/a.txt"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    let meta = &value["meta"];
    assert_eq!(meta["path"], "docs/a.txt");
    assert_eq!(meta["type"], "file");
    assert_eq!(meta["size"], "5");
    assert_eq!(meta["dirname"], "docs");
    assert_eq!(meta["basename"], "a.txt");
    assert_eq!(meta["filename"], "a");
    assert_eq!(meta["extension"], "txt");
}

#[test]
fn test_stat_json_key() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "stat", "docs/sub", "--key", "mimetype"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    assert_eq!(value["key"], "mimetype");
    assert_eq!(value["value"], "directory");
}

#[test]
fn test_delete_json_stats() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "rm", "docs/*", "missing.txt"])
        .assert()
        .success();
    let value = parse_json(&assert.get_output().stdout);

    assert_eq!(value["command"], "rm");
    assert_eq!(value["stats"]["files_deleted"], 2);
    assert_eq!(value["stats"]["directories_deleted"], 1);
    assert_eq!(value["stats"]["skipped"], 1);
}

#[test]
fn test_error_json() {
    let fx = TestFixture::new();

    let assert = fx
        .mfs()
        .args(["--output", "json", "cp", "missing.txt", "out.txt"])
        .assert()
        .failure()
        .code(1);
    let value = parse_json(&assert.get_output().stdout);

    assert_eq!(value["schema_version"], "1.0");
    assert_eq!(value["command"], "cp");
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], "not_found");
    assert!(
        value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("missing.txt")
    );
}

#[test]
fn test_error_json_invalid_input() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "resolve", "docs/*.txt", "out/$3"])
        .assert()
        .failure()
        .code(2);
    let value = parse_json(&assert.get_output().stdout);

    assert_eq!(value["error"]["code"], "invalid_input");
}

#[test]
fn test_json_has_no_progress_output() {
    let fx = TestFixture::new().with_sample_tree();

    let assert = fx
        .mfs()
        .args(["--output", "json", "cp", "docs/*", "backup"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1);
}
