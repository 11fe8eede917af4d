//! Actionable filtering.
//!
//! When a mask matches both a directory and entries inside it, acting on the
//! directory already covers its contents. The filter keeps only the
//! outermost matches so nothing is transferred or deleted twice.

use crate::entry::Entry;
use crate::utils::path;
use std::collections::BTreeSet;

/// Remove every entry that lies strictly below a directory in the same set.
///
/// Order of the surviving entries is preserved. Files are only ever removed
/// as descendants of a matched directory, never because another file shares
/// a prefix. Applying the filter twice gives the same result as once.
pub fn filter_actionable(entries: Vec<Entry>) -> Vec<Entry> {
    let directories: BTreeSet<&str> = entries
        .iter()
        .filter(|e| e.is_dir())
        .map(|e| e.path.as_str())
        .collect();

    if directories.is_empty() {
        return entries;
    }

    let keep: Vec<bool> = entries
        .iter()
        .map(|e| !has_matched_ancestor(&e.path, &directories))
        .collect();

    entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect()
}

fn has_matched_ancestor(entry_path: &str, directories: &BTreeSet<&str>) -> bool {
    let mut current = path::dirname(entry_path);
    while !current.is_empty() {
        if directories.contains(current) {
            return true;
        }
        current = path::dirname(current);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    fn sample() -> Vec<Entry> {
        vec![
            Entry::directory("docs"),
            Entry::file("docs/a.txt"),
            Entry::directory("docs/sub"),
            Entry::file("docs/sub/c.txt"),
            Entry::file("docsx.txt"),
            Entry::file("notes/a.txt"),
        ]
    }

    #[test]
    fn test_removes_strict_descendants_only() {
        let filtered = filter_actionable(sample());
        assert_eq!(paths(&filtered), vec!["docs", "docsx.txt", "notes/a.txt"]);
    }

    #[test]
    fn test_idempotent() {
        let once = filter_actionable(sample());
        let twice = filter_actionable(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_order_independent() {
        let mut reversed = sample();
        reversed.reverse();
        let mut forward = paths(&filter_actionable(sample()))
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let mut backward = paths(&filter_actionable(reversed))
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        forward.sort();
        backward.sort();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_files_never_subsume_each_other() {
        let entries = vec![Entry::file("a"), Entry::file("a/b")];
        assert_eq!(filter_actionable(entries).len(), 2);
    }

    #[test]
    fn test_nested_directories_keep_outermost() {
        let entries = vec![
            Entry::directory("a/b/c"),
            Entry::directory("a"),
            Entry::file("a/b/c/d.txt"),
        ];
        assert_eq!(paths(&filter_actionable(entries)), vec!["a"]);
    }
}
