//! Root-relative path helpers.
//!
//! Every path that crosses the [`Disk`](crate::Disk) boundary is a
//! root-relative string: forward-slash separated, no leading or trailing
//! slash, no `.` or `..` segments. The disk root itself is the empty string.
//!
//! | Input (root `/srv/data`) | Normalized |
//! |--------------------------|------------|
//! | `/srv/data/docs/a.txt` | `docs/a.txt` |
//! | `./docs//a.txt` | `docs/a.txt` |
//! | `docs/sub/../a.txt` | `docs/a.txt` |
//! | `/srv/data` | `` |
//! | `../etc` | error |

use crate::error::{Error, Result};

/// Make `path` relative to `root` and collapse it into canonical form.
///
/// The root prefix is only stripped when it matches whole segments, so a
/// root of `/srv/data` leaves `/srv/database/x` alone (it becomes
/// `srv/database/x`). Wildcard characters pass through untouched.
///
/// # Errors
///
/// Returns [`Error::OutsideRoot`] if `..` segments climb above the root.
pub fn normalize(root: &str, path: &str) -> Result<String> {
    let unified = path.replace('\\', "/");
    let root = root.trim_end_matches('/');

    let relative = if !root.is_empty() && unified.starts_with(root) {
        let rest = &unified[root.len()..];
        if rest.is_empty() || rest.starts_with('/') {
            rest
        } else {
            unified.as_str()
        }
    } else {
        unified.as_str()
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(Error::OutsideRoot(path.to_owned()));
                }
            }
            other => segments.push(other),
        }
    }

    Ok(segments.join("/"))
}

/// Join two root-relative paths, treating the empty string as the root.
pub fn join(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_owned(),
        (false, true) => base.to_owned(),
        (false, false) => format!("{base}/{rest}"),
    }
}

/// Directory part of a path (`""` for top-level entries).
pub fn dirname(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Last segment of a path.
pub fn basename(path: &str) -> &str {
    path.rfind('/').map_or(path, |idx| &path[idx + 1..])
}

/// Extension of the last segment, without the dot.
///
/// Dotfiles such as `.env` have no extension.
pub fn extension(path: &str) -> Option<&str> {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 == name.len() => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Last segment without its extension.
pub fn filename(path: &str) -> &str {
    let name = basename(path);
    match extension(path) {
        Some(ext) => &name[..name.len() - ext.len() - 1],
        None => name,
    }
}

/// Whether `path` lies strictly below the directory `dir`.
pub fn is_descendant(path: &str, dir: &str) -> bool {
    if dir.is_empty() {
        return !path.is_empty();
    }
    path.len() > dir.len() + 1 && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}

/// Replace the leading `from` span of `path` with `to`.
///
/// The replacement is positional: only the prefix span is rewritten, so a
/// prefix string that happens to recur deeper in the path is left alone.
/// Returns `None` when `path` does not start with `from` on a segment
/// boundary.
pub fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    let rest = if from.is_empty() {
        path
    } else if path == from {
        ""
    } else if is_descendant(path, from) {
        &path[from.len() + 1..]
    } else {
        return None;
    };
    Some(join(to, rest))
}

// =============================================================================
// Tests
// =============================================================================
