//! Copying with placeholder replacement.

use super::TransferStats;
use crate::disk::Disk;
use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::mask::resolve_mask;
use crate::options::TransferOptions;
use crate::utils::path;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::time::Instant;

/// Delimiters around a placeholder name.
///
/// With the default `{{` / `}}`, all of `{{name}}`, `{{ name }}` and
/// `{{ $name }}` refer to `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placeholder {
    /// Opening delimiter
    pub prefix: String,
    /// Closing delimiter
    pub suffix: String,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self {
            prefix: "{{".to_owned(),
            suffix: "}}".to_owned(),
        }
    }
}

impl Placeholder {
    /// Placeholder with custom delimiters.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    fn pattern(&self) -> String {
        let excluded: String = self.suffix.chars().map(|c| regex::escape(&c.to_string())).collect();
        format!(
            r"{}\s*\$?([^{}]*?)\s*{}",
            regex::escape(&self.prefix),
            excluded,
            regex::escape(&self.suffix)
        )
    }

    fn compile(&self) -> Result<Regex> {
        let pattern = self.pattern();
        if self.prefix.is_empty() || self.suffix.is_empty() {
            return Err(Error::InvalidMask {
                mask: pattern,
                source: regex::Error::Syntax("placeholder delimiters must not be empty".to_owned()),
            });
        }
        Regex::new(&pattern).map_err(|source| Error::InvalidMask {
            mask: pattern,
            source,
        })
    }

    /// Replace every placeholder in `text`. Unknown names become empty.
    pub fn render(&self, text: &str, replacements: &HashMap<String, String>) -> Result<String> {
        let regex = self.compile()?;
        Ok(render_with(&regex, text, replacements))
    }
}

fn render_with(regex: &Regex, text: &str, replacements: &HashMap<String, String>) -> String {
    regex
        .replace_all(text, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|name| replacements.get(name.as_str()))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// Copy like [`copy`](super::copy), rendering placeholders on the way.
///
/// Each resolved source file is read, rendered and written to its
/// destination, replacing whatever is there. A source directory contributes
/// every file below it, written to the mirrored paths.
///
/// # Errors
///
/// Fails on resolution errors, empty delimiters, or the first failing
/// read or write.
pub fn copy_with_replacements(
    disk: &Disk,
    from: &str,
    to: &str,
    placeholder: &Placeholder,
    replacements: &HashMap<String, String>,
    options: &TransferOptions,
) -> Result<TransferStats> {
    let start = Instant::now();
    let regex = placeholder.compile()?;
    let resolution = resolve_mask(disk, from, Some(to), options.recursive)?;
    let pairs = resolution.pairs();
    let total = pairs.len();
    let mut stats = TransferStats::default();

    for (index, (source, destination)) in pairs.into_iter().enumerate() {
        let files = match disk.kind(source)? {
            EntryKind::File => vec![(source.to_owned(), destination.to_owned())],
            EntryKind::Directory => disk
                .all_files(source)?
                .into_iter()
                .map(|file| {
                    let target = path::rebase(&file, source, destination)
                        .unwrap_or_else(|| path::join(destination, path::basename(&file)));
                    (file, target)
                })
                .collect(),
        };

        for (file, target) in files {
            let text = disk.read_to_string(&file)?;
            disk.write(&target, render_with(&regex, &text, replacements))?;
            stats.entries_transferred += 1;
            options.verbose(&format!("render {file} -> {target}"));
        }

        stats.pairs += 1;
        options.report_progress((index + 1) as u64, total as u64);
    }

    stats.duration = start.elapsed();
    Ok(stats)
}
