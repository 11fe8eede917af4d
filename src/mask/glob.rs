//! Glob-to-regex translation and capture references.
//!
//! A mask is a path with `*` wildcards. Each `*` matches any run of
//! characters, separators included, and becomes one capture group. A
//! destination refers to those groups as `$1`, `$2`, ... from left to right.

use crate::error::{Error, Result};
use regex::Regex;

/// Translate a mask into an anchored regex pattern.
///
/// Literal text is escaped and every `*` becomes `(.*)`. Returns the pattern
/// and the number of capture groups it produces.
///
/// ```
/// use maskfs::glob_to_regex;
///
/// let (pattern, captures) = glob_to_regex("reports/*_*.csv");
/// assert_eq!(pattern, r"^reports/(.*)_(.*)\.csv$");
/// assert_eq!(captures, 2);
/// ```
pub fn glob_to_regex(expr: &str) -> (String, usize) {
    let chunks: Vec<String> = expr.split('*').map(regex::escape).collect();
    let captures = chunks.len() - 1;
    (format!("^{}$", chunks.join("(.*)")), captures)
}

/// Directory text before the first `*`.
///
/// `docs/sub/*.txt` gives `docs/sub`, `rep*` gives the root (`""`).
pub fn static_prefix(expr: &str) -> &str {
    let head = expr.find('*').map_or(expr, |idx| &expr[..idx]);
    head.rfind('/').map_or("", |idx| &head[..idx])
}

/// How a mask is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskShape {
    /// No wildcard: the path itself
    Literal,
    /// `prefix/*` with a wildcard-free prefix: direct children of `prefix`
    Shallow {
        /// Directory whose children are taken
        prefix: String,
    },
    /// Any other wildcard: regex match over a listing of `static_prefix`
    General {
        /// Directory that is listed
        static_prefix: String,
    },
}

impl MaskShape {
    /// Classify a normalized mask.
    pub fn of(expr: &str) -> Self {
        if !expr.contains('*') {
            return Self::Literal;
        }
        if let Some(prefix) = expr.strip_suffix("/*") {
            if !prefix.is_empty() && !prefix.contains('*') {
                return Self::Shallow {
                    prefix: prefix.to_owned(),
                };
            }
        }
        Self::General {
            static_prefix: static_prefix(expr).to_owned(),
        }
    }
}

/// A compiled mask.
#[derive(Debug, Clone)]
pub struct Mask {
    expr: String,
    shape: MaskShape,
    regex: Regex,
    captures: usize,
}

impl Mask {
    /// Compile a normalized mask.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMask`] if the translated pattern is rejected
    /// by the regex engine (for instance when it exceeds the size limit).
    pub fn new(expr: &str) -> Result<Self> {
        let (pattern, captures) = glob_to_regex(expr);
        let regex = Regex::new(&pattern).map_err(|source| Error::InvalidMask {
            mask: expr.to_owned(),
            source,
        })?;
        Ok(Self {
            expr: expr.to_owned(),
            shape: MaskShape::of(expr),
            regex,
            captures,
        })
    }

    /// The mask text.
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Resolution shape.
    pub fn shape(&self) -> &MaskShape {
        &self.shape
    }

    /// Whether the mask contains a wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.shape != MaskShape::Literal
    }

    /// Number of capture groups (`*` count).
    pub fn capture_count(&self) -> usize {
        self.captures
    }

    /// Whether `path` matches the whole mask.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captured text for each `*`, or `None` if `path` does not match.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_owned()))
                .collect(),
        )
    }

    /// Check that every `$n` in `destination` names a group this mask has.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousCaptureReference`] for `$0` or any index
    /// above [`capture_count`](Self::capture_count).
    pub fn check_references(&self, destination: &str) -> Result<()> {
        let available = match self.shape {
            MaskShape::General { .. } => self.captures,
            _ => 0,
        };
        match capture_references(destination)
            .into_iter()
            .find(|&index| index == 0 || index > available)
        {
            Some(index) => Err(Error::AmbiguousCaptureReference {
                destination: destination.to_owned(),
                index,
                available,
            }),
            None => Ok(()),
        }
    }
}

enum Piece<'a> {
    Text(&'a str),
    Reference(usize),
}

fn pieces(destination: &str) -> Vec<Piece<'_>> {
    let bytes = destination.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' {
            let digits = bytes[i + 1..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            if digits > 0 {
                let end = i + 1 + digits;
                // An index too large for usize can never be a valid group.
                let index = destination[i + 1..end].parse().unwrap_or(usize::MAX);
                if start < i {
                    pieces.push(Piece::Text(&destination[start..i]));
                }
                pieces.push(Piece::Reference(index));
                start = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }
    if start < destination.len() {
        pieces.push(Piece::Text(&destination[start..]));
    }
    pieces
}

/// Every `$n` index in `destination`, in order of appearance.
pub fn capture_references(destination: &str) -> Vec<usize> {
    pieces(destination)
        .into_iter()
        .filter_map(|p| match p {
            Piece::Reference(index) => Some(index),
            Piece::Text(_) => None,
        })
        .collect()
}

/// Replace every `$n` in `destination` with `captures[n - 1]`.
///
/// References must have been validated with [`Mask::check_references`];
/// an out-of-range index is left in place verbatim.
pub fn substitute(destination: &str, captures: &[String]) -> String {
    let mut out = String::with_capacity(destination.len());
    for piece in pieces(destination) {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Reference(index) => match index.checked_sub(1).and_then(|i| captures.get(i)) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('$');
                    out.push_str(&index.to_string());
                }
            },
        }
    }
    out
}
