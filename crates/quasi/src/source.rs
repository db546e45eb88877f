//! Source positions for diagnostics
//!
//! The runtime only ever deals in offsets. Hosts that know where offsets came
//! from implement [`SourceMap`] so errors can be rendered with file, line and
//! column.

use std::fmt;
use std::fmt::Write as _;

use crate::syntax::Offset;
use crate::value::ErrorValue;

/// A resolved location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    /// File name
    pub file: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Maps offsets back to source positions.
pub trait SourceMap {
    /// Resolve `offset`, if it belongs to a known file.
    fn resolve(&self, offset: Offset) -> Option<SourcePosition>;
}

impl<F> SourceMap for F
where
    F: Fn(Offset) -> Option<SourcePosition>,
{
    fn resolve(&self, offset: Offset) -> Option<SourcePosition> {
        self(offset)
    }
}

/// A single file whose offsets are byte positions in `text`.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    line_starts: Vec<Offset>,
    len: usize,
}

impl SourceFile {
    /// Index the line starts of `text`.
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name: name.into(),
            line_starts,
            len: text.len(),
        }
    }
}

impl SourceMap for SourceFile {
    fn resolve(&self, offset: Offset) -> Option<SourcePosition> {
        if offset > self.len {
            return None;
        }
        let line = self.line_starts.partition_point(|start| *start <= offset);
        Some(SourcePosition {
            file: self.name.clone(),
            line,
            column: offset - self.line_starts[line - 1] + 1,
        })
    }
}

/// Render `error` with its location and call-site trace.
///
/// ```text
/// index 3 is out of range 0..1 at main.q:4:7
///   called from main.q:9:1
/// ```
///
/// Offsets the map cannot resolve print as `offset N`.
pub fn render_error(error: &ErrorValue, map: &dyn SourceMap) -> String {
    let locate = |offset: Offset| match map.resolve(offset) {
        Some(position) => position.to_string(),
        None => format!("offset {}", offset),
    };

    let mut out = error.message.clone();
    if let Some(offset) = error.offset {
        let _ = write!(out, " at {}", locate(offset));
    }
    for site in &error.trace {
        let _ = write!(out, "\n  called from {}", locate(*site));
    }
    out
}
