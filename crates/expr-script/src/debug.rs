//! Debug-position markers.
//!
//! In debug mode every emitted statement, `if` test and `while` test is
//! recorded as a [`DebugMarker`] spanning its text, and the rewritten tree
//! receives a matching [`DebugInfoExpr`] so a compiled artifact can map
//! instructions back to the generated script.

use serde::Serialize;

use crate::ir::{DebugInfoExpr, Expr};
use crate::writer::TextPosition;

/// Span of one statement in the generated text. Lines and columns are
/// 1-based; `end_column` is exclusive; `offset` is the byte offset of the
/// start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DebugMarker {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub offset: usize,
}

impl DebugMarker {
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
            offset: start.offset,
        }
    }

    /// Sequence-point node for this span.
    pub fn to_expr(&self, document: &str) -> Expr {
        Expr::DebugInfo(DebugInfoExpr {
            document: document.to_string(),
            start_line: self.start_line,
            start_column: self.start_column,
            end_line: self.end_line,
            end_column: self.end_column,
        })
    }

    /// The text this marker covers.
    pub fn slice<'a>(&self, script: &'a str) -> Option<&'a str> {
        let end = byte_offset(script, self.end_line, self.end_column)?;
        script.get(self.offset..end)
    }
}

/// Byte offset of a 1-based line and character column.
fn byte_offset(script: &str, line: usize, column: usize) -> Option<usize> {
    let mut start = 0;
    for _ in 1..line {
        start += script.get(start..)?.find('\n')? + 1;
    }
    let rest = script.get(start..)?;
    let within = rest
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(rest.len()))
        .nth(column.checked_sub(1)?)?;
    Some(start + within)
}

/// Markers recorded during one pass.
#[derive(Debug)]
pub(crate) struct DebugRecorder {
    pub document: String,
    pub markers: Vec<DebugMarker>,
}

impl DebugRecorder {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            markers: Vec::new(),
        }
    }

    /// Records a span and returns its sequence point.
    pub fn record(&mut self, start: TextPosition, end: TextPosition) -> Expr {
        let marker = DebugMarker::new(start, end);
        self.markers.push(marker);
        marker.to_expr(&self.document)
    }
}
