//! Indented text buffer with position tracking.
//!
//! Indentation is written lazily: [`CodeWriter::newline`] only records that
//! the next text must be indented, so blank lines carry no trailing spaces.

/// Spaces per indentation level.
pub const TAB_SIZE: usize = 4;

/// A 1-based line/column pair plus a byte offset into the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl TextPosition {
    pub const START: TextPosition = TextPosition {
        line: 1,
        column: 1,
        offset: 0,
    };
}

impl Default for TextPosition {
    fn default() -> Self {
        Self::START
    }
}

#[derive(Debug)]
pub struct CodeWriter {
    output: String,
    indent: usize,
    pending_indent: bool,
    /// Drop a newline requested before anything has been written.
    document_start: bool,
    origin: TextPosition,
    line: usize,
    column: usize,
}

impl CodeWriter {
    /// Writer for the start of a document. A leading newline is suppressed.
    pub fn document(indent: usize) -> Self {
        let mut writer = Self::segment(indent, TextPosition::START);
        writer.document_start = true;
        writer
    }

    /// Writer whose text will be placed at `origin` in a larger document.
    pub fn segment(indent: usize, origin: TextPosition) -> Self {
        Self {
            output: String::new(),
            indent,
            pending_indent: false,
            document_start: false,
            origin,
            line: origin.line,
            column: origin.column,
        }
    }

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush_indent();
        self.push(text);
    }

    /// Starts a new line; indentation is added by the next write.
    pub fn newline(&mut self) {
        if self.document_start && self.output.is_empty() {
            self.pending_indent = true;
            return;
        }
        self.push("\n");
        self.pending_indent = true;
    }

    pub fn write_line(&mut self, text: &str) {
        self.newline();
        self.write(text);
    }

    /// `{` on its own line (or at the end of the current one when `inline`),
    /// then one level deeper.
    pub fn open_brace(&mut self, inline: bool) {
        if inline {
            self.write("{");
        } else {
            self.write_line("{");
        }
        self.indent += 1;
    }

    /// One level shallower, then `}` on its own line.
    pub fn close_brace(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.write_line("}");
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Appends text produced by another writer verbatim.
    pub fn append_raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if text.starts_with('\n') {
            self.pending_indent = false;
        } else {
            self.flush_indent();
        }
        self.push(text);
    }

    /// Where the next written character will land.
    pub fn position(&self) -> TextPosition {
        let pending = if self.pending_indent {
            self.indent * TAB_SIZE
        } else {
            0
        };
        TextPosition {
            line: self.line,
            column: self.column + pending,
            offset: self.origin.offset + self.output.len() + pending,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    fn flush_indent(&mut self) {
        if self.pending_indent {
            self.pending_indent = false;
            let width = self.indent * TAB_SIZE;
            self.output.extend(std::iter::repeat_n(' ', width));
            self.column += width;
        }
    }

    fn push(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.output.push_str(text);
    }
}
