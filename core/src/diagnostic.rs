//! Line/column annotated error reports.
//!
//! ```text
//! file.txt:1:8:unexpected ;
//!      1 |     foo = ;
//!        |           ^
//! ```

use crate::span::Cursor;

/// Width of the line-number gutter.
const GUTTER: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub position: Cursor,
    pub message: String,
    /// Text of the offending line, as read so far.
    pub source: String,
    pub tab_width: usize,
}

impl Diagnostic {
    pub fn new(
        file: &str,
        position: Cursor,
        message: &str,
        source: &str,
        tab_width: usize,
    ) -> Self {
        Self {
            file: file.to_owned(),
            position,
            message: message.to_owned(),
            source: source.to_owned(),
            tab_width,
        }
    }

    fn expand(&self, text: impl Iterator<Item = char>) -> String {
        text.flat_map(|ch| {
            let (ch, count) = if ch == '\t' { (' ', self.tab_width) } else { (ch, 1) };
            std::iter::repeat(ch).take(count)
        })
        .collect()
    }

    /// The source line with tabs expanded.
    pub fn expanded_source(&self) -> String {
        self.expand(self.source.chars())
    }

    /// Offset of the caret once the text before the failing column is expanded.
    pub fn caret_offset(&self) -> usize {
        let before = self.position.column.saturating_sub(1);
        self.expand(self.source.chars().take(before)).chars().count()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{}:{}:{}:{}",
            self.file, self.position.line, self.position.column, self.message
        )?;
        writeln!(
            f,
            "{:>width$} | {}",
            self.position.line,
            self.expanded_source(),
            width = GUTTER
        )?;
        write!(
            f,
            "{:width$} | {:caret$}^",
            "",
            "",
            width = GUTTER,
            caret = self.caret_offset()
        )
    }
}
