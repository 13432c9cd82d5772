// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

//! Bits and pieces for mapping byte offsets in source text to human-readable
//! line/column positions, for use in parse and evaluation diagnostics.

use std::ops::Range;

/// A byte-offset range within the source text.
pub type Span = Range<usize>;

/// Position inside a text in a form that's useful for human readers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Pos {
    /// Line number, starting at 1
    pub line: usize,
    /// Position within the line, in characters, starting at 1
    pub column: usize,
}

/// A data structure for mapping byte offsets to line/column based positions.
pub struct LineMap<'a> {
    /// Ordered vector of the byte offset of every line break (`\n`).
    line_offsets: Vec<usize>,
    /// The original string, needed for obtaining the column indices.
    source: &'a str,
}

impl<'a> LineMap<'a> {
    pub fn new(s: &'a str) -> Self {
        Self {
            line_offsets: s
                .char_indices()
                .filter_map(|(pos, ch)| if ch == '\n' { Some(pos) } else { None })
                .collect(),
            source: s,
        }
    }

    /// # Examples
    ///
    /// ```
    /// # use noh::line_map::{LineMap, Pos};
    /// let s = "abc\ndefg\nhij\n";
    /// let m = LineMap::new(s);
    /// assert_eq!(m.offset_to_pos(0), Pos { line: 1, column: 1 });
    /// assert_eq!(m.offset_to_pos(3), Pos { line: 1, column: 4 });
    /// assert_eq!(m.offset_to_pos(4), Pos { line: 2, column: 1 });
    /// assert_eq!(m.offset_to_pos(10), Pos { line: 3, column: 2 });
    /// ```
    pub fn offset_to_pos(&self, offset: usize) -> Pos {
        let line = match self.line_offsets.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line,
        };
        let previous_line_start = if line > 0 {
            self.line_offsets[line - 1] + 1
        } else {
            0
        };
        let column = self.source[previous_line_start..offset].chars().count() + 1;
        Pos {
            line: line + 1,
            column,
        }
    }

    pub fn span_to_pos(&self, span: &Span) -> Range<Pos> {
        self.offset_to_pos(span.start)..self.offset_to_pos(span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let m = LineMap::new("hello world");
        assert_eq!(m.offset_to_pos(0), Pos { line: 1, column: 1 });
        assert_eq!(m.offset_to_pos(6), Pos { line: 1, column: 7 });
    }

    #[test]
    fn multi_line() {
        let m = LineMap::new("ab\ncd\nef");
        assert_eq!(m.offset_to_pos(0), Pos { line: 1, column: 1 });
        assert_eq!(m.offset_to_pos(3), Pos { line: 2, column: 1 });
        assert_eq!(m.offset_to_pos(7), Pos { line: 3, column: 2 });
    }
}
