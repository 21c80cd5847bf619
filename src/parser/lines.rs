//! Splitting input into lines.

use std::fmt;

const TAB_STOP: usize = 4;

/// How a line was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// A lone `\r`.
    Cr,
    /// The last line of input had no terminator.
    None,
}

impl LineEnding {
    /// Length of the terminator in bytes.
    pub fn len(self) -> usize {
        match self {
            LineEnding::Lf | LineEnding::Cr => 1,
            LineEnding::CrLf => 2,
            LineEnding::None => 0,
        }
    }

    /// Whether the line had no terminator.
    pub fn is_empty(self) -> bool {
        self == LineEnding::None
    }
}

/// One line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'s> {
    /// The line's text, without its terminator.
    pub content: &'s str,

    /// Byte offset of `content` in the input.
    pub start_offset: usize,

    /// Byte offset just past `content`, before the terminator.
    pub end_offset: usize,

    /// Width in columns of the leading spaces and tabs, tabs advancing to
    /// the next multiple of four.
    pub indent_width: usize,

    /// The terminator that ended the line.
    pub ending: LineEnding,
}

impl<'s> Line<'s> {
    /// Byte offset of the start of the next line.
    pub fn next_offset(&self) -> usize {
        self.end_offset + self.ending.len()
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content)
    }
}

/// A lazy, restartable iterator over the lines of a document.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.  A leading byte order mark is
/// skipped.  An empty input has no lines; a final line without a terminator
/// is still yielded.
///
/// ```rust
/// # use mdhtml::parser::lines::{LineEnding, Lines};
/// let lines: Vec<_> = Lines::new("a\r\n\tb\rc").collect();
/// assert_eq!(lines.len(), 3);
/// assert_eq!(lines[0].ending, LineEnding::CrLf);
/// assert_eq!(lines[1].content, "\tb");
/// assert_eq!(lines[1].indent_width, 4);
/// assert_eq!(lines[2].ending, LineEnding::None);
/// ```
#[derive(Debug, Clone)]
pub struct Lines<'s> {
    input: &'s str,
    pos: usize,
}

impl<'s> Lines<'s> {
    /// Iterate over the lines of `input`.
    pub fn new(input: &'s str) -> Self {
        let pos = if input.starts_with('\u{feff}') { 3 } else { 0 };
        Lines { input, pos }
    }

    /// Byte offset of the next line to be yielded.
    pub fn offset(&self) -> usize {
        self.pos
    }
}

impl<'s> Iterator for Lines<'s> {
    type Item = Line<'s>;

    fn next(&mut self) -> Option<Line<'s>> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        let matcher = jetscii::bytes!(b'\r', b'\n');
        let (end, ending) = match matcher.find(&bytes[start..]) {
            None => (bytes.len(), LineEnding::None),
            Some(n) => {
                let eol = start + n;
                if bytes[eol] == b'\n' {
                    (eol, LineEnding::Lf)
                } else if bytes.get(eol + 1) == Some(&b'\n') {
                    (eol, LineEnding::CrLf)
                } else {
                    (eol, LineEnding::Cr)
                }
            }
        };

        let content = &self.input[start..end];
        self.pos = end + ending.len();

        Some(Line {
            content,
            start_offset: start,
            end_offset: end,
            indent_width: indent_width(content),
            ending,
        })
    }
}

fn indent_width(content: &str) -> usize {
    let mut column = 0;
    for &b in content.as_bytes() {
        match b {
            b' ' => column += 1,
            b'\t' => column += TAB_STOP - (column % TAB_STOP),
            _ => break,
        }
    }
    column
}
