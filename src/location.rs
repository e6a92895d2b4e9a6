
use std::fmt;

use memchr;

/// A source location.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Location {
    line: usize,
    column: usize,
    offset: usize,
}

impl Location {

    pub(crate) fn new(line: usize, column: usize, offset: usize) -> Location {
        Location { line, column, offset }
    }

    pub(crate) fn at_start() -> Location {
        Location::new(1, 1, 0)
    }

    /// Location after the given bytes have been consumed, starting from `self`.
    pub(crate) fn with_consumed(&self, parsed: &[u8]) -> Location {

        let nl_count = memchr::memchr_iter(b'\n', parsed).count();
        let last_line_len = match memchr::memrchr(b'\n', parsed) {
            Some(nl_pos) => parsed.len() - (nl_pos + 1),
            None => parsed.len(),
        };

        Location {
            offset: self.offset + parsed.len(),
            line: self.line + nl_count,
            column: last_line_len + if nl_count > 0 { 1 } else { self.column },
        }
    }

    /// The line number (starting at 1).
    pub fn line(&self) -> usize { self.line }

    /// The column number in bytes (starting at 1).
    pub fn column(&self) -> usize { self.column }

    /// The byte offset (starting at 0).
    pub fn offset(&self) -> usize { self.offset }
}

impl fmt::Display for Location {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt,
            "line {} column {} (byte offset {})",
            self.line,
            self.column,
            self.offset,
        )
    }
}
