//! Working buffer capabilities consumed by the tracker.
//!
//! Lines are separated by `\n` and never include their terminator. A buffer always has at
//! least one line: the empty text is a single empty line, and a text ending in `\n` has an
//! empty last line. Offsets are byte offsets into UTF-8 text.

use std::borrow::Cow;

pub mod text_buffer;

pub use text_buffer::TextBuffer;

/// Read access to a line-addressed text.
pub trait LineBuffer {
    /// Length of the text in bytes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines, always at least one
    fn line_count(&self) -> usize;

    /// Line containing `offset`. An offset on a `\n` belongs to the line it terminates and
    /// `len()` belongs to the last line.
    fn line_number_of(&self, offset: usize) -> usize;

    fn line_start_offset(&self, line: usize) -> usize;

    /// Offset just past the last character of `line`, excluding its `\n`
    fn line_end_offset(&self, line: usize) -> usize;

    /// Text of lines `start_line..end_line` joined by `\n`, without a trailing terminator.
    /// Returns an empty string when the range is empty.
    fn chars_in_range(&self, start_line: usize, end_line: usize) -> Cow<'_, str>;

    /// Counter that changes whenever the text changes. The tracker compares it against the
    /// value seen at its last update to detect edits it was not told about.
    fn modification_stamp(&self) -> u64;

    fn is_char_boundary(&self, _offset: usize) -> bool {
        true
    }

    fn text(&self) -> Cow<'_, str> {
        self.chars_in_range(0, self.line_count())
    }
}

/// A buffer the tracker can edit during rollback.
///
/// Each call is one atomic mutation and must advance the modification stamp.
pub trait MutableLineBuffer: LineBuffer {
    fn replace_string(&mut self, start: usize, end: usize, text: &str);

    fn insert_string(&mut self, offset: usize, text: &str) {
        self.replace_string(offset, offset, text);
    }

    fn delete_string(&mut self, start: usize, end: usize) {
        self.replace_string(start, end, "");
    }
}
