use std::borrow::Cow;
use std::fmt;

use crate::buffer::{LineBuffer, MutableLineBuffer};

/// A `String` with a line start index, used as the base snapshot and as the reference
/// working buffer.
#[derive(Clone)]
pub struct TextBuffer {
    text: String,
    /// Byte offset of the first character of every line; `line_starts[0] == 0`
    line_starts: Vec<usize>,
    stamp: u64,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        TextBuffer {
            text,
            line_starts,
            stamp: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn line(&self, line: usize) -> &str {
        &self.text[self.line_start_offset(line)..self.line_end_offset(line)]
    }

    /// Lines `start_line..end_line` without terminators
    pub fn lines_in(&self, start_line: usize, end_line: usize) -> Vec<&str> {
        (start_line..end_line).map(|line| self.line(line)).collect()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Replaces the whole text as a single edit.
    pub fn set_text(&mut self, text: &str) {
        let len = self.text.len();
        self.replace_string(0, len, text);
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        TextBuffer::new(String::new())
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("text", &self.text)
            .field("lines", &self.line_starts.len())
            .field("stamp", &self.stamp)
            .finish()
    }
}

impl PartialEq<str> for TextBuffer {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for TextBuffer {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
    starts
}

impl LineBuffer for TextBuffer {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_number_of(&self, offset: usize) -> usize {
        assert!(
            offset <= self.text.len(),
            "offset {} is past the end of the buffer ({} bytes)",
            offset,
            self.text.len()
        );
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    fn line_start_offset(&self, line: usize) -> usize {
        self.line_starts[line]
    }

    fn line_end_offset(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next_start) => next_start - 1,
            None => {
                assert!(line < self.line_starts.len(), "line {} is out of range", line);
                self.text.len()
            }
        }
    }

    fn chars_in_range(&self, start_line: usize, end_line: usize) -> Cow<'_, str> {
        if start_line >= end_line {
            return Cow::Borrowed("");
        }
        let start = self.line_start_offset(start_line);
        let end = self.line_end_offset(end_line - 1);
        Cow::Borrowed(&self.text[start..end])
    }

    fn modification_stamp(&self) -> u64 {
        self.stamp
    }

    fn is_char_boundary(&self, offset: usize) -> bool {
        self.text.is_char_boundary(offset)
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }
}

impl MutableLineBuffer for TextBuffer {
    fn replace_string(&mut self, start: usize, end: usize, text: &str) {
        assert!(start <= end, "edit range {}..{} is reversed", start, end);
        self.text.replace_range(start..end, text);

        // Starts in (start, end] followed a removed '\n'; later ones move by the length delta.
        let lo = self.line_starts.partition_point(|&s| s <= start);
        let hi = self.line_starts.partition_point(|&s| s <= end);
        let removed = end - start;
        let patched: Vec<usize> = text
            .match_indices('\n')
            .map(|(idx, _)| start + idx + 1)
            .chain(self.line_starts[hi..].iter().map(|&s| s - removed + text.len()))
            .collect();
        self.line_starts.splice(lo.., patched);

        self.stamp += 1;
    }
}
