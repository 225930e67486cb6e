//! Restoring base revision text into the working buffer.
//!
//! Every rollback is a regular buffer edit announced through `before_edit`/`after_edit`, so
//! the remaining ranges are renumbered by the same code path that handles typing.

use std::collections::BTreeSet;

use crate::buffer::{LineBuffer, MutableLineBuffer, TextBuffer};
use crate::diff::LineDiffer;
use crate::error::TrackerError;
use crate::tracker::line_status_tracker::LineStatusTracker;
use crate::tracker::range::{ChangeRange, RangeKind};
use crate::utils::debug_log;

/// One buffer replacement restoring the base text of a range.
struct RollbackEdit {
    start: usize,
    end: usize,
    text: String,
}

impl RollbackEdit {
    /// Offsets are taken from `buffer` as it is now, so edits computed together must be
    /// applied from the bottom of the buffer up.
    fn for_range<B: LineBuffer + ?Sized>(
        buffer: &B,
        base: &TextBuffer,
        range: &ChangeRange,
    ) -> Self {
        let base_text = base.chars_in_range(range.vcs_line1(), range.vcs_line2());
        let line_count = buffer.line_count();
        let (line1, line2) = (range.line1(), range.line2());
        let (start, end, text) = match range.kind() {
            RangeKind::Modified => (
                buffer.line_start_offset(line1),
                buffer.line_end_offset(line2 - 1),
                base_text.into_owned(),
            ),
            RangeKind::Inserted if line2 < line_count => (
                buffer.line_start_offset(line1),
                buffer.line_start_offset(line2),
                String::new(),
            ),
            // Take the terminator of the line above along with the tail.
            RangeKind::Inserted if line1 > 0 => {
                (buffer.line_end_offset(line1 - 1), buffer.len(), String::new())
            }
            RangeKind::Inserted => (0, buffer.len(), String::new()),
            RangeKind::Deleted if line1 < line_count => {
                let offset = buffer.line_start_offset(line1);
                (offset, offset, format!("{}\n", base_text))
            }
            RangeKind::Deleted => (buffer.len(), buffer.len(), format!("\n{}", base_text)),
        };
        RollbackEdit { start, end, text }
    }
}

impl<D: LineDiffer> LineStatusTracker<D> {
    /// Replaces the working lines of `range` with its base lines as one edit.
    ///
    /// `range` is resolved against the current ranges by its spans. Returns `false` without
    /// touching the buffer when no current range matches.
    pub fn rollback_range<B: MutableLineBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        range: &ChangeRange,
    ) -> Result<bool, TrackerError> {
        let ranges = self.ranges(buffer);
        let Some(current) = ranges.iter().find(|r| r.same_span(range)) else {
            debug_log(&format!("Skipping rollback of stale range {}", range));
            return Ok(false);
        };

        let edit = RollbackEdit::for_range(&*buffer, &self.base_revision(), current);
        self.apply_edit(buffer, edit.start, edit.end, &edit.text)?;
        Ok(true)
    }

    /// Rolls back every range whose working lines are all in `lines`.
    ///
    /// A deletion counts as selected when the line it sits on is selected, or the last line
    /// for a deletion at the end of the buffer. Ranges only partly selected are left alone.
    /// All edits are computed from one snapshot and applied bottom up, so re-diffing after
    /// one rollback cannot drop another. Returns the number of ranges rolled back.
    pub fn rollback_lines<B, I>(&self, buffer: &mut B, lines: I) -> Result<usize, TrackerError>
    where
        B: MutableLineBuffer + ?Sized,
        I: IntoIterator<Item = usize>,
    {
        let line_count = buffer.line_count();
        let mut selected = BTreeSet::new();
        for line in lines {
            if line >= line_count {
                return Err(TrackerError::LineOutOfBounds { line, line_count });
            }
            selected.insert(line);
        }

        let ranges = self.ranges(buffer);
        let base = self.base_revision();
        let edits: Vec<RollbackEdit> = ranges
            .iter()
            .rev()
            .filter(|range| match range.kind() {
                RangeKind::Deleted => {
                    selected.contains(&range.line1())
                        || (range.line1() == line_count && selected.contains(&(line_count - 1)))
                }
                _ => (range.line1()..range.line2()).all(|line| selected.contains(&line)),
            })
            .map(|range| RollbackEdit::for_range(&*buffer, &base, range))
            .collect();

        for edit in &edits {
            self.apply_edit(buffer, edit.start, edit.end, &edit.text)?;
        }
        debug_log(&format!(
            "Rolled back {} range(s) for {} selected line(s)",
            edits.len(),
            selected.len()
        ));
        Ok(edits.len())
    }

    /// Restores the base text of one word fragment of a single-line modified range.
    ///
    /// Returns `false` when the range is stale or has no fragment at `index`.
    pub fn rollback_fragment<B: MutableLineBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        range: &ChangeRange,
        index: usize,
    ) -> Result<bool, TrackerError> {
        let ranges = self.ranges(buffer);
        let Some(current) = ranges.iter().find(|r| r.same_span(range)) else {
            return Ok(false);
        };
        let Some(fragment) = current.fragments().get(index) else {
            return Ok(false);
        };

        let base_text = self.base_content(current);
        let replacement = base_text.get(fragment.base.clone()).ok_or_else(|| {
            TrackerError::Generic(format!(
                "fragment {} does not fit the base text of {}",
                index, current
            ))
        })?;
        let line_start = buffer.line_start_offset(current.line1());
        let start = line_start + fragment.working.start;
        let end = line_start + fragment.working.end;
        self.apply_edit(buffer, start, end, replacement)?;
        Ok(true)
    }

    fn apply_edit<B: MutableLineBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<(), TrackerError> {
        self.before_edit(buffer, start, end)?;
        buffer.replace_string(start, end, text);
        self.after_edit(buffer, start + text.len())
    }
}
