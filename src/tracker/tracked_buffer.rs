use std::sync::Arc;

use crate::buffer::MutableLineBuffer;
use crate::config::TrackerConfig;
use crate::diff::{ImaraLineDiffer, LineDiffer};
use crate::error::TrackerError;
use crate::tracker::line_status_tracker::LineStatusTracker;
use crate::tracker::range::ChangeRange;

/// A working buffer bundled with its tracker. Every mutation goes through the
/// `before_edit`/`after_edit` bracket, so the tracker never has to rediscover edits.
pub struct TrackedBuffer<B: MutableLineBuffer, D: LineDiffer = ImaraLineDiffer> {
    buffer: B,
    tracker: LineStatusTracker<D>,
}

impl<B: MutableLineBuffer> TrackedBuffer<B, ImaraLineDiffer> {
    pub fn new(buffer: B, base: impl Into<String>) -> Self {
        let tracker = LineStatusTracker::new(&buffer, base);
        TrackedBuffer { buffer, tracker }
    }
}

impl<B: MutableLineBuffer, D: LineDiffer> TrackedBuffer<B, D> {
    pub fn with_differ(buffer: B, base: impl Into<String>, differ: D, config: TrackerConfig) -> Self {
        let tracker = LineStatusTracker::with_differ(&buffer, base, differ, config);
        TrackedBuffer { buffer, tracker }
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn tracker(&self) -> &LineStatusTracker<D> {
        &self.tracker
    }

    pub fn insert_string(&mut self, offset: usize, text: &str) -> Result<(), TrackerError> {
        self.replace_string(offset, offset, text)
    }

    pub fn delete_string(&mut self, start: usize, end: usize) -> Result<(), TrackerError> {
        self.replace_string(start, end, "")
    }

    pub fn replace_string(&mut self, start: usize, end: usize, text: &str) -> Result<(), TrackerError> {
        self.tracker.before_edit(&self.buffer, start, end)?;
        self.buffer.replace_string(start, end, text);
        self.tracker.after_edit(&self.buffer, start + text.len())
    }

    pub fn ranges(&self) -> Arc<Vec<ChangeRange>> {
        self.tracker.ranges(&self.buffer)
    }

    pub fn set_base_revision(&self, base: impl Into<String>) {
        self.tracker.set_base_revision(&self.buffer, base);
    }

    pub fn rollback_range(&mut self, range: &ChangeRange) -> Result<bool, TrackerError> {
        self.tracker.rollback_range(&mut self.buffer, range)
    }

    pub fn rollback_lines(
        &mut self,
        lines: impl IntoIterator<Item = usize>,
    ) -> Result<usize, TrackerError> {
        self.tracker.rollback_lines(&mut self.buffer, lines)
    }

    pub fn rollback_fragment(
        &mut self,
        range: &ChangeRange,
        index: usize,
    ) -> Result<bool, TrackerError> {
        self.tracker.rollback_fragment(&mut self.buffer, range, index)
    }

    /// Stops tracking and hands the buffer back unchanged.
    pub fn release(self) -> B {
        self.tracker.release();
        self.buffer
    }
}
