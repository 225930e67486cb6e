//! Builds the canonical range list from diff adapter output.

use crate::config::TrackerConfig;
use crate::diff::word_diff::word_fragments;
use crate::diff::{LineBlock, LineDiffer};
use crate::tracker::inner::compute_inner_ranges;
use crate::tracker::range::{ChangeRange, RangeKind};

pub struct RangesBuilder<'a, D: LineDiffer + ?Sized> {
    differ: &'a D,
    config: &'a TrackerConfig,
}

impl<'a, D: LineDiffer + ?Sized> RangesBuilder<'a, D> {
    pub fn new(differ: &'a D, config: &'a TrackerConfig) -> Self {
        RangesBuilder { differ, config }
    }

    /// Ranges between two complete texts, given as lines.
    pub fn build(&self, base: &[&str], working: &[&str]) -> Vec<ChangeRange> {
        self.build_region(base, working, 0, 0)
    }

    /// Ranges between two slices whose first lines sit at `line_offset` in the working
    /// buffer and `vcs_line_offset` in the base revision. Returned ranges use absolute
    /// line numbers.
    pub fn build_region(
        &self,
        base: &[&str],
        working: &[&str],
        line_offset: usize,
        vcs_line_offset: usize,
    ) -> Vec<ChangeRange> {
        let blocks = self.differ.diff_lines(base, working);
        check_blocks(&blocks, base.len(), working.len());

        let mut spans: Vec<Span> = Vec::new();
        for block in blocks.iter().filter(|b| !b.is_equal()) {
            let Some(span) = Span::from_block(block).trimmed(base, working) else {
                continue;
            };
            match spans.last_mut() {
                Some(last) if last.line2 == span.line1 => {
                    // Nothing equal is left between the two blocks.
                    assert_eq!(
                        last.vcs_line2, span.vcs_line1,
                        "diff adapter left an unequal gap before {:?}",
                        block
                    );
                    last.line2 = span.line2;
                    last.vcs_line2 = span.vcs_line2;
                    let merged = *last;
                    match merged.trimmed(base, working) {
                        Some(trimmed) => *last = trimmed,
                        None => {
                            spans.pop();
                        }
                    }
                }
                _ => spans.push(span),
            }
        }

        spans
            .into_iter()
            .map(|span| self.materialize(span, base, working, line_offset, vcs_line_offset))
            .collect()
    }

    fn materialize(
        &self,
        span: Span,
        base: &[&str],
        working: &[&str],
        line_offset: usize,
        vcs_line_offset: usize,
    ) -> ChangeRange {
        let mut range = ChangeRange::new(
            span.line1 + line_offset,
            span.line2 + line_offset,
            span.vcs_line1 + vcs_line_offset,
            span.vcs_line2 + vcs_line_offset,
        );
        if range.kind() != RangeKind::Modified {
            return range;
        }

        let base_slice = &base[span.vcs_line1..span.vcs_line2];
        let working_slice = &working[span.line1..span.line2];
        let max_lines = self.config.max_inner_range_lines;
        if self.config.inner_ranges && working_slice.len() <= max_lines && base_slice.len() <= max_lines
        {
            range = range.with_inner_ranges(compute_inner_ranges(base_slice, working_slice));
        }
        if self.config.word_fragments && working_slice.len() == 1 {
            let base_text = base_slice.join("\n");
            range = range.with_fragments(word_fragments(&base_text, working_slice[0]));
        }
        range
    }
}

/// Relative spans of a changed block while it is being trimmed and merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    line1: usize,
    line2: usize,
    vcs_line1: usize,
    vcs_line2: usize,
}

impl Span {
    fn from_block(block: &LineBlock) -> Self {
        Span {
            line1: block.working.start,
            line2: block.working.end,
            vcs_line1: block.base.start,
            vcs_line2: block.base.end,
        }
    }

    /// Drops leading and trailing lines that are equal on both sides. `None` when nothing
    /// diverges.
    fn trimmed(mut self, base: &[&str], working: &[&str]) -> Option<Self> {
        while self.line1 < self.line2
            && self.vcs_line1 < self.vcs_line2
            && base[self.vcs_line1] == working[self.line1]
        {
            self.line1 += 1;
            self.vcs_line1 += 1;
        }
        while self.line1 < self.line2
            && self.vcs_line1 < self.vcs_line2
            && base[self.vcs_line2 - 1] == working[self.line2 - 1]
        {
            self.line2 -= 1;
            self.vcs_line2 -= 1;
        }
        if self.line1 == self.line2 && self.vcs_line1 == self.vcs_line2 {
            None
        } else {
            Some(self)
        }
    }
}

/// Panics unless the blocks are ordered, non-overlapping and leave only equal-length gaps.
fn check_blocks(blocks: &[LineBlock], base_len: usize, working_len: usize) {
    let mut base_end = 0;
    let mut working_end = 0;
    for block in blocks {
        assert!(
            block.base.start <= block.base.end && block.working.start <= block.working.end,
            "diff adapter returned a reversed block {:?}",
            block
        );
        assert!(
            block.base.start >= base_end && block.working.start >= working_end,
            "diff adapter returned overlapping or unordered block {:?}",
            block
        );
        assert_eq!(
            block.base.start - base_end,
            block.working.start - working_end,
            "diff adapter left an unequal gap before {:?}",
            block
        );
        if block.is_equal() {
            assert_eq!(
                block.base.len(),
                block.working.len(),
                "diff adapter returned an uneven equal block {:?}",
                block
            );
        }
        base_end = block.base.end;
        working_end = block.working.end;
    }
    assert!(
        base_end <= base_len && working_end <= working_len,
        "diff adapter returned blocks past the end of the input"
    );
    assert_eq!(
        base_len - base_end,
        working_len - working_end,
        "diff adapter left an unequal gap at the end of the input"
    );
}
