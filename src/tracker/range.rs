use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::diff::word_diff::WordFragment;

static NEXT_RANGE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a range across edits that do not touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RangeId(u64);

impl RangeId {
    pub(crate) fn next() -> Self {
        RangeId(NEXT_RANGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    Inserted,
    Deleted,
    Modified,
}

impl RangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKind::Inserted => "inserted",
            RangeKind::Deleted => "deleted",
            RangeKind::Modified => "modified",
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InnerRangeKind {
    Equal,
    Changed,
    Inserted,
    Deleted,
}

impl InnerRangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InnerRangeKind::Equal => "equal",
            InnerRangeKind::Changed => "changed",
            InnerRangeKind::Inserted => "inserted",
            InnerRangeKind::Deleted => "deleted",
        }
    }
}

/// Line-granular piece of a modified range.
///
/// Both spans are relative to the owning range: `line1..line2` to its working lines and
/// `vcs_line1..vcs_line2` to its base lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InnerRange {
    pub line1: usize,
    pub line2: usize,
    pub vcs_line1: usize,
    pub vcs_line2: usize,
    pub kind: InnerRangeKind,
}

impl fmt::Display for InnerRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}..{} <- {}..{}",
            self.kind.as_str(),
            self.line1,
            self.line2,
            self.vcs_line1,
            self.vcs_line2
        )
    }
}

/// One contiguous divergence between the working buffer and the base revision.
///
/// `line1..line2` are working-buffer lines, `vcs_line1..vcs_line2` base-revision lines,
/// both half-open. Equality ignores the [`RangeId`].
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRange {
    #[serde(skip)]
    id: RangeId,
    line1: usize,
    line2: usize,
    vcs_line1: usize,
    vcs_line2: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    inner_ranges: Option<Vec<InnerRange>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fragments: Option<Vec<WordFragment>>,
}

impl ChangeRange {
    pub fn new(line1: usize, line2: usize, vcs_line1: usize, vcs_line2: usize) -> Self {
        assert!(line1 <= line2 && vcs_line1 <= vcs_line2);
        assert!(
            line1 != line2 || vcs_line1 != vcs_line2,
            "a range must diverge on at least one side"
        );
        ChangeRange {
            id: RangeId::next(),
            line1,
            line2,
            vcs_line1,
            vcs_line2,
            inner_ranges: None,
            fragments: None,
        }
    }

    pub fn id(&self) -> RangeId {
        self.id
    }

    pub fn line1(&self) -> usize {
        self.line1
    }

    pub fn line2(&self) -> usize {
        self.line2
    }

    pub fn vcs_line1(&self) -> usize {
        self.vcs_line1
    }

    pub fn vcs_line2(&self) -> usize {
        self.vcs_line2
    }

    pub fn kind(&self) -> RangeKind {
        if self.line1 == self.line2 {
            RangeKind::Deleted
        } else if self.vcs_line1 == self.vcs_line2 {
            RangeKind::Inserted
        } else {
            RangeKind::Modified
        }
    }

    /// Number of working lines
    pub fn line_count(&self) -> usize {
        self.line2 - self.line1
    }

    /// Number of base lines
    pub fn vcs_line_count(&self) -> usize {
        self.vcs_line2 - self.vcs_line1
    }

    /// Inner ranges, empty unless this is a modified range they were computed for
    pub fn inner_ranges(&self) -> &[InnerRange] {
        self.inner_ranges.as_deref().unwrap_or(&[])
    }

    pub fn has_inner_ranges(&self) -> bool {
        self.inner_ranges.is_some()
    }

    /// Word fragments, only present on modified ranges spanning one working line
    pub fn fragments(&self) -> &[WordFragment] {
        self.fragments.as_deref().unwrap_or(&[])
    }

    /// Whether `line` falls in this range, counting a deletion as sitting on its `line1`
    pub fn contains_line(&self, line: usize) -> bool {
        if self.line1 == self.line2 {
            line == self.line1
        } else {
            self.line1 <= line && line < self.line2
        }
    }

    /// Same working and base spans, regardless of identity and inner structure
    pub fn same_span(&self, other: &ChangeRange) -> bool {
        self.line1 == other.line1
            && self.line2 == other.line2
            && self.vcs_line1 == other.vcs_line1
            && self.vcs_line2 == other.vcs_line2
    }

    pub(crate) fn with_inner_ranges(mut self, inner_ranges: Vec<InnerRange>) -> Self {
        self.inner_ranges = Some(inner_ranges);
        self
    }

    pub(crate) fn with_fragments(mut self, fragments: Vec<WordFragment>) -> Self {
        self.fragments = Some(fragments);
        self
    }

    pub(crate) fn with_id(mut self, id: RangeId) -> Self {
        self.id = id;
        self
    }

    /// Moves the working span by `delta` lines, keeping identity and base span.
    pub(crate) fn shifted(&self, delta: isize) -> Self {
        let shift = |line: usize| match line.checked_add_signed(delta) {
            Some(line) => line,
            None => panic!("shifting line {} by {} leaves the buffer", line, delta),
        };
        let mut shifted = self.clone();
        shifted.line1 = shift(self.line1);
        shifted.line2 = shift(self.line2);
        shifted
    }
}

impl PartialEq for ChangeRange {
    fn eq(&self, other: &Self) -> bool {
        self.same_span(other)
            && self.inner_ranges == other.inner_ranges
            && self.fragments == other.fragments
    }
}

impl Eq for ChangeRange {}

impl fmt::Display for ChangeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}..{} <- {}..{}",
            self.kind(),
            self.line1,
            self.line2,
            self.vcs_line1,
            self.vcs_line2
        )
    }
}

/// Counts over a range list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RangeStats {
    pub inserted: usize,
    pub deleted: usize,
    pub modified: usize,
    /// Working lines covered by ranges
    pub added_lines: usize,
    /// Base lines covered by ranges
    pub removed_lines: usize,
}

impl RangeStats {
    pub fn from_ranges(ranges: &[ChangeRange]) -> Self {
        let mut stats = RangeStats::default();
        for range in ranges {
            match range.kind() {
                RangeKind::Inserted => stats.inserted += 1,
                RangeKind::Deleted => stats.deleted += 1,
                RangeKind::Modified => stats.modified += 1,
            }
            stats.added_lines += range.line_count();
            stats.removed_lines += range.vcs_line_count();
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.inserted + self.deleted + self.modified == 0
    }
}
