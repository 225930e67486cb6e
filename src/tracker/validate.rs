//! Structural checks over a range list.

use std::fmt;

use crate::tracker::range::{ChangeRange, InnerRangeKind, RangeKind};
use crate::utils::whitespace_insensitive_eq;

/// The first broken invariant found in a range list. `index` is the offending range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Spans reach past the end of the base or working text
    OutOfBounds { index: usize },
    /// Ranges are not ordered consistently on both sides
    Unordered { index: usize },
    /// The range starts on the line where the previous one ends
    Adjacent { index: usize },
    /// A modified range whose first or last lines are equal on both sides
    Trimmable { index: usize },
    /// The unchanged stretch before the range differs between base and working text
    CoverageMismatch { index: usize },
    /// The unchanged stretch after the last range differs between base and working text
    TrailingMismatch,
    /// Inner ranges on a range that is not modified
    UnexpectedInnerRanges { index: usize },
    /// Inner ranges leave gaps, overlap, or mismatch their kind
    InnerPartition { index: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::OutOfBounds { index } => {
                write!(f, "range {} reaches past the end of the text", index)
            }
            InvariantViolation::Unordered { index } => {
                write!(f, "range {} is out of order", index)
            }
            InvariantViolation::Adjacent { index } => {
                write!(f, "range {} touches the previous range", index)
            }
            InvariantViolation::Trimmable { index } => {
                write!(f, "range {} has equal edge lines", index)
            }
            InvariantViolation::CoverageMismatch { index } => {
                write!(f, "unchanged lines before range {} differ", index)
            }
            InvariantViolation::TrailingMismatch => {
                write!(f, "unchanged lines after the last range differ")
            }
            InvariantViolation::UnexpectedInnerRanges { index } => {
                write!(f, "range {} has inner ranges but is not modified", index)
            }
            InvariantViolation::InnerPartition { index } => {
                write!(f, "inner ranges of range {} do not partition it", index)
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Checks ordering, non-adjacency, non-trimmability, coverage and inner-range partition.
pub fn check_ranges(
    ranges: &[ChangeRange],
    base: &[&str],
    working: &[&str],
) -> Result<(), InvariantViolation> {
    let mut line = 0;
    let mut vcs_line = 0;

    for (index, range) in ranges.iter().enumerate() {
        if range.line2() > working.len() || range.vcs_line2() > base.len() {
            return Err(InvariantViolation::OutOfBounds { index });
        }
        if range.line1() < line || range.vcs_line1() < vcs_line {
            return Err(InvariantViolation::Unordered { index });
        }
        if index > 0 && range.line1() == line {
            return Err(InvariantViolation::Adjacent { index });
        }
        if working[line..range.line1()] != base[vcs_line..range.vcs_line1()] {
            return Err(InvariantViolation::CoverageMismatch { index });
        }
        if range.kind() == RangeKind::Modified
            && (working[range.line1()] == base[range.vcs_line1()]
                || working[range.line2() - 1] == base[range.vcs_line2() - 1])
        {
            return Err(InvariantViolation::Trimmable { index });
        }
        check_inner_ranges(index, range, base, working)?;

        line = range.line2();
        vcs_line = range.vcs_line2();
    }

    if working[line..] != base[vcs_line..] {
        return Err(InvariantViolation::TrailingMismatch);
    }
    Ok(())
}

fn check_inner_ranges(
    index: usize,
    range: &ChangeRange,
    base: &[&str],
    working: &[&str],
) -> Result<(), InvariantViolation> {
    if !range.has_inner_ranges() {
        return Ok(());
    }
    if range.kind() != RangeKind::Modified {
        return Err(InvariantViolation::UnexpectedInnerRanges { index });
    }

    let broken = Err(InvariantViolation::InnerPartition { index });
    let base_slice = &base[range.vcs_line1()..range.vcs_line2()];
    let working_slice = &working[range.line1()..range.line2()];
    let mut line = 0;
    let mut vcs_line = 0;

    for inner in range.inner_ranges() {
        if inner.line1 != line || inner.vcs_line1 != vcs_line {
            return broken;
        }
        if inner.line2 < inner.line1 || inner.vcs_line2 < inner.vcs_line1 {
            return broken;
        }
        if inner.line2 > working_slice.len() || inner.vcs_line2 > base_slice.len() {
            return broken;
        }
        let working_width = inner.line2 - inner.line1;
        let base_width = inner.vcs_line2 - inner.vcs_line1;
        let shape_ok = match inner.kind {
            InnerRangeKind::Equal => {
                working_width == base_width
                    && working_width > 0
                    && working_slice[inner.line1..inner.line2]
                        .iter()
                        .zip(&base_slice[inner.vcs_line1..inner.vcs_line2])
                        .all(|(w, b)| whitespace_insensitive_eq(w, b))
            }
            InnerRangeKind::Changed => working_width > 0 && base_width > 0,
            InnerRangeKind::Inserted => working_width > 0 && base_width == 0,
            InnerRangeKind::Deleted => working_width == 0 && base_width > 0,
        };
        if !shape_ok {
            return broken;
        }
        line = inner.line2;
        vcs_line = inner.vcs_line2;
    }

    if line != working_slice.len() || vcs_line != base_slice.len() {
        return broken;
    }
    Ok(())
}
