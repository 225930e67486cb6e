//! Line-granular inner ranges of a modified range.
//!
//! Each working line is matched against the first not yet consumed base line that is equal
//! ignoring whitespace. Matching is greedy and never looks back, so repeated lines can be
//! paired with an earlier base line than an optimal alignment would pick.

use std::ops::Range;

use crate::tracker::range::{InnerRange, InnerRangeKind};
use crate::utils::whitespace_insensitive_eq;

/// Partitions `working` into inner ranges relative to `base`.
///
/// The working spans of the result cover `0..working.len()` without gaps and the base
/// spans cover `0..base.len()` without gaps. Deleted inner ranges have zero working width.
pub fn compute_inner_ranges(base: &[&str], working: &[&str]) -> Vec<InnerRange> {
    let mut result: Vec<InnerRange> = Vec::new();
    let mut gap_working_start = 0;
    let mut base_cursor = 0;

    for (w, line) in working.iter().enumerate() {
        let matched = base[base_cursor..]
            .iter()
            .position(|candidate| whitespace_insensitive_eq(candidate, line));
        if let Some(offset) = matched {
            let b = base_cursor + offset;
            push_gap(&mut result, gap_working_start..w, base_cursor..b);
            push(
                &mut result,
                InnerRange {
                    line1: w,
                    line2: w + 1,
                    vcs_line1: b,
                    vcs_line2: b + 1,
                    kind: InnerRangeKind::Equal,
                },
            );
            gap_working_start = w + 1;
            base_cursor = b + 1;
        }
    }
    push_gap(
        &mut result,
        gap_working_start..working.len(),
        base_cursor..base.len(),
    );

    result
}

/// Classifies the unmatched stretch between two anchors.
fn push_gap(result: &mut Vec<InnerRange>, working: Range<usize>, base: Range<usize>) {
    let kind = match (working.is_empty(), base.is_empty()) {
        (true, true) => return,
        (false, false) => InnerRangeKind::Changed,
        (false, true) => InnerRangeKind::Inserted,
        (true, false) => InnerRangeKind::Deleted,
    };
    push(
        result,
        InnerRange {
            line1: working.start,
            line2: working.end,
            vcs_line1: base.start,
            vcs_line2: base.end,
            kind,
        },
    );
}

/// Appends, folding consecutive equal lines into one inner range.
fn push(result: &mut Vec<InnerRange>, inner: InnerRange) {
    if let Some(last) = result.last_mut()
        && last.kind == InnerRangeKind::Equal
        && inner.kind == InnerRangeKind::Equal
        && last.line2 == inner.line1
        && last.vcs_line2 == inner.vcs_line1
    {
        last.line2 = inner.line2;
        last.vcs_line2 = inner.vcs_line2;
        return;
    }
    result.push(inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(inner: &[InnerRange]) -> Vec<String> {
        inner.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_single_changed_line() {
        assert_eq!(
            render(&compute_inner_ranges(&["b"], &["x"])),
            vec!["changed 0..1 <- 0..1"]
        );
    }

    #[test]
    fn test_whitespace_only_change_is_equal() {
        assert_eq!(
            render(&compute_inner_ranges(&["  let a = 1;"], &["let a=1;"])),
            vec!["equal 0..1 <- 0..1"]
        );
    }

    #[test]
    fn test_deleted_base_lines_between_matches() {
        let inner = compute_inner_ranges(&["a", "gone", "c"], &["a ", " c"]);
        assert_eq!(
            render(&inner),
            vec!["equal 0..1 <- 0..1", "deleted 1..1 <- 1..2", "equal 1..2 <- 2..3"]
        );
    }

    #[test]
    fn test_trailing_inserted_lines() {
        let inner = compute_inner_ranges(&["a"], &["a", "new", "more"]);
        assert_eq!(
            render(&inner),
            vec!["equal 0..1 <- 0..1", "inserted 1..3 <- 1..1"]
        );
    }

    #[test]
    fn test_greedy_match_takes_first_unconsumed_line() {
        // "y" matches base line 1 and consumes the leading "x", so the working "x" can
        // only pair with the later one.
        let inner = compute_inner_ranges(&["x", "y", "x"], &["y", "x"]);
        assert_eq!(
            render(&inner),
            vec!["deleted 0..0 <- 0..1", "equal 0..2 <- 1..3"]
        );
    }

    #[test]
    fn test_greedy_match_can_skip_better_pairings() {
        // The first working line jumps to the last base line, leaving nothing for the rest.
        let inner = compute_inner_ranges(&["a", "b", "z"], &["z", "a", "b"]);
        assert_eq!(
            render(&inner),
            vec!["deleted 0..0 <- 0..2", "equal 0..1 <- 2..3", "inserted 1..3 <- 3..3"]
        );
    }

    #[test]
    fn test_partition_is_complete() {
        let base = ["fn main() {", "    old();", "    keep();", "}"];
        let working = ["fn main() {", "    new();", "    newer();", "    keep();", "}"];
        let inner = compute_inner_ranges(&base, &working);
        let mut next = 0;
        for range in &inner {
            assert_eq!(range.line1, next);
            next = range.line2;
        }
        assert_eq!(next, working.len());
        assert_eq!(
            render(&inner),
            vec![
                "equal 0..1 <- 0..1",
                "changed 1..3 <- 1..2",
                "equal 3..5 <- 2..4"
            ]
        );
    }
}
