//! Line-pair diff adapter.
//!
//! The tracker never computes a diff itself. It asks a [`LineDiffer`] for aligned blocks
//! and builds ranges from them. [`ImaraLineDiffer`] is the default implementation.

use std::ops::Range;

use imara_diff::Algorithm;
use serde::Serialize;

pub mod imara;
pub mod word_diff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineBlockKind {
    Equal,
    Changed,
    Inserted,
    Deleted,
}

/// One aligned block of a line diff. Spans are half-open line indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBlock {
    pub base: Range<usize>,
    pub working: Range<usize>,
    pub kind: LineBlockKind,
}

impl LineBlock {
    pub fn equal(base_start: usize, working_start: usize, len: usize) -> Self {
        LineBlock {
            base: base_start..base_start + len,
            working: working_start..working_start + len,
            kind: LineBlockKind::Equal,
        }
    }

    /// A non-equal block; the kind follows from which spans are empty.
    pub fn change(base: Range<usize>, working: Range<usize>) -> Self {
        let kind = match (base.is_empty(), working.is_empty()) {
            (true, _) => LineBlockKind::Inserted,
            (false, true) => LineBlockKind::Deleted,
            (false, false) => LineBlockKind::Changed,
        };
        LineBlock {
            base,
            working,
            kind,
        }
    }

    pub fn is_equal(&self) -> bool {
        self.kind == LineBlockKind::Equal
    }
}

/// Supplies line alignments between a base and a working text.
///
/// Implementations must return blocks ordered by both spans, non-overlapping, with equal
/// blocks of the same length on both sides. Lines not covered by any block are treated as
/// equal, so uncovered stretches must have the same length on both sides. The tracker
/// panics on output that breaks this contract.
pub trait LineDiffer {
    fn diff_lines(&self, base: &[&str], working: &[&str]) -> Vec<LineBlock>;
}

impl<D: LineDiffer + ?Sized> LineDiffer for &D {
    fn diff_lines(&self, base: &[&str], working: &[&str]) -> Vec<LineBlock> {
        (**self).diff_lines(base, working)
    }
}

impl<D: LineDiffer + ?Sized> LineDiffer for Box<D> {
    fn diff_lines(&self, base: &[&str], working: &[&str]) -> Vec<LineBlock> {
        (**self).diff_lines(base, working)
    }
}

/// [`LineDiffer`] backed by imara-diff, comparing lines by exact equality.
#[derive(Debug, Clone, Copy)]
pub struct ImaraLineDiffer {
    algorithm: Algorithm,
}

impl ImaraLineDiffer {
    pub fn new(algorithm: Algorithm) -> Self {
        ImaraLineDiffer { algorithm }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl Default for ImaraLineDiffer {
    fn default() -> Self {
        ImaraLineDiffer::new(Algorithm::Myers)
    }
}

impl LineDiffer for ImaraLineDiffer {
    fn diff_lines(&self, base: &[&str], working: &[&str]) -> Vec<LineBlock> {
        imara::diff_lines(base, working, self.algorithm)
    }
}
