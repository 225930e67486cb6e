//! Alignment of token slices with imara-diff.
//!
//! imara-diff matches git's diff output closely, which keeps the tracked ranges in line
//! with what `git diff` reports for the same two texts.

use std::hash::Hash;

use imara_diff::{Algorithm, Diff, InternedInput, TokenSource};

use crate::diff::LineBlock;

/// Feeds a borrowed slice to imara-diff token by token.
struct SliceTokens<'a, T> {
    slice: &'a [T],
}

impl<'a, T: Clone + Hash + Eq> TokenSource for SliceTokens<'a, T> {
    type Token = T;
    type Tokenizer = std::iter::Cloned<std::slice::Iter<'a, T>>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.slice.iter().cloned()
    }

    fn estimate_tokens(&self) -> u32 {
        self.slice.len() as u32
    }
}

fn intern<'a, T: Clone + Hash + Eq>(old: &'a [T], new: &'a [T]) -> InternedInput<T> {
    InternedInput::new(SliceTokens { slice: old }, SliceTokens { slice: new })
}

/// Plain Myers alignment without hunk sliding, used for word tokens.
pub fn diff_slices<T: Clone + Hash + Eq>(old: &[T], new: &[T]) -> Vec<LineBlock> {
    let input = intern(old, new);
    let diff = Diff::compute(Algorithm::Myers, &input);
    blocks_from_hunks(&diff, old.len())
}

/// Line alignment with git's hunk sliding applied, so that changed blocks start and end
/// where a reader expects them.
pub fn diff_lines(old: &[&str], new: &[&str], algorithm: Algorithm) -> Vec<LineBlock> {
    let input = intern(old, new);
    let mut diff = Diff::compute(algorithm, &input);
    diff.postprocess_lines(&input);
    blocks_from_hunks(&diff, old.len())
}

/// Expands imara-diff hunks into a gap-free block list, filling the stretches between
/// hunks with equal blocks.
fn blocks_from_hunks(diff: &Diff, old_len: usize) -> Vec<LineBlock> {
    let mut blocks = Vec::new();
    let mut old_pos = 0;
    let mut new_pos = 0;

    for hunk in diff.hunks() {
        let before = hunk.before.start as usize..hunk.before.end as usize;
        let after = hunk.after.start as usize..hunk.after.end as usize;
        if old_pos < before.start {
            blocks.push(LineBlock::equal(old_pos, new_pos, before.start - old_pos));
        }
        old_pos = before.end;
        new_pos = after.end;
        blocks.push(LineBlock::change(before, after));
    }
    if old_pos < old_len {
        blocks.push(LineBlock::equal(old_pos, new_pos, old_len - old_pos));
    }

    blocks
}
