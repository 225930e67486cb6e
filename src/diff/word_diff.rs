//! Word-level comparison of a single working line against a base slice.

use std::ops::Range;

use serde::Serialize;

use crate::diff::LineBlockKind;
use crate::diff::imara::diff_slices;

/// A differing stretch inside a single-line modification.
///
/// `base` indexes the base slice text (its lines joined by `\n`) and `working` indexes the
/// working line, both as byte ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFragment {
    pub kind: LineBlockKind,
    pub base: Range<usize>,
    pub working: Range<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Punct,
}

fn classify(ch: char) -> CharClass {
    if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else if ch.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Punct
    }
}

/// Splits text into runs of word characters, runs of whitespace and single punctuation
/// characters. Returns byte ranges.
pub fn tokenize_words(text: &str) -> Vec<Range<usize>> {
    let mut tokens: Vec<Range<usize>> = Vec::new();
    let mut current: Option<(CharClass, usize)> = None;

    for (idx, ch) in text.char_indices() {
        let class = classify(ch);
        match current {
            Some((prev, _)) if prev == class && class != CharClass::Punct => {}
            Some((_, start)) => {
                tokens.push(start..idx);
                current = Some((class, idx));
            }
            None => current = Some((class, idx)),
        }
    }
    if let Some((_, start)) = current {
        tokens.push(start..text.len());
    }
    tokens
}

/// Byte span covered by `tokens[range]`, or the insertion point when the range is empty.
fn token_span(tokens: &[Range<usize>], range: Range<usize>, text_len: usize) -> Range<usize> {
    if range.is_empty() {
        let at = tokens.get(range.start).map_or(text_len, |t| t.start);
        return at..at;
    }
    tokens[range.start].start..tokens[range.end - 1].end
}

/// Compares `working` with `base` token by token and returns the differing stretches.
pub fn word_fragments(base: &str, working: &str) -> Vec<WordFragment> {
    let base_tokens = tokenize_words(base);
    let working_tokens = tokenize_words(working);
    let base_words: Vec<&str> = base_tokens.iter().map(|t| &base[t.clone()]).collect();
    let working_words: Vec<&str> = working_tokens.iter().map(|t| &working[t.clone()]).collect();

    diff_slices(&base_words, &working_words)
        .into_iter()
        .filter(|block| !block.is_equal())
        .map(|block| WordFragment {
            kind: block.kind,
            base: token_span(&base_tokens, block.base, base.len()),
            working: token_span(&working_tokens, block.working, working.len()),
        })
        .collect()
}
