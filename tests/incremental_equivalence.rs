
use line_status::{IncrementalPolicy, LineBuffer, TextBuffer};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use insta::assert_snapshot;
use rstest::rstest;
use test_utils::{assert_valid, edit, full_rebuild, render, rollback_all, tracker};

/// One edit expressed against the current buffer.
#[derive(Debug, Clone, Copy)]
enum Step {
    ReplaceLine(usize, &'static str),
    InsertLineBefore(usize, &'static str),
    AppendToLine(usize, &'static str),
    DeleteLine(usize),
    JoinWithNext(usize),
    AppendLine(&'static str),
}

fn apply(
    tracker: &line_status::LineStatusTracker,
    buffer: &mut TextBuffer,
    step: Step,
) {
    match step {
        Step::ReplaceLine(line, text) => {
            let start = buffer.line_start_offset(line);
            let end = buffer.line_end_offset(line);
            edit(tracker, buffer, start, end, text);
        }
        Step::InsertLineBefore(line, text) => {
            let at = buffer.line_start_offset(line);
            edit(tracker, buffer, at, at, &format!("{}\n", text));
        }
        Step::AppendToLine(line, text) => {
            let at = buffer.line_end_offset(line);
            edit(tracker, buffer, at, at, text);
        }
        Step::DeleteLine(line) => {
            let start = buffer.line_start_offset(line);
            let end = buffer.line_start_offset(line + 1);
            edit(tracker, buffer, start, end, "");
        }
        Step::JoinWithNext(line) => {
            let at = buffer.line_end_offset(line);
            edit(tracker, buffer, at, at + 1, "");
        }
        Step::AppendLine(text) => {
            let at = buffer.len();
            edit(tracker, buffer, at, at, &format!("\n{}", text));
        }
    }
}

fn numbered_lines(count: usize) -> String {
    (0..count)
        .map(|i| format!("line {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

#[rstest]
#[case::edit_then_revert(vec![
    Step::ReplaceLine(2, "changed two"),
    Step::AppendToLine(2, "!"),
    Step::ReplaceLine(2, "line 2"),
])]
#[case::grow_and_shrink(vec![
    Step::InsertLineBefore(5, "fresh a"),
    Step::InsertLineBefore(6, "fresh b"),
    Step::DeleteLine(5),
    Step::DeleteLine(5),
])]
#[case::merge_neighbouring_ranges(vec![
    Step::ReplaceLine(3, "three"),
    Step::ReplaceLine(5, "five"),
    Step::ReplaceLine(4, "four"),
    Step::ReplaceLine(4, "line 4"),
])]
#[case::edits_at_both_ends(vec![
    Step::ReplaceLine(0, "first"),
    Step::AppendLine("tail"),
    Step::InsertLineBefore(0, "head"),
    Step::DeleteLine(9),
])]
#[case::join_and_delete(vec![
    Step::JoinWithNext(0),
    Step::DeleteLine(7),
    Step::AppendToLine(0, " more"),
    Step::ReplaceLine(3, "middle"),
])]
fn test_incremental_matches_full_rebuild(
    #[case] steps: Vec<Step>,
    #[values(IncrementalPolicy::Off, IncrementalPolicy::Contained, IncrementalPolicy::Bounded)]
    policy: IncrementalPolicy,
) {
    let base = numbered_lines(10);
    let mut buffer = TextBuffer::new(base.clone());
    let tracker = tracker(&buffer, &base, policy);

    for step in steps {
        apply(&tracker, &mut buffer, step);
        let expected = full_rebuild(&buffer, &base);
        let actual = tracker.ranges(&buffer);
        assert_eq!(
            render(&actual),
            render(&expected),
            "after {:?} on {:?}",
            step,
            buffer.as_str()
        );
        assert_eq!(actual[..], expected[..], "inner structure after {:?}", step);
        assert_valid(&tracker, &buffer);
    }
}

#[test]
fn test_reverted_edit_leaves_no_ranges() {
    let base = lines!["alpha", "beta", "gamma"];
    let mut buffer = TextBuffer::new(base.clone());
    let tracker = tracker(&buffer, &base, IncrementalPolicy::Bounded);

    apply(&tracker, &mut buffer, Step::ReplaceLine(1, "BETA"));
    assert_eq!(render(&tracker.ranges(&buffer)), "modified 1..2 <- 1..2");
    apply(&tracker, &mut buffer, Step::ReplaceLine(1, "beta"));
    assert!(tracker.ranges(&buffer).is_empty());
}

const PIECES: &[&str] = &["", "a", "b", "x", "\n", "a\n", "\nb", "c\nd\n", "  "];

fn random_text(rng: &mut StdRng, lines: usize) -> String {
    (0..lines)
        .map(|_| *["a", "b", "c", "d", ""].choose(rng).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

fn random_edit(rng: &mut StdRng, buffer: &TextBuffer) -> (usize, usize, &'static str) {
    let len = buffer.len();
    let start = rng.gen_range(0..=len);
    let end = rng.gen_range(start..=(start + 4).min(len));
    (start, end, *PIECES.choose(rng).unwrap())
}

#[test]
fn test_random_edits_match_full_rebuild() {
    for seed in 0..200u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = random_text(&mut rng, 12);
        let mut buffer = TextBuffer::new(base.clone());
        let tracker = tracker(&buffer, &base, IncrementalPolicy::Contained);

        for _ in 0..30 {
            let (start, end, text) = random_edit(&mut rng, &buffer);
            edit(&tracker, &mut buffer, start, end, text);

            let expected = full_rebuild(&buffer, &base);
            let actual = tracker.ranges(&buffer);
            assert_eq!(
                render(&actual),
                render(&expected),
                "seed {} after replacing {}..{} with {:?}, base {:?}, working {:?}",
                seed,
                start,
                end,
                text,
                base,
                buffer.as_str()
            );
            assert_eq!(actual[..], expected[..], "inner structure, seed {}", seed);
        }
    }
}

#[test]
fn test_typing_inside_isolated_range_matches_full_rebuild() {
    let base = lines!["fn a() {}", "", "let x = 1;", "", "fn b() {}"];
    let mut buffer = TextBuffer::new(lines!["fn a() {}", "", "let y = 2;", "", "fn b() {}"]);
    let tracker = tracker(&buffer, &base, IncrementalPolicy::Contained);
    let modified_id = tracker.ranges(&buffer)[0].id();

    for digit in ["3", "4", "5"] {
        let at = buffer.line_end_offset(2) - 1;
        edit(&tracker, &mut buffer, at, at, digit);
        assert_eq!(tracker.ranges(&buffer)[..], full_rebuild(&buffer, &base)[..]);
    }
    assert_eq!(buffer.line(2), "let y = 2345;");
    let ranges = tracker.ranges(&buffer);
    assert_snapshot!(render(&ranges), @"modified 2..3 <- 2..3");
    assert_eq!(ranges[0].id(), modified_id);
}

#[rstest]
fn test_random_edits_keep_invariants(
    #[values(IncrementalPolicy::Contained, IncrementalPolicy::Bounded)] policy: IncrementalPolicy,
) {
    for seed in 0..25u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = random_text(&mut rng, 12);
        let mut buffer = TextBuffer::new(base.clone());
        let tracker = tracker(&buffer, &base, policy);

        for _ in 0..40 {
            let (start, end, text) = random_edit(&mut rng, &buffer);
            edit(&tracker, &mut buffer, start, end, text);
            assert_valid(&tracker, &buffer);
        }

        let range_count = tracker.ranges(&buffer).len();
        assert_eq!(rollback_all(&tracker, &mut buffer), range_count, "seed {}", seed);
        assert_eq!(buffer.as_str(), base, "seed {}", seed);
    }
}

#[rstest]
fn test_rollback_all_restores_random_pairs(
    #[values(IncrementalPolicy::Off, IncrementalPolicy::Contained)] policy: IncrementalPolicy,
) {
    for seed in 0..300u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = random_text(&mut rng, 10);
        let working = random_text(&mut rng, 10);
        let mut buffer = TextBuffer::new(working);
        let tracker = tracker(&buffer, &base, policy);

        let range_count = tracker.ranges(&buffer).len();
        assert_eq!(rollback_all(&tracker, &mut buffer), range_count, "seed {}", seed);
        assert_eq!(buffer.as_str(), base, "seed {}", seed);
        assert!(tracker.ranges(&buffer).is_empty(), "seed {}", seed);
    }
}
