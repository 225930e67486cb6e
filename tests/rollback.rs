
use insta::assert_snapshot;
use line_status::{IncrementalPolicy, LineBuffer, RangeKind, TextBuffer, TrackerError};
use rstest::rstest;
use test_utils::{assert_valid, edit, load_fixture, render, rollback_all, tracker};

#[rstest]
#[case::modified(lines!["a", "x", "c"], lines!["a", "b", "c"])]
#[case::inserted_in_middle(lines!["a", "new", "b"], lines!["a", "b"])]
#[case::deleted_in_middle(lines!["a", "c"], lines!["a", "b", "c"])]
#[case::inserted_at_end(lines!["a", "b", "new"], lines!["a", "b"])]
#[case::deleted_at_end(lines!["a"], lines!["a", "b", "c"])]
#[case::inserted_at_start(lines!["new", "a"], lines!["a"])]
#[case::deleted_at_start(lines!["c"], lines!["a", "b", "c"])]
#[case::trailing_newline_added("a\n".to_string(), "a".to_string())]
#[case::trailing_newline_removed("a".to_string(), "a\n".to_string())]
#[case::everything_replaced(lines!["x", "y"], lines!["a", "b", "c"])]
fn test_rollback_restores_base(
    #[case] working: String,
    #[case] base: String,
    #[values(IncrementalPolicy::Off, IncrementalPolicy::Contained, IncrementalPolicy::Bounded)]
    policy: IncrementalPolicy,
) {
    let mut buffer = TextBuffer::new(working);
    let tracker = tracker(&buffer, &base, policy);
    assert_eq!(tracker.ranges(&buffer).len(), 1);

    let range = tracker.ranges(&buffer)[0].clone();
    assert!(tracker.rollback_range(&mut buffer, &range).unwrap());

    assert_eq!(buffer.as_str(), base);
    assert!(tracker.ranges(&buffer).is_empty());
}

#[test]
fn test_rollback_all_round_trips_fixture() {
    let base = load_fixture("base.txt");
    let mut buffer = TextBuffer::new(load_fixture("working.txt"));
    let tracker = tracker(&buffer, &base, IncrementalPolicy::Contained);

    let all_lines: Vec<usize> = (0..buffer.line_count()).collect();
    assert_eq!(tracker.rollback_lines(&mut buffer, all_lines).unwrap(), 2);
    assert_eq!(buffer.as_str(), base);
}

#[test]
fn test_rollback_renumbers_remaining_ranges() {
    let mut buffer = TextBuffer::new(lines!["new", "a", "b", "x", "d"]);
    let tracker = tracker(&buffer, &lines!["a", "b", "c", "d"], IncrementalPolicy::Bounded);
    let ranges = tracker.ranges(&buffer);
    assert_snapshot!(render(&ranges), @"inserted 0..1 <- 0..0; modified 3..4 <- 2..3");
    let modified_id = ranges[1].id();

    assert!(tracker.rollback_range(&mut buffer, &ranges[0]).unwrap());

    let ranges = tracker.ranges(&buffer);
    assert_snapshot!(render(&ranges), @"modified 2..3 <- 2..3");
    assert_eq!(ranges[0].id(), modified_id);
    assert_valid(&tracker, &buffer);
}

#[test]
fn test_rollback_is_idempotent() {
    let mut buffer = TextBuffer::new(lines!["a", "x", "c", "y"]);
    let tracker = tracker(&buffer, &lines!["a", "b", "c", "d"], IncrementalPolicy::Contained);
    let first = tracker.ranges(&buffer)[0].clone();

    assert!(tracker.rollback_range(&mut buffer, &first).unwrap());
    let after_first = buffer.as_str().to_string();
    assert!(!tracker.rollback_range(&mut buffer, &first).unwrap());
    assert_eq!(buffer.as_str(), after_first);
    assert_snapshot!(render(&tracker.ranges(&buffer)), @"modified 3..4 <- 3..4");
}

#[test]
fn test_selection_is_all_or_nothing() {
    let mut buffer = TextBuffer::new(lines!["a", "x1", "x2", "x3", "e", "y"]);
    let tracker = tracker(
        &buffer,
        &lines!["a", "b", "c", "d", "e", "f"],
        IncrementalPolicy::Contained,
    );
    assert_snapshot!(
        render(&tracker.ranges(&buffer)),
        @"modified 1..4 <- 1..4; modified 5..6 <- 5..6"
    );

    // Covers the second range fully and the first one partly.
    assert_eq!(tracker.rollback_lines(&mut buffer, [2, 3, 4, 5]).unwrap(), 1);
    assert_eq!(buffer.as_str(), lines!["a", "x1", "x2", "x3", "e", "f"]);
    assert_snapshot!(render(&tracker.ranges(&buffer)), @"modified 1..4 <- 1..4");
}

#[test]
fn test_deletion_is_selected_by_the_line_it_sits_on() {
    let mut buffer = TextBuffer::new(lines!["a", "d"]);
    let tracker = tracker(&buffer, &lines!["a", "b", "c", "d"], IncrementalPolicy::Contained);
    let deletion = tracker.range_at_line(&buffer, 1).unwrap().unwrap();
    assert_eq!(deletion.kind(), RangeKind::Deleted);

    assert_eq!(tracker.rollback_lines(&mut buffer, [0]).unwrap(), 0);
    assert_eq!(tracker.rollback_lines(&mut buffer, [1]).unwrap(), 1);
    assert_eq!(buffer.as_str(), lines!["a", "b", "c", "d"]);
}

#[test]
fn test_out_of_range_selection_fails_without_mutation() {
    let mut buffer = TextBuffer::new(lines!["a", "x"]);
    let tracker = tracker(&buffer, &lines!["a", "b"], IncrementalPolicy::Contained);

    let err = tracker.rollback_lines(&mut buffer, [1, 2]).unwrap_err();
    assert!(matches!(err, TrackerError::LineOutOfBounds { line: 2, line_count: 2 }));
    assert_eq!(err.to_string(), "Line 2 is outside the buffer (2 lines)");
    assert_eq!(buffer.as_str(), lines!["a", "x"]);
}

#[test]
fn test_rollback_after_typing() {
    let base = lines!["fn main() {", "    run();", "}"];
    let mut buffer = TextBuffer::new(base.clone());
    let tracker = tracker(&buffer, &base, IncrementalPolicy::Contained);

    let at = buffer.line_end_offset(1);
    edit(&tracker, &mut buffer, at, at, "\n    log();");
    edit(&tracker, &mut buffer, 7, 7, "_inner");
    assert_snapshot!(
        render(&tracker.ranges(&buffer)),
        @"modified 0..1 <- 0..1; inserted 2..3 <- 2..2"
    );

    assert_eq!(rollback_all(&tracker, &mut buffer), 2);
    assert_eq!(buffer.as_str(), base);
}

#[test]
fn test_fragment_rollback_restores_one_word() {
    let mut buffer = TextBuffer::new("let total = price * 3 + fee;");
    let tracker = tracker(&buffer, "let total = price * 2 + tax;", IncrementalPolicy::Contained);
    let range = tracker.ranges(&buffer)[0].clone();
    let fragments: Vec<&str> = range
        .fragments()
        .iter()
        .map(|f| &buffer.as_str()[f.working.clone()])
        .collect();
    assert_eq!(fragments, vec!["3", "fee"]);

    assert!(tracker.rollback_fragment(&mut buffer, &range, 1).unwrap());
    assert_eq!(buffer.as_str(), "let total = price * 3 + tax;");

    let range = tracker.ranges(&buffer)[0].clone();
    assert_eq!(range.fragments().len(), 1);
    assert!(tracker.rollback_fragment(&mut buffer, &range, 0).unwrap());
    assert_eq!(buffer.as_str(), "let total = price * 2 + tax;");
    assert!(tracker.ranges(&buffer).is_empty());
}
