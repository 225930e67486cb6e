//! The stateful engine keeping ranges in sync with a working buffer.
//!
//! The host brackets every mutation of the working buffer with [`LineStatusTracker::before_edit`]
//! and [`LineStatusTracker::after_edit`]. From the line span of the edit the tracker works out
//! which ranges can be affected, re-diffs only that region when the incremental policy
//! allows it, shifts the ranges after it and publishes a new snapshot. Anything it cannot
//! reason about locally (unreported edits, policy fallbacks, failed validation) ends in a
//! full rebuild.

use std::collections::{HashMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::buffer::{LineBuffer, TextBuffer};
use crate::config::{IncrementalPolicy, TrackerConfig};
use crate::diff::{ImaraLineDiffer, LineDiffer};
use crate::error::TrackerError;
use crate::tracker::builder::RangesBuilder;
use crate::tracker::range::{ChangeRange, RangeStats};
use crate::tracker::validate::check_ranges;
use crate::utils::{
    debug_log, debug_performance_log, debug_performance_log_structured, split_lines,
};

/// What the tracker last saw of the working buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SyncPoint {
    stamp: u64,
    line_count: usize,
}

impl SyncPoint {
    fn of<B: LineBuffer + ?Sized>(buffer: &B) -> Self {
        SyncPoint {
            stamp: buffer.modification_stamp(),
            line_count: buffer.line_count(),
        }
    }
}

/// Line span of an announced edit, in pre-edit coordinates.
#[derive(Debug, Clone, Copy)]
struct PendingEdit {
    start: usize,
    /// First edited line
    line1: usize,
    /// One past the last edited line
    line2: usize,
    line_count: usize,
    /// The edit lies inside one range whose lines occur nowhere in the opposite text
    isolated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RebuildReason {
    Initial,
    BaseRevision,
    Unsynced,
    Policy,
    Inconsistent,
    Validation,
}

impl RebuildReason {
    fn as_str(&self) -> &'static str {
        match self {
            RebuildReason::Initial => "initial",
            RebuildReason::BaseRevision => "base_revision",
            RebuildReason::Unsynced => "unsynced",
            RebuildReason::Policy => "policy",
            RebuildReason::Inconsistent => "inconsistent",
            RebuildReason::Validation => "validation",
        }
    }
}

struct TrackerState {
    base: Arc<TextBuffer>,
    /// Hashes of every base line. A hit may be a collision, a miss never is.
    base_hashes: HashSet<u64>,
    ranges: Arc<Vec<ChangeRange>>,
    /// `None` forces a full rebuild on next access
    sync: Option<SyncPoint>,
    pending: Option<PendingEdit>,
}

/// Tracks line differences between a working buffer and a base revision.
///
/// The working buffer is not owned; every call that needs it takes it by reference, and
/// rollback takes it by `&mut` so no other edit can overlap. Range lists are published as
/// immutable `Arc` snapshots.
pub struct LineStatusTracker<D: LineDiffer = ImaraLineDiffer> {
    differ: D,
    config: TrackerConfig,
    state: Mutex<TrackerState>,
}

impl LineStatusTracker<ImaraLineDiffer> {
    /// Starts tracking `buffer` against `base` with the imara-diff adapter and the
    /// process-wide configuration.
    pub fn new<B: LineBuffer + ?Sized>(buffer: &B, base: impl Into<String>) -> Self {
        Self::with_differ(buffer, base, ImaraLineDiffer::default(), TrackerConfig::get().clone())
    }
}

impl<D: LineDiffer> LineStatusTracker<D> {
    pub fn with_differ<B: LineBuffer + ?Sized>(
        buffer: &B,
        base: impl Into<String>,
        differ: D,
        config: TrackerConfig,
    ) -> Self {
        let base = TextBuffer::new(base);
        let tracker = LineStatusTracker {
            differ,
            config,
            state: Mutex::new(TrackerState {
                base_hashes: hash_lines(base.lines()),
                base: Arc::new(base),
                ranges: Arc::new(Vec::new()),
                sync: None,
                pending: None,
            }),
        };
        {
            let mut state = tracker.lock_state();
            tracker.rebuild(&mut state, buffer, RebuildReason::Initial);
        }
        tracker
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replaces the base revision and rebuilds every range.
    pub fn set_base_revision<B: LineBuffer + ?Sized>(&self, buffer: &B, base: impl Into<String>) {
        let mut state = self.lock_state();
        let base = TextBuffer::new(base);
        state.base_hashes = hash_lines(base.lines());
        state.base = Arc::new(base);
        self.rebuild(&mut state, buffer, RebuildReason::BaseRevision);
    }

    /// Current base revision snapshot
    pub fn base_revision(&self) -> Arc<TextBuffer> {
        self.lock_state().base.clone()
    }

    /// Announces that `start..end` of `buffer` is about to be replaced.
    pub fn before_edit<B: LineBuffer + ?Sized>(
        &self,
        buffer: &B,
        start: usize,
        end: usize,
    ) -> Result<(), TrackerError> {
        check_offset(buffer, start)?;
        check_offset(buffer, end)?;
        if start > end {
            return Err(TrackerError::InvalidEditRange { start, end });
        }

        let mut state = self.lock_state();
        if state.pending.take().is_some() {
            debug_log("Edit announced while another was pending; resynchronizing");
            state.sync = None;
        }
        self.ensure_synced(&mut state, buffer);
        let line1 = buffer.line_number_of(start);
        let line2 = buffer.line_number_of(end) + 1;
        let isolated = self.config.incremental == IncrementalPolicy::Contained
            && edit_in_isolated_range(&state, buffer, line1, line2);
        state.pending = Some(PendingEdit {
            start,
            line1,
            line2,
            line_count: buffer.line_count(),
            isolated,
        });
        Ok(())
    }

    /// Reports that the announced edit is done and its new text ends at `new_end`.
    pub fn after_edit<B: LineBuffer + ?Sized>(
        &self,
        buffer: &B,
        new_end: usize,
    ) -> Result<(), TrackerError> {
        check_offset(buffer, new_end)?;

        let mut state = self.lock_state();
        let Some(edit) = state.pending.take() else {
            debug_log("Edit completed without being announced");
            self.ensure_synced(&mut state, buffer);
            return Ok(());
        };
        if new_end < edit.start {
            return Err(TrackerError::InvalidEditRange {
                start: edit.start,
                end: new_end,
            });
        }

        let shift = buffer.line_count() as isize - edit.line_count as isize;
        let after_line2 = buffer.line_number_of(new_end) + 1;
        if after_line2 as isize != edit.line2 as isize + shift {
            self.rebuild(&mut state, buffer, RebuildReason::Inconsistent);
            return Ok(());
        }
        self.update_ranges(&mut state, buffer, edit, shift);
        Ok(())
    }

    /// Ranges for the current buffer content. Rebuilds first if the buffer changed behind
    /// the tracker's back.
    pub fn ranges<B: LineBuffer + ?Sized>(&self, buffer: &B) -> Arc<Vec<ChangeRange>> {
        let mut state = self.lock_state();
        self.ensure_synced(&mut state, buffer);
        state.ranges.clone()
    }

    /// Last published snapshot, without checking it against the buffer.
    pub fn last_ranges(&self) -> Arc<Vec<ChangeRange>> {
        self.lock_state().ranges.clone()
    }

    /// The range containing `line`, or the deletion sitting on it.
    pub fn range_at_line<B: LineBuffer + ?Sized>(
        &self,
        buffer: &B,
        line: usize,
    ) -> Result<Option<ChangeRange>, TrackerError> {
        check_line(buffer, line)?;
        let ranges = self.ranges(buffer);
        Ok(ranges.iter().find(|r| r.contains_line(line)).cloned())
    }

    /// First range starting after `line`.
    pub fn next_range<B: LineBuffer + ?Sized>(
        &self,
        buffer: &B,
        line: usize,
    ) -> Result<Option<ChangeRange>, TrackerError> {
        check_line(buffer, line)?;
        let ranges = self.ranges(buffer);
        Ok(ranges.iter().find(|r| r.line1() > line).cloned())
    }

    /// Last range ending before `line`.
    pub fn prev_range<B: LineBuffer + ?Sized>(
        &self,
        buffer: &B,
        line: usize,
    ) -> Result<Option<ChangeRange>, TrackerError> {
        check_line(buffer, line)?;
        let ranges = self.ranges(buffer);
        Ok(ranges
            .iter()
            .rev()
            .find(|r| r.line2() < line || (r.line2() == line && r.line1() < line))
            .cloned())
    }

    /// Base text covered by `range`, lines joined by `\n`.
    pub fn base_content(&self, range: &ChangeRange) -> String {
        let base = self.base_revision();
        base.chars_in_range(range.vcs_line1(), range.vcs_line2())
            .into_owned()
    }

    /// Working text covered by `range`, lines joined by `\n`.
    pub fn working_content<B: LineBuffer + ?Sized>(
        &self,
        buffer: &B,
        range: &ChangeRange,
    ) -> Result<String, TrackerError> {
        if range.line2() > buffer.line_count() {
            return Err(TrackerError::LineOutOfBounds {
                line: range.line2(),
                line_count: buffer.line_count(),
            });
        }
        Ok(buffer
            .chars_in_range(range.line1(), range.line2())
            .into_owned())
    }

    pub fn summary<B: LineBuffer + ?Sized>(&self, buffer: &B) -> RangeStats {
        RangeStats::from_ranges(&self.ranges(buffer))
    }

    /// Stops tracking. The buffer is left untouched.
    pub fn release(self) {
        let state = self.lock_state();
        debug_log(&format!(
            "Released tracker with {} range(s)",
            state.ranges.len()
        ));
    }

    fn lock_state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            debug_log("Tracker state lock was poisoned; forcing a full rebuild");
            self.state.clear_poison();
            let mut state = poisoned.into_inner();
            state.sync = None;
            state.pending = None;
            state
        })
    }

    fn ensure_synced<B: LineBuffer + ?Sized>(&self, state: &mut TrackerState, buffer: &B) {
        if state.sync != Some(SyncPoint::of(buffer)) {
            self.rebuild(state, buffer, RebuildReason::Unsynced);
        }
    }

    fn rebuild<B: LineBuffer + ?Sized>(
        &self,
        state: &mut TrackerState,
        buffer: &B,
        reason: RebuildReason,
    ) {
        let started = Instant::now();
        let working_text = buffer.chars_in_range(0, buffer.line_count());
        let working = split_lines(&working_text);
        let base: Vec<&str> = state.base.lines().collect();
        let mut ranges = RangesBuilder::new(&self.differ, &self.config).build(&base, &working);
        if reason != RebuildReason::Initial && reason != RebuildReason::BaseRevision {
            ranges = carry_over_ids(&state.ranges, ranges);
        }

        if reason != RebuildReason::Initial && reason != RebuildReason::BaseRevision {
            debug_log(&format!(
                "Full rebuild ({}) produced {} range(s)",
                reason.as_str(),
                ranges.len()
            ));
        }
        let elapsed = started.elapsed();
        debug_performance_log(&format!(
            "full rebuild ({}) of {} line(s) took {:?}",
            reason.as_str(),
            working.len(),
            elapsed
        ));
        debug_performance_log_structured(serde_json::json!({
            "operation": "full_rebuild",
            "reason": reason.as_str(),
            "working_lines": working.len(),
            "base_lines": base.len(),
            "ranges": ranges.len(),
            "duration_ms": elapsed.as_millis(),
        }));

        state.ranges = Arc::new(ranges);
        state.sync = Some(SyncPoint::of(buffer));
        state.pending = None;
    }

    /// Patches the range list after an edit of pre-edit lines `edit.line1..edit.line2`
    /// that changed the line count by `shift`.
    fn update_ranges<B: LineBuffer + ?Sized>(
        &self,
        state: &mut TrackerState,
        buffer: &B,
        edit: PendingEdit,
        shift: isize,
    ) {
        let started = Instant::now();
        let ranges = state.ranges.clone();
        let (l1, l2) = (edit.line1, edit.line2);

        // Ranges overlapping or touching the edited lines.
        let first_affected = ranges.partition_point(|r| r.line2() < l1);
        let after_start = ranges.partition_point(|r| r.line1() <= l2);
        let affected = &ranges[first_affected..after_start];

        // Under `contained` the local result must equal a full re-diff: the line count is
        // unchanged and no line of the region, before or after the edit, can pair with a
        // line outside it.
        let local = match self.config.incremental {
            IncrementalPolicy::Off => false,
            IncrementalPolicy::Contained => {
                edit.isolated
                    && shift == 0
                    && affected.len() == 1
                    && affected[0].line1() <= l1
                    && l2 <= affected[0].line2()
            }
            IncrementalPolicy::Bounded => true,
        };
        if !local {
            debug_log(&format!(
                "Edit of lines {}..{} is not local under the {} policy",
                l1,
                l2,
                self.config.incremental.as_str()
            ));
            self.rebuild(state, buffer, RebuildReason::Policy);
            return;
        }

        // The region is bounded by unchanged lines (or the buffer edges) on both sides.
        let region_line1 = affected.first().map_or(l1, |r| r.line1().min(l1));
        let region_line2 = affected.last().map_or(l2, |r| r.line2().max(l2));
        let region_vcs_line1 = match ranges[..first_affected].last() {
            Some(prev) => region_line1 - prev.line2() + prev.vcs_line2(),
            None => region_line1,
        };
        let region_vcs_line2 = match ranges[..after_start].last() {
            Some(last) => region_line2 - last.line2() + last.vcs_line2(),
            None => region_line2,
        };
        let new_region_line2 = (region_line2 as isize + shift) as usize;

        let working_text = buffer.chars_in_range(region_line1, new_region_line2);
        let working = split_lines(&working_text);
        let base = state.base.lines_in(region_vcs_line1, region_vcs_line2);
        if self.config.incremental == IncrementalPolicy::Contained
            && !region_is_isolated(&state.base_hashes, &base, &working)
        {
            debug_log("Edited range now shares lines with the base revision");
            self.rebuild(state, buffer, RebuildReason::Policy);
            return;
        }
        let changed = RangesBuilder::new(&self.differ, &self.config).build_region(
            &base,
            &working,
            region_line1,
            region_vcs_line1,
        );

        let changed = carry_over_ids(affected, changed);

        let mut patched = Vec::with_capacity(first_affected + changed.len() + ranges.len() - after_start);
        patched.extend_from_slice(&ranges[..first_affected]);
        let changed_count = changed.len();
        patched.extend(changed);
        patched.extend(ranges[after_start..].iter().map(|r| r.shifted(shift)));

        if self.config.validate_ranges {
            let working_text = buffer.chars_in_range(0, buffer.line_count());
            let working_all = split_lines(&working_text);
            let base_all: Vec<&str> = state.base.lines().collect();
            if let Err(violation) = check_ranges(&patched, &base_all, &working_all) {
                debug_log(&format!(
                    "Incremental update broke an invariant ({}); rebuilding",
                    violation
                ));
                self.rebuild(state, buffer, RebuildReason::Validation);
                return;
            }
        }

        let elapsed = started.elapsed();
        debug_performance_log(&format!(
            "local re-diff of {} working / {} base line(s) took {:?}",
            working.len(),
            base.len(),
            elapsed
        ));
        debug_performance_log_structured(serde_json::json!({
            "operation": "local_rediff",
            "region": [region_line1, new_region_line2],
            "vcs_region": [region_vcs_line1, region_vcs_line2],
            "replaced": affected.len(),
            "produced": changed_count,
            "shift": shift,
            "duration_ms": elapsed.as_millis(),
        }));

        state.ranges = Arc::new(patched);
        state.sync = Some(SyncPoint::of(buffer));
    }
}

fn line_hash(line: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    line.hash(&mut hasher);
    hasher.finish()
}

fn hash_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> HashSet<u64> {
    lines.into_iter().map(line_hash).collect()
}

/// Whether lines `line1..line2` fall inside a single range whose working lines occur nowhere
/// in the base revision and whose base lines occur nowhere in the working buffer.
fn edit_in_isolated_range<B: LineBuffer + ?Sized>(
    state: &TrackerState,
    buffer: &B,
    line1: usize,
    line2: usize,
) -> bool {
    let first = state.ranges.partition_point(|r| r.line2() < line1);
    let Some(range) = state.ranges.get(first) else {
        return false;
    };
    if range.line1() > line1 || line2 > range.line2() {
        return false;
    }
    if state
        .ranges
        .get(first + 1)
        .is_some_and(|next| next.line1() <= line2)
    {
        return false;
    }

    let working_text = buffer.text();
    let working = split_lines(&working_text);
    if working[range.line1()..range.line2()]
        .iter()
        .any(|line| state.base_hashes.contains(&line_hash(line)))
    {
        return false;
    }
    let base_hashes = hash_lines(state.base.lines_in(range.vcs_line1(), range.vcs_line2()));
    !working
        .iter()
        .any(|line| base_hashes.contains(&line_hash(line)))
}

/// Post-edit half of [`edit_in_isolated_range`]. Lines outside the region were checked
/// before the edit and have not changed.
fn region_is_isolated(base_hashes: &HashSet<u64>, base: &[&str], working: &[&str]) -> bool {
    if working
        .iter()
        .any(|line| base_hashes.contains(&line_hash(line)))
    {
        return false;
    }
    let region_hashes = hash_lines(base.iter().copied());
    !working
        .iter()
        .any(|line| region_hashes.contains(&line_hash(line)))
}

/// Gives each new range the id of the old range with the same base span and working line
/// count.
fn carry_over_ids(old: &[ChangeRange], new: Vec<ChangeRange>) -> Vec<ChangeRange> {
    let by_span: HashMap<(usize, usize), &ChangeRange> = old
        .iter()
        .map(|range| ((range.vcs_line1(), range.vcs_line2()), range))
        .collect();
    new.into_iter()
        .map(
            |range| match by_span.get(&(range.vcs_line1(), range.vcs_line2())) {
                Some(old) if old.line_count() == range.line_count() => range.with_id(old.id()),
                _ => range,
            },
        )
        .collect()
}

fn check_offset<B: LineBuffer + ?Sized>(buffer: &B, offset: usize) -> Result<(), TrackerError> {
    if offset > buffer.len() {
        return Err(TrackerError::OffsetOutOfBounds {
            offset,
            len: buffer.len(),
        });
    }
    if !buffer.is_char_boundary(offset) {
        return Err(TrackerError::NotCharBoundary(offset));
    }
    Ok(())
}

/// Lines up to and including `line_count` are accepted so deletions at the end of the
/// buffer can be addressed.
fn check_line<B: LineBuffer + ?Sized>(buffer: &B, line: usize) -> Result<(), TrackerError> {
    if line > buffer.line_count() {
        return Err(TrackerError::LineOutOfBounds {
            line,
            line_count: buffer.line_count(),
        });
    }
    Ok(())
}
