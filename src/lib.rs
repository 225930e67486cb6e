//! Live line-level diff tracking between a working buffer and a base revision.
//!
//! A [`LineStatusTracker`] keeps an ordered list of [`ChangeRange`]s describing where the
//! working buffer diverges from the base text, patches that list as edits are reported,
//! and can roll ranges back to their base content.

pub mod buffer;
pub mod config;
pub mod diff;
pub mod error;
pub mod tracker;
pub mod utils;

pub use buffer::{LineBuffer, MutableLineBuffer, TextBuffer};
pub use config::{IncrementalPolicy, TrackerConfig};
pub use diff::word_diff::WordFragment;
pub use diff::{ImaraLineDiffer, LineBlock, LineBlockKind, LineDiffer};
pub use error::TrackerError;
pub use tracker::{
    ChangeRange, InnerRange, InnerRangeKind, InvariantViolation, LineStatusTracker, RangeId,
    RangeKind, RangeStats, TrackedBuffer,
};
