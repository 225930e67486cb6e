//! Range computation, incremental maintenance and rollback.

pub mod builder;
pub mod inner;
pub mod line_status_tracker;
pub mod range;
pub mod rollback;
pub mod tracked_buffer;
pub mod validate;

pub use line_status_tracker::LineStatusTracker;
pub use range::{ChangeRange, InnerRange, InnerRangeKind, RangeId, RangeKind, RangeStats};
pub use tracked_buffer::TrackedBuffer;
pub use validate::{InvariantViolation, check_ranges};
