pub mod line_status_handlers;
pub mod ranges;
pub mod rollback;
