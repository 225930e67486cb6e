use std::fmt;

#[derive(Debug)]
pub enum TrackerError {
    /// A line number outside the working buffer was supplied by the caller
    LineOutOfBounds {
        line: usize,
        line_count: usize,
    },
    /// A byte offset past the end of the working buffer was supplied by the caller
    OffsetOutOfBounds {
        offset: usize,
        len: usize,
    },
    /// An edit whose start lies after its end
    InvalidEditRange {
        start: usize,
        end: usize,
    },
    NotCharBoundary(usize),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    /// Errors from reading `LINE_STATUS_*` environment variables
    ConfigError(envy::Error),
    Generic(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::LineOutOfBounds { line, line_count } => write!(
                f,
                "Line {} is outside the buffer ({} lines)",
                line, line_count
            ),
            TrackerError::OffsetOutOfBounds { offset, len } => write!(
                f,
                "Offset {} is outside the buffer ({} bytes)",
                offset, len
            ),
            TrackerError::InvalidEditRange { start, end } => {
                write!(f, "Edit range {}..{} is reversed", start, end)
            }
            TrackerError::NotCharBoundary(offset) => {
                write!(f, "Offset {} is not on a character boundary", offset)
            }
            TrackerError::IoError(e) => write!(f, "IO error: {}", e),
            TrackerError::JsonError(e) => write!(f, "JSON error: {}", e),
            TrackerError::ConfigError(e) => write!(f, "Config error: {}", e),
            TrackerError::Generic(e) => write!(f, "Generic error: {}", e),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::IoError(err)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::JsonError(err)
    }
}

impl From<envy::Error> for TrackerError {
    fn from(err: envy::Error) -> Self {
        TrackerError::ConfigError(err)
    }
}

impl Clone for TrackerError {
    fn clone(&self) -> Self {
        match self {
            TrackerError::LineOutOfBounds { line, line_count } => TrackerError::LineOutOfBounds {
                line: *line,
                line_count: *line_count,
            },
            TrackerError::OffsetOutOfBounds { offset, len } => TrackerError::OffsetOutOfBounds {
                offset: *offset,
                len: *len,
            },
            TrackerError::InvalidEditRange { start, end } => TrackerError::InvalidEditRange {
                start: *start,
                end: *end,
            },
            TrackerError::NotCharBoundary(offset) => TrackerError::NotCharBoundary(*offset),
            TrackerError::IoError(e) => {
                TrackerError::IoError(std::io::Error::new(e.kind(), e.to_string()))
            }
            TrackerError::JsonError(e) => TrackerError::Generic(format!("JSON error: {}", e)),
            TrackerError::ConfigError(e) => TrackerError::Generic(format!("Config error: {}", e)),
            TrackerError::Generic(s) => TrackerError::Generic(s.clone()),
        }
    }
}
