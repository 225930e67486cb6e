use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::utils::debug_log;

/// Prefix of the environment variables read by [`TrackerConfig::from_env`]
pub const ENV_PREFIX: &str = "LINE_STATUS_";

/// Default cap on the size of a modified range for which inner ranges are computed
pub const DEFAULT_MAX_INNER_RANGE_LINES: usize = 1000;

/// When an edit may be handled by re-diffing only part of the buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncrementalPolicy {
    /// Every edit triggers a full rebuild
    Off,
    /// Re-diff locally only when the edited lines lie inside one existing range
    Contained,
    /// Re-diff locally for every edit, widened to the nearest unchanged lines
    Bounded,
}

impl IncrementalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncrementalPolicy::Off => "off",
            IncrementalPolicy::Contained => "contained",
            IncrementalPolicy::Bounded => "bounded",
        }
    }
}

impl FromStr for IncrementalPolicy {
    type Err = TrackerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "off" => Ok(IncrementalPolicy::Off),
            "contained" => Ok(IncrementalPolicy::Contained),
            "bounded" => Ok(IncrementalPolicy::Bounded),
            _ => Err(TrackerError::Generic(format!(
                "Unknown incremental policy: {}",
                input
            ))),
        }
    }
}

impl Default for IncrementalPolicy {
    fn default() -> Self {
        IncrementalPolicy::Contained
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub incremental: IncrementalPolicy,
    /// Compute line-granular inner ranges for modified ranges
    pub inner_ranges: bool,
    /// Compute word fragments for single-line modified ranges
    pub word_fragments: bool,
    pub max_inner_range_lines: usize,
    /// Check range invariants after every incremental update and rebuild on failure
    pub validate_ranges: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            incremental: IncrementalPolicy::default(),
            inner_ranges: true,
            word_fragments: true,
            max_inner_range_lines: DEFAULT_MAX_INNER_RANGE_LINES,
            validate_ranges: cfg!(debug_assertions),
        }
    }
}

static CONFIG: OnceLock<TrackerConfig> = OnceLock::new();

impl TrackerConfig {
    /// Access the process-wide configuration. Lazily initialized from the environment.
    pub fn get() -> &'static TrackerConfig {
        CONFIG.get_or_init(build_config)
    }

    /// Reads `LINE_STATUS_*` variables on top of the defaults.
    pub fn from_env() -> Result<TrackerConfig, TrackerError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<TrackerConfig>()?)
    }

    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn load_file(path: &Path) -> Result<TrackerConfig, TrackerError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<TrackerConfig, TrackerError> {
        Ok(serde_json::from_str(contents)?)
    }
}

fn build_config() -> TrackerConfig {
    match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            debug_log(&format!(
                "Ignoring invalid {}* environment: {}",
                ENV_PREFIX, e
            ));
            TrackerConfig::default()
        }
    }
}
