//! Module: config
//! Responsibility: aggregation and external-sort tuning knobs.
//! Does not own: how sessions use the limits (see `sort` and `aggregate`).
//! Boundary: parsed once from TOML or built in code, then passed by value.

use crate::{DEFAULT_BUFFER_CAPACITY, capability::TextMode, error::InternalError};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Default number of rows one sorted run holds in memory before spilling.
pub const DEFAULT_WORK_MEM_ROWS: usize = 65_536;

/// Default upper bound on the encoded size of one spilled value.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Default number of runs merged at once; also caps open run files.
pub const DEFAULT_MAX_MERGE_FAN_IN: usize = 64;

///
/// ConfigError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::config_invalid(err.to_string())
    }
}

///
/// TiePolicy
///
/// Even-count result for kinds without an averaging rule.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    #[default]
    LowerMiddle,
    UpperMiddle,
}

///
/// SortConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SortConfig {
    pub work_mem_rows: usize,
    pub spill_dir: Option<PathBuf>,
    pub max_frame_bytes: usize,
    pub max_merge_fan_in: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            work_mem_rows: DEFAULT_WORK_MEM_ROWS,
            spill_dir: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            max_merge_fan_in: DEFAULT_MAX_MERGE_FAN_IN,
        }
    }
}

impl SortConfig {
    #[must_use]
    pub const fn with_work_mem_rows(mut self, rows: usize) -> Self {
        self.work_mem_rows = rows;
        self
    }

    #[must_use]
    pub fn with_spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn with_max_frame_bytes(mut self, bytes: usize) -> Self {
        self.max_frame_bytes = bytes;
        self
    }

    #[must_use]
    pub const fn with_max_merge_fan_in(mut self, runs: usize) -> Self {
        self.max_merge_fan_in = runs;
        self
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.work_mem_rows == 0 {
            return Err(ConfigError::Invalid {
                field: "sort.work_mem_rows",
                reason: "must be at least 1",
            });
        }
        if self.max_frame_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "sort.max_frame_bytes",
                reason: "must be at least 1",
            });
        }
        if self.max_merge_fan_in < 2 {
            return Err(ConfigError::Invalid {
                field: "sort.max_merge_fan_in",
                reason: "must be at least 2",
            });
        }

        Ok(())
    }
}

///
/// MedianConfig
///
/// `buffer_capacity` bounds the quickselect buffer; the insert that would
/// exceed it spills the aggregation into an external sort session.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MedianConfig {
    pub buffer_capacity: usize,
    pub text_mode: TextMode,
    pub tie_policy: TiePolicy,
    pub sort: SortConfig,
}

impl Default for MedianConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            text_mode: TextMode::default(),
            tie_policy: TiePolicy::default(),
            sort: SortConfig::default(),
        }
    }
}

impl MedianConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    #[must_use]
    pub const fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    #[must_use]
    pub const fn with_text_mode(mut self, mode: TextMode) -> Self {
        self.text_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_tie_policy(mut self, policy: TiePolicy) -> Self {
        self.tie_policy = policy;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortConfig) -> Self {
        self.sort = sort;
        self
    }

    /// A zero buffer capacity is allowed: every aggregation spills on its
    /// first input.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        self.sort.validate()
    }
}
