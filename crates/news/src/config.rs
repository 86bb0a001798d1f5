//! Configuration types for event generation and storage.
//!
//! This module provides declarative configuration for the generator
//! ([`GeneratorConfig`]) and the column layout used when writing events
//! ([`SchemaProfile`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// GeneratorConfig
// =============================================================================

/// Tuning for [`crate::EventGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of most recent stored events whose templates are avoided.
    pub lookback: usize,

    /// Half-width of the uniform jitter applied to macro/micro impacts.
    pub news_jitter: f64,

    /// Half-width of the uniform jitter applied to black swan impacts.
    pub black_swan_jitter: f64,

    /// Whether to avoid recently used templates at all.
    pub avoid_recent: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            news_jitter: 0.004,
            black_swan_jitter: 0.02,
            avoid_recent: true,
        }
    }
}

impl GeneratorConfig {
    /// Set the recency lookback.
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    /// Create a config that samples without looking at history.
    pub fn without_recency() -> Self {
        Self {
            avoid_recent: false,
            ..Default::default()
        }
    }

    /// Jitter half-width for a category.
    pub fn jitter_for(&self, black_swan: bool) -> f64 {
        if black_swan {
            self.black_swan_jitter
        } else {
            self.news_jitter
        }
    }
}

// =============================================================================
// SchemaProfile
// =============================================================================

/// Which generation of `events` columns the store has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaProfile {
    /// `etype`, `headline`, `description`, `impulse_pct`, ...
    #[default]
    Current,
    /// `type`, `title`, `details`, `base_impact_pct`, `runtime_id`, ...
    Legacy,
    /// Both generations at once.
    Compat,
}

impl SchemaProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaProfile::Current => "current",
            SchemaProfile::Legacy => "legacy",
            SchemaProfile::Compat => "compat",
        }
    }

    /// Column holding the storage category.
    pub fn category_column(self) -> &'static str {
        match self {
            SchemaProfile::Legacy => "type",
            SchemaProfile::Current | SchemaProfile::Compat => "etype",
        }
    }

    /// Column holding the headline.
    pub fn title_column(self) -> &'static str {
        match self {
            SchemaProfile::Legacy => "title",
            SchemaProfile::Current | SchemaProfile::Compat => "headline",
        }
    }

    /// Column holding the long-form text.
    pub fn details_column(self) -> &'static str {
        match self {
            SchemaProfile::Legacy => "details",
            SchemaProfile::Current | SchemaProfile::Compat => "description",
        }
    }

    /// Column holding the base impact.
    pub fn base_impact_column(self) -> &'static str {
        match self {
            SchemaProfile::Legacy => "base_impact_pct",
            SchemaProfile::Current | SchemaProfile::Compat => "impulse_pct",
        }
    }

    /// Whether the table has `runtime_id`, `ts`, `icon` and `tags` columns.
    pub fn has_runtime_columns(self) -> bool {
        !matches!(self, SchemaProfile::Current)
    }

    /// Event columns written under this profile (`None` = every column).
    pub fn event_columns(self) -> Option<&'static [&'static str]> {
        match self {
            SchemaProfile::Current => Some(&CURRENT_COLUMNS),
            SchemaProfile::Legacy => Some(&LEGACY_COLUMNS),
            SchemaProfile::Compat => None,
        }
    }
}

const CURRENT_COLUMNS: [&str; 6] = [
    "etype",
    "severity",
    "headline",
    "description",
    "impulse_pct",
    "impact_pct",
];

const LEGACY_COLUMNS: [&str; 10] = [
    "type",
    "severity",
    "title",
    "details",
    "base_impact_pct",
    "impact_pct",
    "runtime_id",
    "ts",
    "icon",
    "tags",
];

impl fmt::Display for SchemaProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(SchemaProfile::Current),
            "legacy" => Ok(SchemaProfile::Legacy),
            "compat" => Ok(SchemaProfile::Compat),
            other => Err(format!(
                "unknown events schema '{other}' (expected current, legacy or compat)"
            )),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
