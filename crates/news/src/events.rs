//! Event-side types that never cross the HTTP boundary directly.
//!
//! This module defines:
//! - [`Severity`]: the storage severity enum (`LOW`, `NORMAL`, `HIGH`)
//! - [`GenerationOutcome`]: a generated event plus what happened when it was persisted
//! - [`PersistenceOutcome`]: persisted (with row and round ids) or not (with a reason)
//!
//! # Persistence is best-effort
//!
//! Generation never fails for the caller. If the store rejects the write the
//! event is still returned, and the outcome says why it was not saved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use types::{MarketEvent, RoundId};

// =============================================================================
// Severity
// =============================================================================

/// Storage severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Normal,
    High,
}

impl Severity {
    /// Severity of an ordinary event by the magnitude of its realized impact.
    pub fn from_impact(impact_pct: f64) -> Self {
        let magnitude = impact_pct.abs();
        if magnitude >= 0.02 {
            Severity::High
        } else if magnitude >= 0.01 {
            Severity::Normal
        } else {
            Severity::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Normal => "NORMAL",
            Severity::High => "HIGH",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Severity::Low),
            "NORMAL" => Ok(Severity::Normal),
            "HIGH" => Ok(Severity::High),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// What happened when a generated event was written to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceOutcome {
    Persisted {
        /// Row id assigned by the store (absent if the store did not echo the row).
        row_id: Option<i64>,
        round_id: RoundId,
    },
    NotPersisted {
        reason: String,
    },
}

impl PersistenceOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistenceOutcome::Persisted { .. })
    }
}

/// Result of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub event: MarketEvent,
    pub persistence: PersistenceOutcome,
}

impl GenerationOutcome {
    /// Human-readable status line for API responses.
    pub fn message(&self) -> String {
        match &self.persistence {
            PersistenceOutcome::Persisted { row_id: Some(id), .. } => {
                format!("Event generated and stored (id: {id})")
            }
            PersistenceOutcome::Persisted { row_id: None, .. } => {
                "Event generated and stored".to_string()
            }
            PersistenceOutcome::NotPersisted { reason } => {
                format!("Event generated but not stored: {reason}")
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(Severity::from_impact(0.0099), Severity::Low);
        assert_eq!(Severity::from_impact(0.01), Severity::Normal);
        assert_eq!(Severity::from_impact(-0.015), Severity::Normal);
        assert_eq!(Severity::from_impact(0.02), Severity::High);
        assert_eq!(Severity::from_impact(-0.12), Severity::High);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("high".parse::<Severity>(), Ok(Severity::High));
        assert_eq!(Severity::Normal.to_string(), "NORMAL");
        assert!("EXTREME".parse::<Severity>().is_err());
    }

    #[test]
    fn test_outcome_message() {
        let event = MarketEvent {
            id: "macro-1".into(),
            category: types::EventCategory::Macro,
            title: "Fed hikes rates by 25 bps".into(),
            base_impact_pct: -0.012,
            icon: "🏦".into(),
            tags: vec![],
            impact_pct: -0.0121,
            ts: 0,
            runtime_id: "macro-1-0-0".into(),
            details: None,
            db_id: None,
        };
        let stored = GenerationOutcome {
            event: event.clone(),
            persistence: PersistenceOutcome::Persisted {
                row_id: Some(12),
                round_id: RoundId(1),
            },
        };
        assert!(stored.persistence.is_persisted());
        assert!(stored.message().contains("id: 12"));

        let dropped = GenerationOutcome {
            event,
            persistence: PersistenceOutcome::NotPersisted {
                reason: "store returned 503".into(),
            },
        };
        assert!(!dropped.persistence.is_persisted());
        assert!(dropped.message().contains("not stored"));
    }
}
