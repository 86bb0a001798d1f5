//! Market event wire types.
//!
//! - [`EventCategory`]: macro news, company news, or a rare black swan
//! - [`MarketEvent`]: a generated (or stored) event as the frontend sees it
//! - [`EventCreate`] / [`EventUpdate`]: request bodies for the events API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Timestamp;

// =============================================================================
// EventCategory
// =============================================================================

/// Category of a market event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventCategory {
    /// Economy-wide news (rates, inflation, employment).
    Macro,
    /// Company-specific news (earnings, approvals, recalls).
    Micro,
    /// Rare, high-impact dislocation.
    #[serde(rename = "BLACKSWAN")]
    BlackSwan,
}

impl EventCategory {
    /// All categories in display order.
    pub fn all() -> &'static [EventCategory] {
        &[
            EventCategory::Macro,
            EventCategory::Micro,
            EventCategory::BlackSwan,
        ]
    }

    /// Wire/storage spelling (`MACRO`, `MICRO`, `BLACKSWAN`).
    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Macro => "MACRO",
            EventCategory::Micro => "MICRO",
            EventCategory::BlackSwan => "BLACKSWAN",
        }
    }

    /// Whether this is an ordinary news category (macro or micro).
    pub fn is_news(self) -> bool {
        !matches!(self, EventCategory::BlackSwan)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MACRO" => Ok(EventCategory::Macro),
            "MICRO" => Ok(EventCategory::Micro),
            "BLACKSWAN" | "BLACK_SWAN" | "BLACK SWAN" => Ok(EventCategory::BlackSwan),
            other => Err(format!("unknown event category '{other}'")),
        }
    }
}

// =============================================================================
// MarketEvent
// =============================================================================

/// A market event as returned by the API.
///
/// Generated events carry the template's identity plus a realized impact
/// (base impact with jitter) and a unique `runtimeId`. Events read back
/// from the store additionally carry `dbId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketEvent {
    /// Template identifier (e.g. `macro-1`).
    pub id: String,
    /// Event category.
    #[serde(rename = "type")]
    pub category: EventCategory,
    /// Headline text.
    pub title: String,
    /// Scripted central impact estimate (fraction, e.g. -0.012).
    pub base_impact_pct: f64,
    /// Display icon.
    pub icon: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Realized impact: base plus jitter, rounded to 4 decimals.
    pub impact_pct: f64,
    /// Creation time in epoch milliseconds.
    pub ts: Timestamp,
    /// Unique identifier of this occurrence.
    pub runtime_id: String,
    /// Long-form detail text (black swans).
    #[serde(default)]
    pub details: Option<String>,
    /// Store row id, when the event was read back from the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_id: Option<i64>,
}

impl MarketEvent {
    /// Whether this is a black swan event.
    pub fn is_black_swan(&self) -> bool {
        self.category == EventCategory::BlackSwan
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Body of `POST /api/events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreate {
    /// Requested category; absent means macro or micro at random.
    #[serde(default, rename = "type")]
    pub category: Option<EventCategory>,
    /// Force a black swan regardless of `type`.
    #[serde(default)]
    pub force_black_swan: bool,
}

/// Body of `PUT /api/events/{id}`: every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub impact_pct: Option<f64>,
    #[serde(default)]
    pub base_impact_pct: Option<f64>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub category: Option<EventCategory>,
}

impl EventUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.details.is_none()
            && self.impact_pct.is_none()
            && self.base_impact_pct.is_none()
            && self.icon.is_none()
            && self.tags.is_none()
            && self.category.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&EventCategory::BlackSwan).unwrap(),
            "\"BLACKSWAN\""
        );
        let parsed: EventCategory = serde_json::from_str("\"MICRO\"").unwrap();
        assert_eq!(parsed, EventCategory::Micro);
    }

    #[test]
    fn test_category_from_str_is_lenient() {
        assert_eq!("macro".parse::<EventCategory>(), Ok(EventCategory::Macro));
        assert_eq!(
            "black_swan".parse::<EventCategory>(),
            Ok(EventCategory::BlackSwan)
        );
        assert!("sideways".parse::<EventCategory>().is_err());
    }

    #[test]
    fn test_market_event_json_shape() {
        let event = MarketEvent {
            id: "macro-1".into(),
            category: EventCategory::Macro,
            title: "Fed hikes rates by 25 bps".into(),
            base_impact_pct: -0.012,
            icon: "🏦".into(),
            tags: vec!["rates".into(), "fed".into()],
            impact_pct: -0.0105,
            ts: 1_704_067_200_000,
            runtime_id: "macro-1-1704067200000-0".into(),
            details: None,
            db_id: None,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "MACRO");
        assert_eq!(json["baseImpactPct"], -0.012);
        assert_eq!(json["impactPct"], -0.0105);
        assert_eq!(json["runtimeId"], "macro-1-1704067200000-0");
        assert!(json.get("dbId").is_none());
    }

    #[test]
    fn test_event_create_defaults() {
        let req: EventCreate = serde_json::from_str("{}").unwrap();
        assert_eq!(req, EventCreate::default());

        let req: EventCreate =
            serde_json::from_str(r#"{"type": "MICRO", "forceBlackSwan": true}"#).unwrap();
        assert_eq!(req.category, Some(EventCategory::Micro));
        assert!(req.force_black_swan);
    }

    #[test]
    fn test_event_update_is_empty() {
        assert!(EventUpdate::default().is_empty());
        let update: EventUpdate = serde_json::from_str(r#"{"impactPct": 0.01}"#).unwrap();
        assert!(!update.is_empty());
    }
}
