//! Mapping between [`MarketEvent`] and rows of the `events` table.
//!
//! The table has gone through two column generations:
//!
//! | concept      | current       | legacy            |
//! |--------------|---------------|-------------------|
//! | category     | `etype`       | `type`            |
//! | headline     | `headline`    | `title`           |
//! | long text    | `description` | `details`         |
//! | base impact  | `impulse_pct` | `base_impact_pct` |
//!
//! Writes go through a [`SchemaProfile`]; reads accept either generation.
//!
//! # Black swans
//!
//! The storage enum only has `MACRO` and `MICRO`. A black swan is written as
//! `MICRO` with severity `HIGH` and recognised on read when a `MICRO`/`HIGH`
//! row moved the market by more than 5%. This is a classification, not an
//! inverse: a black swan whose realized impact is within 5% reads back as
//! `MICRO`.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use store::Row;
use store::row::{first_f64, first_str, get_f64, get_i64, get_str, get_string_list};
use types::{EventCategory, EventUpdate, MarketEvent, RoundId, TickerId, Timestamp};

use crate::config::SchemaProfile;
use crate::events::Severity;
use crate::templates::TemplateCatalog;

/// Realized impact above which a `MICRO`/`HIGH` row reads back as a black swan.
pub const BLACK_SWAN_THRESHOLD: f64 = 0.05;

/// Icon for rows whose headline matches no template.
pub const DEFAULT_ICON: &str = "📰";

// =============================================================================
// Encoding
// =============================================================================

/// Category as written to the two-valued storage enum.
pub fn storage_category(category: EventCategory) -> EventCategory {
    match category {
        EventCategory::BlackSwan => EventCategory::Micro,
        other => other,
    }
}

/// Storage severity for an event.
pub fn severity_for(event: &MarketEvent) -> Severity {
    if event.is_black_swan() {
        Severity::High
    } else {
        Severity::from_impact(event.impact_pct)
    }
}

/// Description column: the event's details, or a generated summary.
pub fn description_for(event: &MarketEvent) -> String {
    match &event.details {
        Some(details) => details.clone(),
        None => format!(
            "{} - Market impact: {:.2}%",
            event.title,
            event.impact_pct * 100.0
        ),
    }
}

/// Full storage row carrying both column generations.
pub fn to_storage_row(event: &MarketEvent) -> Row {
    let category = storage_category(event.category).as_str();
    let description = description_for(event);

    let mut row = Row::new();
    row.insert("etype".into(), category.into());
    row.insert("type".into(), category.into());
    row.insert("severity".into(), severity_for(event).as_str().into());
    row.insert("headline".into(), event.title.clone().into());
    row.insert("title".into(), event.title.clone().into());
    row.insert("description".into(), description.clone().into());
    row.insert("details".into(), description.into());
    row.insert("impulse_pct".into(), event.base_impact_pct.into());
    row.insert("base_impact_pct".into(), event.base_impact_pct.into());
    row.insert("impact_pct".into(), event.impact_pct.into());
    row.insert("runtime_id".into(), event.runtime_id.clone().into());
    row.insert("ts".into(), event.ts.into());
    row.insert("icon".into(), event.icon.clone().into());
    row.insert(
        "tags".into(),
        Value::Array(event.tags.iter().cloned().map(Value::from).collect()),
    );
    row
}

/// Storage row restricted to the columns of `profile`, with the foreign keys
/// appended when known.
pub fn storage_row_for(
    event: &MarketEvent,
    profile: SchemaProfile,
    round_id: Option<RoundId>,
    target_ticker_id: Option<TickerId>,
) -> Row {
    let mut row = to_storage_row(event);
    if let Some(columns) = profile.event_columns() {
        row.retain(|column, _| columns.contains(&column.as_str()));
    }
    if let Some(round_id) = round_id {
        row.insert("round_id".into(), round_id.raw().into());
    }
    if let Some(ticker_id) = target_ticker_id {
        row.insert("target_ticker_id".into(), ticker_id.raw().into());
    }
    row
}

/// Column patch for a partial update.
///
/// Wire names map onto the profile's columns (both generations under
/// `compat`). Setting the category to `BLACKSWAN` stores `MICRO` and raises
/// severity to `HIGH`. `icon` and `tags` are dropped when the table has no
/// such columns.
pub fn update_patch(update: &EventUpdate, profile: SchemaProfile) -> Row {
    let mut patch = Row::new();

    let mut put = |current: &str, legacy: &str, value: Value| match profile {
        SchemaProfile::Current => {
            patch.insert(current.into(), value);
        }
        SchemaProfile::Legacy => {
            patch.insert(legacy.into(), value);
        }
        SchemaProfile::Compat => {
            patch.insert(current.into(), value.clone());
            if legacy != current {
                patch.insert(legacy.into(), value);
            }
        }
    };

    if let Some(title) = &update.title {
        put("headline", "title", title.clone().into());
    }
    if let Some(details) = &update.details {
        put("description", "details", details.clone().into());
    }
    if let Some(impact) = update.impact_pct {
        put("impact_pct", "impact_pct", impact.into());
    }
    if let Some(base) = update.base_impact_pct {
        put("impulse_pct", "base_impact_pct", base.into());
    }
    if let Some(category) = update.category {
        put("etype", "type", storage_category(category).as_str().into());
        if category == EventCategory::BlackSwan {
            put("severity", "severity", Severity::High.as_str().into());
        }
    }

    if profile.has_runtime_columns() {
        if let Some(icon) = &update.icon {
            patch.insert("icon".into(), icon.clone().into());
        }
        if let Some(tags) = &update.tags {
            patch.insert(
                "tags".into(),
                Value::Array(tags.iter().cloned().map(Value::from).collect()),
            );
        }
    }

    patch
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a stored row (either column generation) into an event.
///
/// Total: missing or malformed columns fall back to defaults rather than
/// failing.
pub fn from_storage_row(row: &Row, catalog: &TemplateCatalog) -> MarketEvent {
    let db_id = get_i64(row, "id");
    let impact_pct = get_f64(row, "impact_pct").unwrap_or(0.0);
    let category = decode_category(row, impact_pct);

    let title = first_str(row, &["headline", "title"])
        .unwrap_or_default()
        .to_string();
    let details = first_str(row, &["description", "details"]).map(str::to_string);
    let base_impact_pct = first_f64(row, &["impulse_pct", "base_impact_pct"]).unwrap_or(impact_pct);

    let template = catalog.find_by_title(&title);
    let id = match template {
        Some(t) => t.id.clone(),
        None => {
            let suffix = db_id.map_or_else(|| "unknown".to_string(), |id| id.to_string());
            format!("{}-{}", category.as_str().to_ascii_lowercase(), suffix)
        }
    };
    let icon = get_str(row, "icon")
        .map(str::to_string)
        .or_else(|| template.map(|t| t.icon.clone()))
        .unwrap_or_else(|| DEFAULT_ICON.to_string());
    let tags = get_string_list(row, "tags")
        .filter(|tags| !tags.is_empty())
        .or_else(|| template.map(|t| t.tags.clone()))
        .unwrap_or_default();

    let ts = decode_timestamp(row);
    let runtime_id = get_str(row, "runtime_id")
        .map(str::to_string)
        .unwrap_or_else(|| match db_id {
            Some(id) => format!("event-{id}-{ts}"),
            None => format!("event-unknown-{ts}"),
        });

    MarketEvent {
        id,
        category,
        title,
        base_impact_pct,
        icon,
        tags,
        impact_pct,
        ts,
        runtime_id,
        details,
        db_id,
    }
}

/// Category precedence: explicit `category`, then `etype`, then `type`.
///
/// Only values read from the storage enum columns are subject to the black
/// swan heuristic.
fn decode_category(row: &Row, impact_pct: f64) -> EventCategory {
    if let Some(explicit) = get_str(row, "category").and_then(|s| s.parse().ok()) {
        return explicit;
    }

    let stored = first_str(row, &["etype", "type"])
        .and_then(|s| s.parse::<EventCategory>().ok())
        .unwrap_or(EventCategory::Macro);

    let high = get_str(row, "severity")
        .and_then(|s| s.parse::<Severity>().ok())
        .is_some_and(|s| s == Severity::High);

    if stored == EventCategory::Micro && high && impact_pct.abs() > BLACK_SWAN_THRESHOLD {
        EventCategory::BlackSwan
    } else {
        stored
    }
}

/// Epoch millis from `ts`, else from `created_at`, else now.
fn decode_timestamp(row: &Row) -> Timestamp {
    if let Some(ts) = get_i64(row, "ts").filter(|ts| *ts > 0) {
        return ts;
    }
    get_str(row, "created_at")
        .and_then(parse_iso_millis)
        .unwrap_or_else(types::now_millis)
}

/// Parse an ISO-8601 timestamp. Values without an offset are UTC.
pub fn parse_iso_millis(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    // PostgREST may render timestamptz with a short "+00" offset.
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%#z") {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

// =============================================================================
// Tests
// =============================================================================
