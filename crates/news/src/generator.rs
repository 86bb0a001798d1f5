//! Market event generator.
//!
//! This module provides [`EventGenerator`], which turns a requested category
//! into a concrete [`MarketEvent`]: pick a pool, avoid recently used
//! templates, jitter the base impact and stamp a unique runtime id.
//!
//! The generator does no I/O. The caller supplies the recency window (see
//! [`EventGenerator::recency_window`]), which keeps sampling testable and
//! lets the service decide how to fail open.
//!
//! # Usage
//!
//! ```ignore
//! let generator = EventGenerator::with_seed(TemplateCatalog::builtin(), GeneratorConfig::default(), 42);
//! let recent = generator.recency_window(&recent_rows);
//! let event = generator.generate(Some(EventCategory::Macro), false, &recent)?;
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use store::Row;
use store::row::first_str;
use types::{EventCategory, MarketEvent};

use crate::config::GeneratorConfig;
use crate::templates::{EventTemplate, TemplateCatalog};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerateError {
    #[error("no templates registered for category {0}")]
    EmptyPool(EventCategory),
}

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// =============================================================================
// EventGenerator
// =============================================================================

/// Generates market events from a template catalog.
///
/// Deterministic given the same seed and the same sequence of recency
/// windows. Safe to share: the RNG lock is only held for the synchronous
/// pick/jitter step and the sequence counters are atomics.
pub struct EventGenerator {
    catalog: Arc<TemplateCatalog>,
    config: GeneratorConfig,
    rng: Mutex<StdRng>,

    /// Sequence for macro/micro runtime ids.
    news_seq: AtomicU64,

    /// Sequence for black swan runtime ids.
    black_swan_seq: AtomicU64,
}

impl EventGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(catalog: impl Into<Arc<TemplateCatalog>>, config: GeneratorConfig) -> Self {
        Self::with_rng(catalog.into(), config, StdRng::from_os_rng())
    }

    /// Create a generator with a fixed seed.
    pub fn with_seed(
        catalog: impl Into<Arc<TemplateCatalog>>,
        config: GeneratorConfig,
        seed: u64,
    ) -> Self {
        Self::with_rng(catalog.into(), config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Arc<TemplateCatalog>, config: GeneratorConfig, rng: StdRng) -> Self {
        Self {
            catalog,
            config,
            rng: Mutex::new(rng),
            news_seq: AtomicU64::new(0),
            black_swan_seq: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &Arc<TemplateCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Template ids of the most recent stored events.
    ///
    /// `rows` are stored event rows (newest first); each headline is matched
    /// against the catalog. Rows beyond the configured lookback are ignored.
    pub fn recency_window(&self, rows: &[Row]) -> HashSet<String> {
        rows.iter()
            .take(self.config.lookback)
            .filter_map(|row| first_str(row, &["headline", "title"]))
            .filter_map(|title| self.catalog.find_by_title(title))
            .map(|template| template.id.clone())
            .collect()
    }

    /// Generate one event.
    ///
    /// A black swan is produced when `force_black_swan` is set or `category`
    /// is [`EventCategory::BlackSwan`]; an absent category picks macro or
    /// micro with equal probability.
    pub fn generate(
        &self,
        category: Option<EventCategory>,
        force_black_swan: bool,
        recent: &HashSet<String>,
    ) -> Result<MarketEvent, GenerateError> {
        let (template, impact_pct) = {
            let mut rng = self.rng.lock();
            let category = resolve_category(&self.catalog, &mut rng, category, force_black_swan);
            let template = self.pick_template(&mut rng, category, recent)?;
            let jitter = self.config.jitter_for(category == EventCategory::BlackSwan);
            let offset = if jitter > 0.0 {
                rng.random_range(-jitter..=jitter)
            } else {
                0.0
            };
            (template, round4(template.base_impact_pct + offset))
        };

        Ok(self.realize(template, impact_pct))
    }

    /// Choose a template from the category pool, avoiding `recent` ids.
    ///
    /// Pools of one template skip the filter; if every template is recent the
    /// whole pool is used.
    fn pick_template(
        &self,
        rng: &mut StdRng,
        category: EventCategory,
        recent: &HashSet<String>,
    ) -> Result<&EventTemplate, GenerateError> {
        let pool = self.catalog.pool(category);
        if pool.is_empty() {
            return Err(GenerateError::EmptyPool(category));
        }

        let candidates: Vec<&EventTemplate> = if self.config.avoid_recent && pool.len() > 1 {
            let fresh: Vec<&EventTemplate> =
                pool.iter().filter(|t| !recent.contains(&t.id)).collect();
            if fresh.is_empty() {
                pool.iter().collect()
            } else {
                fresh
            }
        } else {
            pool.iter().collect()
        };

        Ok(candidates[rng.random_range(0..candidates.len())])
    }

    fn realize(&self, template: &EventTemplate, impact_pct: f64) -> MarketEvent {
        let ts = types::now_millis();
        let seq = if template.category == EventCategory::BlackSwan {
            self.black_swan_seq.fetch_add(1, Ordering::Relaxed)
        } else {
            self.news_seq.fetch_add(1, Ordering::Relaxed)
        };

        MarketEvent {
            id: template.id.clone(),
            category: template.category,
            title: template.title.clone(),
            base_impact_pct: template.base_impact_pct,
            icon: template.icon.clone(),
            tags: template.tags.clone(),
            impact_pct,
            ts,
            runtime_id: format!("{}-{}-{}", template.id, ts, seq),
            details: template.details.clone(),
            db_id: None,
        }
    }
}

/// Category for a request. Without one, macro or micro with equal odds
/// (or whichever of the two has templates, if only one does).
fn resolve_category(
    catalog: &TemplateCatalog,
    rng: &mut StdRng,
    requested: Option<EventCategory>,
    force_black_swan: bool,
) -> EventCategory {
    if force_black_swan {
        return EventCategory::BlackSwan;
    }
    if let Some(category) = requested {
        return category;
    }
    let has_macro = !catalog.pool(EventCategory::Macro).is_empty();
    let has_micro = !catalog.pool(EventCategory::Micro).is_empty();
    match (has_macro, has_micro) {
        (true, false) => EventCategory::Macro,
        (false, true) => EventCategory::Micro,
        _ if rng.random_bool(0.5) => EventCategory::Macro,
        _ => EventCategory::Micro,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generator(seed: u64) -> EventGenerator {
        EventGenerator::with_seed(TemplateCatalog::builtin(), GeneratorConfig::default(), seed)
    }

    fn pool_ids(generator: &EventGenerator, category: EventCategory) -> Vec<String> {
        generator
            .catalog()
            .pool(category)
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    #[test]
    fn test_requested_category_is_honoured() {
        let generator = generator(7);
        let none = HashSet::new();
        for category in EventCategory::all() {
            for _ in 0..20 {
                let event = generator.generate(Some(*category), false, &none).unwrap();
                assert_eq!(event.category, *category);
            }
        }
    }

    #[test]
    fn test_absent_category_is_news() {
        let generator = generator(11);
        let none = HashSet::new();
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let event = generator.generate(None, false, &none).unwrap();
            assert!(event.category.is_news());
            seen.insert(event.category);
        }
        // 50 fair coin flips landing all on one side is vanishingly unlikely.
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_force_black_swan_overrides_category() {
        let generator = generator(3);
        let event = generator
            .generate(Some(EventCategory::Macro), true, &HashSet::new())
            .unwrap();
        assert!(event.is_black_swan());
        assert!(event.details.is_some());
    }

    #[test]
    fn test_impact_within_jitter_band() {
        let generator = generator(42);
        let none = HashSet::new();
        for _ in 0..200 {
            let event = generator.generate(None, false, &none).unwrap();
            assert!((event.impact_pct - event.base_impact_pct).abs() <= 0.004 + 5e-5);

            let swan = generator.generate(None, true, &none).unwrap();
            assert!((swan.impact_pct - swan.base_impact_pct).abs() <= 0.02 + 5e-5);
        }
    }

    #[test]
    fn test_impact_rounded_to_four_decimals() {
        let generator = generator(5);
        let event = generator.generate(None, false, &HashSet::new()).unwrap();
        assert_eq!(round4(event.impact_pct), event.impact_pct);
    }

    #[test]
    fn test_runtime_ids_unique() {
        let generator = generator(9);
        let none = HashSet::new();
        let mut ids = HashSet::new();
        for i in 0..300 {
            let event = generator.generate(None, i % 5 == 0, &none).unwrap();
            assert!(ids.insert(event.runtime_id.clone()));
            assert!(event.runtime_id.starts_with(&format!("{}-", event.id)));
        }
    }

    #[test]
    fn test_sequences_are_independent() {
        let generator = generator(1);
        let none = HashSet::new();
        let first_news = generator.generate(Some(EventCategory::Macro), false, &none).unwrap();
        let first_swan = generator.generate(None, true, &none).unwrap();
        let second_news = generator.generate(Some(EventCategory::Micro), false, &none).unwrap();
        assert!(first_news.runtime_id.ends_with("-0"));
        assert!(first_swan.runtime_id.ends_with("-0"));
        assert!(second_news.runtime_id.ends_with("-1"));
    }

    #[test]
    fn test_window_of_all_but_one_forces_remaining() {
        let generator = generator(21);
        let ids = pool_ids(&generator, EventCategory::Macro);
        let (last, rest) = ids.split_last().unwrap();
        let recent: HashSet<String> = rest.iter().cloned().collect();
        for _ in 0..20 {
            let event = generator
                .generate(Some(EventCategory::Macro), false, &recent)
                .unwrap();
            assert_eq!(&event.id, last);
        }
    }

    #[test]
    fn test_window_of_whole_pool_falls_back() {
        let generator = generator(33);
        let ids = pool_ids(&generator, EventCategory::BlackSwan);
        let recent: HashSet<String> = ids.iter().cloned().collect();
        let event = generator
            .generate(Some(EventCategory::BlackSwan), false, &recent)
            .unwrap();
        assert!(ids.contains(&event.id));
    }

    #[test]
    fn test_single_template_pool_ignores_window() {
        let catalog = TemplateCatalog::new().with(EventTemplate::new(
            "only",
            EventCategory::Micro,
            "Only one",
            0.01,
            "📰",
        ));
        let generator = EventGenerator::with_seed(catalog, GeneratorConfig::default(), 0);
        let recent: HashSet<String> = ["only".to_string()].into();
        let event = generator
            .generate(Some(EventCategory::Micro), false, &recent)
            .unwrap();
        assert_eq!(event.id, "only");
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let generator = EventGenerator::with_seed(TemplateCatalog::new(), GeneratorConfig::default(), 0);
        let err = generator
            .generate(Some(EventCategory::Macro), false, &HashSet::new())
            .unwrap_err();
        assert_eq!(err, GenerateError::EmptyPool(EventCategory::Macro));
    }

    #[test]
    fn test_same_seed_same_choices() {
        let a = generator(99);
        let b = generator(99);
        let none = HashSet::new();
        for _ in 0..20 {
            let x = a.generate(None, false, &none).unwrap();
            let y = b.generate(None, false, &none).unwrap();
            assert_eq!(x.id, y.id);
            assert_eq!(x.impact_pct, y.impact_pct);
        }
    }

    #[test]
    fn test_recency_window_matches_headlines() {
        let generator = EventGenerator::with_seed(
            TemplateCatalog::builtin(),
            GeneratorConfig::default().with_lookback(2),
            0,
        );
        let rows: Vec<Row> = [
            json!({"id": 3, "headline": "CPI cools below expectations"}),
            json!({"id": 2, "title": "BioHealth drug fails Phase 3"}),
            json!({"id": 1, "headline": "Fed hikes rates by 25 bps"}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        let window = generator.recency_window(&rows);
        assert_eq!(window.len(), 2);
        assert!(window.contains("macro-2"));
        assert!(window.contains("micro-2"));
        assert!(!window.contains("macro-1"));
    }

    #[test]
    fn test_recency_window_ignores_unknown_headlines() {
        let generator = generator(0);
        let rows: Vec<Row> = vec![json!({"headline": "Custom admin note"})
            .as_object()
            .cloned()
            .unwrap()];
        assert!(generator.recency_window(&rows).is_empty());
    }
}
