//! Event generation, persistence and CRUD over the `events` table.
//!
//! [`EventService`] owns the generator and a handle to the store. Every
//! operation is a short, sequential series of store calls; nothing here
//! holds a lock across an `.await`.
//!
//! # Failure policy
//!
//! - Generation never fails because of the store. A failed history read
//!   means "nothing is recent", a failed round lookup means round 1, and a
//!   failed insert is reported in [`PersistenceOutcome::NotPersisted`].
//! - Reads, updates and deletes propagate store errors to the caller.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use store::row::get_i64;
use store::{Filter, Query, Row, StoreError, TableStore, tables};
use types::{EventCategory, EventCreate, EventUpdate, MarketEvent, RoundId};

use crate::config::SchemaProfile;
use crate::events::{GenerationOutcome, PersistenceOutcome, Severity};
use crate::generator::{EventGenerator, GenerateError};
use crate::schema::{from_storage_row, storage_category, storage_row_for, update_patch};
use crate::templates::TemplateCatalog;

/// Round used when no round can be resolved.
pub const FALLBACK_ROUND_ID: RoundId = RoundId(1);

#[derive(Debug, Error)]
pub enum EventServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

pub type EventServiceResult<T> = Result<T, EventServiceError>;

// =============================================================================
// EventService
// =============================================================================

pub struct EventService {
    store: Arc<dyn TableStore>,
    generator: EventGenerator,
    profile: SchemaProfile,
}

impl EventService {
    pub fn new(store: Arc<dyn TableStore>, generator: EventGenerator, profile: SchemaProfile) -> Self {
        Self {
            store,
            generator,
            profile,
        }
    }

    pub fn profile(&self) -> SchemaProfile {
        self.profile
    }

    pub fn generator(&self) -> &EventGenerator {
        &self.generator
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        self.generator.catalog()
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Generate an event and try to persist it.
    pub async fn generate(&self, request: &EventCreate) -> EventServiceResult<GenerationOutcome> {
        let recent = self.recent_template_ids().await;
        let event = self
            .generator
            .generate(request.category, request.force_black_swan, &recent)?;
        let persistence = self.persist(&event).await;

        match &persistence {
            PersistenceOutcome::Persisted { row_id, round_id } => info!(
                runtime_id = %event.runtime_id,
                row_id = ?row_id,
                round_id = round_id.raw(),
                category = %event.category,
                "Event generated and stored"
            ),
            PersistenceOutcome::NotPersisted { reason } => warn!(
                runtime_id = %event.runtime_id,
                reason = %reason,
                "Event generated but not stored"
            ),
        }

        Ok(GenerationOutcome { event, persistence })
    }

    /// Template ids of the last `lookback` stored events. Empty on failure.
    async fn recent_template_ids(&self) -> HashSet<String> {
        let config = self.generator.config();
        if !config.avoid_recent || config.lookback == 0 {
            return HashSet::new();
        }

        let title_column = [self.profile.title_column()];
        let columns: &[&str] = match self.profile {
            SchemaProfile::Compat => &["headline", "title"],
            _ => &title_column,
        };
        let query = Query::new()
            .columns(columns)
            .order_by("id", true)
            .limit(config.lookback);

        match self.store.select(tables::EVENTS, &query).await {
            Ok(rows) => self.generator.recency_window(&rows),
            Err(e) => {
                warn!(error = %e, "Could not read recent events; sampling from the full pool");
                HashSet::new()
            }
        }
    }

    /// Latest round id, creating the placeholder round when there is none.
    async fn resolve_round_id(&self) -> RoundId {
        let query = Query::new().columns(&["id"]).order_by("id", true);
        match self.store.select_one(tables::ROUNDS, query).await {
            Ok(Some(row)) => match get_i64(&row, "id") {
                Some(id) => RoundId(id),
                None => FALLBACK_ROUND_ID,
            },
            Ok(None) => {
                let mut placeholder = Row::new();
                placeholder.insert("id".into(), FALLBACK_ROUND_ID.raw().into());
                placeholder.insert("game_id".into(), 1.into());
                placeholder.insert("round_no".into(), 1.into());
                if let Err(e) = self.store.insert(tables::ROUNDS, vec![placeholder]).await {
                    warn!(error = %e, "Could not create placeholder round; using round 1");
                }
                FALLBACK_ROUND_ID
            }
            Err(e) => {
                warn!(error = %e, "Could not read rounds; using round 1");
                FALLBACK_ROUND_ID
            }
        }
    }

    async fn persist(&self, event: &MarketEvent) -> PersistenceOutcome {
        let round_id = self.resolve_round_id().await;
        let row = storage_row_for(event, self.profile, Some(round_id), None);

        match self.store.insert_one(tables::EVENTS, row).await {
            Ok(stored) => {
                let row_id = stored.as_ref().and_then(|r| get_i64(r, "id"));
                if row_id.is_none() {
                    warn!(runtime_id = %event.runtime_id, "Event inserted but no row returned");
                }
                PersistenceOutcome::Persisted { row_id, round_id }
            }
            Err(e) => {
                error!(runtime_id = %event.runtime_id, error = %e, "Failed to store event");
                PersistenceOutcome::NotPersisted {
                    reason: e.to_string(),
                }
            }
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Stored events, newest first, optionally of one category.
    pub async fn list(
        &self,
        limit: Option<usize>,
        category: Option<EventCategory>,
    ) -> EventServiceResult<Vec<MarketEvent>> {
        let Some(category) = category else {
            let query = Query::new().order_by("id", true).maybe_limit(limit);
            return self.fetch(&query).await;
        };

        let mut query = Query::new()
            .eq(self.profile.category_column(), storage_category(category).as_str())
            .order_by("id", true);
        if category == EventCategory::BlackSwan {
            query = query.eq("severity", Severity::High.as_str());
        }
        self.fetch_matching(&query, limit, |e| e.category == category).await
    }

    /// Stored black swans, newest first.
    pub async fn list_black_swans(&self, limit: Option<usize>) -> EventServiceResult<Vec<MarketEvent>> {
        let query = Query::new()
            .eq(self.profile.category_column(), EventCategory::Micro.as_str())
            .eq("severity", Severity::High.as_str())
            .order_by("id", true);
        self.fetch_matching(&query, limit, MarketEvent::is_black_swan).await
    }

    /// Stored macro and micro news, newest first.
    pub async fn list_news(&self, limit: Option<usize>) -> EventServiceResult<Vec<MarketEvent>> {
        let query = Query::new()
            .is_in(
                self.profile.category_column(),
                [EventCategory::Macro.as_str(), EventCategory::Micro.as_str()],
            )
            .order_by("id", true);
        self.fetch_matching(&query, limit, |e| !e.is_black_swan()).await
    }

    /// Event by store row id or runtime id.
    pub async fn get(&self, id: &str) -> EventServiceResult<Option<MarketEvent>> {
        if let Some(row_id) = parse_row_id(id) {
            let query = Query::new().eq("id", row_id);
            if let Some(row) = self.store.select_one(tables::EVENTS, query).await? {
                return Ok(Some(self.decode(&row)));
            }
        }

        let query = Query::new().eq("runtime_id", id);
        match self.store.select_one(tables::EVENTS, query).await {
            Ok(row) => Ok(row.map(|r| self.decode(&r))),
            Err(e) => {
                debug!(id, error = %e, "runtime_id lookup failed; treating as not found");
                Ok(None)
            }
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Apply a partial update. `None` when no row matched.
    pub async fn update(&self, id: &str, update: &EventUpdate) -> EventServiceResult<Option<MarketEvent>> {
        let patch = update_patch(update, self.profile);
        if patch.is_empty() {
            return self.get(id).await;
        }

        let filters = [id_filter(id)];
        let rows = match self.store.update(tables::EVENTS, &filters, patch).await {
            Ok(rows) => rows,
            Err(e) if is_missing_column(&e, &filters[0]) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(rows.first().map(|r| self.decode(r)))
    }

    /// Delete an event. `false` when no row matched.
    pub async fn delete(&self, id: &str) -> EventServiceResult<bool> {
        let filters = [id_filter(id)];
        let removed = match self.store.delete(tables::EVENTS, &filters).await {
            Ok(rows) => rows,
            Err(e) if is_missing_column(&e, &filters[0]) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(!removed.is_empty())
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    async fn fetch(&self, query: &Query) -> EventServiceResult<Vec<MarketEvent>> {
        let rows = self.store.select(tables::EVENTS, query).await?;
        Ok(rows.iter().map(|r| self.decode(r)).collect())
    }

    /// Decoded rows that pass `keep`, capped at `limit`.
    ///
    /// The category of a stored row is only known after decoding, so the
    /// cap applies here rather than in the store query.
    async fn fetch_matching(
        &self,
        query: &Query,
        limit: Option<usize>,
        keep: impl Fn(&MarketEvent) -> bool,
    ) -> EventServiceResult<Vec<MarketEvent>> {
        let rows = self.store.select(tables::EVENTS, query).await?;
        let matching = rows.iter().map(|r| self.decode(r)).filter(|e| keep(e));
        Ok(match limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    fn decode(&self, row: &Row) -> MarketEvent {
        from_storage_row(row, self.generator.catalog())
    }
}

/// Store row id when `id` is all ASCII digits.
fn parse_row_id(id: &str) -> Option<i64> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

fn id_filter(id: &str) -> Filter {
    match parse_row_id(id) {
        Some(row_id) => Filter::eq("id", row_id),
        None => Filter::eq("runtime_id", id),
    }
}

/// A client error on a `runtime_id` filter means the table has no such column.
fn is_missing_column(err: &StoreError, filter: &Filter) -> bool {
    filter.column() == "runtime_id"
        && matches!(err, StoreError::Api { status, .. } if (400..500).contains(status))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use serde_json::json;
    use store::MemoryStore;

    fn service_with(store: Arc<MemoryStore>, profile: SchemaProfile) -> EventService {
        let generator =
            EventGenerator::with_seed(TemplateCatalog::builtin(), GeneratorConfig::default(), 42);
        EventService::new(store, generator, profile)
    }

    fn service() -> (Arc<MemoryStore>, EventService) {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone(), SchemaProfile::Current);
        (store, service)
    }

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_row_id() {
        assert_eq!(parse_row_id("42"), Some(42));
        assert_eq!(parse_row_id("-1"), None);
        assert_eq!(parse_row_id("macro-1-1700000000000-0"), None);
        assert_eq!(parse_row_id(""), None);
    }

    #[tokio::test]
    async fn test_generate_persists_with_placeholder_round() {
        let (store, service) = service();
        let outcome = service
            .generate(&EventCreate {
                category: Some(EventCategory::Macro),
                force_black_swan: false,
            })
            .await
            .unwrap();

        assert_eq!(outcome.event.category, EventCategory::Macro);
        assert_eq!(
            outcome.persistence,
            PersistenceOutcome::Persisted {
                row_id: Some(1),
                round_id: RoundId(1)
            }
        );
        assert_eq!(store.len(tables::ROUNDS), 1);

        let stored = &store.rows(tables::EVENTS)[0];
        assert_eq!(stored["etype"], "MACRO");
        assert_eq!(stored["round_id"], 1);
        assert!(!stored.contains_key("title"));
    }

    #[tokio::test]
    async fn test_generate_uses_latest_round() {
        let (store, service) = service();
        store
            .insert(
                tables::ROUNDS,
                vec![
                    row(json!({"game_id": 1, "round_no": 1})),
                    row(json!({"game_id": 1, "round_no": 2})),
                ],
            )
            .await
            .unwrap();

        let outcome = service.generate(&EventCreate::default()).await.unwrap();
        match outcome.persistence {
            PersistenceOutcome::Persisted { round_id, .. } => assert_eq!(round_id, RoundId(2)),
            other => panic!("expected persisted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_survives_store_outage() {
        let (store, service) = service();
        store.set_offline(tables::EVENTS, true);
        store.set_offline(tables::ROUNDS, true);

        let outcome = service
            .generate(&EventCreate {
                category: None,
                force_black_swan: true,
            })
            .await
            .unwrap();

        assert!(outcome.event.is_black_swan());
        assert!(matches!(
            outcome.persistence,
            PersistenceOutcome::NotPersisted { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let generator = EventGenerator::with_seed(
            TemplateCatalog::builtin(),
            GeneratorConfig {
                black_swan_jitter: 0.0,
                ..Default::default()
            },
            42,
        );
        let service = EventService::new(
            Arc::new(MemoryStore::new()),
            generator,
            SchemaProfile::Current,
        );
        for request in [
            EventCreate { category: Some(EventCategory::Macro), force_black_swan: false },
            EventCreate { category: Some(EventCategory::Micro), force_black_swan: false },
            EventCreate { category: None, force_black_swan: true },
            EventCreate { category: Some(EventCategory::Macro), force_black_swan: false },
        ] {
            service.generate(&request).await.unwrap();
        }

        let all = service.list(None, None).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].db_id, Some(4));

        let macros = service.list(Some(10), Some(EventCategory::Macro)).await.unwrap();
        assert_eq!(macros.len(), 2);

        let limited = service.list(Some(1), None).await.unwrap();
        assert_eq!(limited.len(), 1);

        // Unjittered black swan bases all exceed the recognition threshold.
        let swans = service.list_black_swans(None).await.unwrap();
        assert_eq!(swans.len(), 1);
        assert!(swans[0].id.starts_with("bs-"));

        let news = service.list_news(None).await.unwrap();
        assert_eq!(news.len(), 3);
        assert!(news.iter().all(|e| !e.is_black_swan()));
    }

    async fn seed_rows(store: &MemoryStore, rows: Vec<serde_json::Value>) {
        store
            .insert(tables::EVENTS, rows.into_iter().map(row).collect())
            .await
            .unwrap();
    }

    fn macro_row(n: usize) -> serde_json::Value {
        json!({"etype": "MACRO", "severity": "NORMAL", "headline": format!("macro {n}"), "impact_pct": 0.01})
    }

    fn micro_high_row(impact_pct: f64) -> serde_json::Value {
        json!({"etype": "MICRO", "severity": "HIGH", "headline": "micro", "impact_pct": impact_pct})
    }

    #[tokio::test]
    async fn test_news_limit_skips_newer_black_swans() {
        let (store, service) = service();
        seed_rows(&store, (1..=3).map(macro_row).collect()).await;
        seed_rows(&store, vec![micro_high_row(-0.12); 3]).await;

        let news = service.list_news(Some(3)).await.unwrap();
        assert_eq!(news.len(), 3);
        assert!(news.iter().all(|e| e.category == EventCategory::Macro));
        assert_eq!(news[0].db_id, Some(3));

        let micro = service.list(Some(2), Some(EventCategory::Micro)).await.unwrap();
        assert!(micro.is_empty());
    }

    #[tokio::test]
    async fn test_black_swan_limit_skips_newer_ordinary_micro() {
        let (store, service) = service();
        seed_rows(&store, vec![micro_high_row(-0.12)]).await;
        seed_rows(&store, vec![micro_high_row(0.01); 3]).await;

        let swans = service.list_black_swans(Some(3)).await.unwrap();
        assert_eq!(swans.len(), 1);
        assert_eq!(swans[0].db_id, Some(1));

        let swans = service.list(Some(3), Some(EventCategory::BlackSwan)).await.unwrap();
        assert_eq!(swans.len(), 1);

        let news = service.list_news(Some(2)).await.unwrap();
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].db_id, Some(4));
    }

    #[tokio::test]
    async fn test_compat_recency_reads_legacy_titles() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone(), SchemaProfile::Compat);
        let template = service.catalog().find_by_title("Fed hikes rates by 25 bps").unwrap().id.clone();
        seed_rows(&store, vec![json!({"type": "MACRO", "title": "Fed hikes rates by 25 bps"})]).await;

        let recent = service.recent_template_ids().await;
        assert!(recent.contains(&template));
    }

    #[tokio::test]
    async fn test_list_propagates_store_errors() {
        let (store, service) = service();
        store.set_offline(tables::EVENTS, true);
        let err = service.list(None, None).await.unwrap_err();
        assert!(matches!(err, EventServiceError::Store(_)));
    }

    #[tokio::test]
    async fn test_get_by_row_id_and_runtime_id() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone(), SchemaProfile::Legacy);
        let outcome = service.generate(&EventCreate::default()).await.unwrap();

        let by_row = service.get("1").await.unwrap().unwrap();
        assert_eq!(by_row.title, outcome.event.title);
        assert_eq!(by_row.db_id, Some(1));

        let by_runtime = service.get(&outcome.event.runtime_id).await.unwrap().unwrap();
        assert_eq!(by_runtime.runtime_id, outcome.event.runtime_id);

        assert!(service.get("999").await.unwrap().is_none());
        assert!(service.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_store, service) = service();
        service.generate(&EventCreate::default()).await.unwrap();

        let update = EventUpdate {
            title: Some("Edited headline".into()),
            impact_pct: Some(0.0077),
            ..Default::default()
        };
        let updated = service.update("1", &update).await.unwrap().unwrap();
        assert_eq!(updated.title, "Edited headline");
        assert_eq!(updated.impact_pct, 0.0077);

        let unchanged = service.update("1", &EventUpdate::default()).await.unwrap();
        assert_eq!(unchanged.unwrap().title, "Edited headline");

        assert!(service.update("2", &update).await.unwrap().is_none());

        assert!(service.delete("1").await.unwrap());
        assert!(!service.delete("1").await.unwrap());
        assert!(!service.delete("macro-1-0-0").await.unwrap());
    }
}
