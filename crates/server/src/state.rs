//! Shared server state.
//!
//! Everything a handler needs is injected here at startup: the store
//! handle and the event service (which owns the generator, its template
//! catalog and its counters). Nothing is global.

use std::sync::Arc;
use std::time::Instant;

use news::EventService;
use store::TableStore;

/// Shared state for all route handlers.
///
/// Cloned into each handler via Axum's State extractor.
#[derive(Clone)]
pub struct ServerState {
    /// Tabular store used by the pass-through entities and the health probe.
    pub store: Arc<dyn TableStore>,

    /// Event generation and CRUD.
    pub events: Arc<EventService>,

    /// Server start time.
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(store: Arc<dyn TableStore>, events: EventService) -> Self {
        Self {
            store,
            events: Arc::new(events),
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn store(&self) -> &dyn TableStore {
        self.store.as_ref()
    }
}
