//! Market events for the hedge game.
//!
//! This crate provides:
//! - **Templates**: scripted macro, micro and black swan events grouped into pools
//! - **Generator**: recency-aware sampling with jitter and unique runtime ids
//! - **Schema**: mapping between events and rows of the `events` table
//! - **Service**: generation with best-effort persistence, plus event CRUD
//!
//! # Architecture
//!
//! One generation request runs a short, fixed pipeline:
//!
//! ```text
//!   1. Read the last N stored headlines      (store, fails open)
//!   2. Pick a pool and a fresh template      (generator, RNG lock held)
//!   3. Jitter the impact, stamp runtime id   (generator, RNG lock held)
//!   4. Resolve the round, insert the row     (store, failure is reported)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use news::{EventGenerator, EventService, GeneratorConfig, SchemaProfile, TemplateCatalog};
//!
//! let generator = EventGenerator::new(TemplateCatalog::builtin(), GeneratorConfig::default());
//! let service = EventService::new(store, generator, SchemaProfile::Current);
//!
//! let outcome = service.generate(&EventCreate::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod events;
pub mod generator;
pub mod schema;
pub mod service;
pub mod templates;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{GeneratorConfig, SchemaProfile};
pub use events::{GenerationOutcome, PersistenceOutcome, Severity};
pub use generator::{EventGenerator, GenerateError};
pub use schema::{from_storage_row, storage_row_for, to_storage_row};
pub use service::{EventService, EventServiceError, EventServiceResult};
pub use templates::{EventTemplate, TemplateCatalog};
