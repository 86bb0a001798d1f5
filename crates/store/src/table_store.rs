//! The store abstraction shared by every backend.

use async_trait::async_trait;

use crate::query::{Filter, Query};
use crate::row::Row;
use crate::{StoreResult, tables};

/// Generic tabular store: the only persistence capability the API relies on.
///
/// Implementations must be safe to share across request handlers.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Insert rows, returning them as stored (with assigned ids).
    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>>;

    /// Select rows matching `query`.
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>>;

    /// Merge `patch` into every row matching all `filters`; returns updated rows.
    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>>;

    /// Delete every row matching all `filters`; returns removed rows.
    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<Vec<Row>>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Connectivity probe.
    async fn ping(&self) -> StoreResult<()> {
        self.select(tables::EVENTS, &Query::new().columns(&["id"]).limit(1))
            .await
            .map(|_| ())
    }

    /// Insert one row, returning it as stored (if the store echoed it).
    async fn insert_one(&self, table: &str, row: Row) -> StoreResult<Option<Row>> {
        Ok(self.insert(table, vec![row]).await?.into_iter().next())
    }

    /// First row matching `query` (limit forced to 1).
    async fn select_one(&self, table: &str, query: Query) -> StoreResult<Option<Row>> {
        let query = query.limit(1);
        Ok(self.select(table, &query).await?.into_iter().next())
    }
}
