//! In-process tables for tests and local development.
//!
//! Mirrors the hosted backend's observable behavior closely enough for the
//! API to run unchanged: auto-assigned integer ids, a creation timestamp
//! column, duplicate-id conflicts, filter/order/limit/column projection.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::query::{Filter, Query, compare_values};
use crate::row::{Row, get_i64};
use crate::table_store::TableStore;
use crate::{StoreError, StoreResult, tables};

#[derive(Debug, Default)]
struct MemoryTable {
    rows: Vec<Row>,
    next_id: i64,
}

impl MemoryTable {
    fn contains_id(&self, id: i64) -> bool {
        self.rows.iter().any(|r| get_i64(r, "id") == Some(id))
    }
}

/// Thread-safe in-memory [`TableStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, MemoryTable>>,
    offline: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every operation on `table` fails with a 503.
    pub fn set_offline(&self, table: &str, offline: bool) {
        let mut set = self.offline.lock();
        if offline {
            set.insert(table.to_string());
        } else {
            set.remove(table);
        }
    }

    /// Number of rows currently in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.tables.lock().get(table).map_or(0, |t| t.rows.len())
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Snapshot of every row in `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    fn check_online(&self, table: &str) -> StoreResult<()> {
        if self.offline.lock().contains(table) {
            return Err(StoreError::Api {
                status: 503,
                message: format!("table '{table}' is unavailable"),
            });
        }
        Ok(())
    }
}

/// Column stamped with the creation time on insert.
fn timestamp_column(table: &str) -> &'static str {
    if table == tables::PRICE_SNAPSHOTS {
        "taken_at"
    } else {
        "created_at"
    }
}

fn matches_all(filters: &[Filter], row: &Row) -> bool {
    filters.iter().all(|f| f.matches(row))
}

fn project(row: &Row, columns: &Option<Vec<String>>) -> Row {
    match columns {
        Some(columns) if !columns.is_empty() => columns
            .iter()
            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
            .collect(),
        _ => row.clone(),
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        self.check_online(table)?;
        let mut tables = self.tables.lock();
        let entry = tables.entry(table.to_string()).or_default();
        let stamp_column = timestamp_column(table);

        // Validate the whole batch before touching the table.
        let mut seen = HashSet::new();
        for row in &rows {
            if let Some(id) = get_i64(row, "id") {
                if entry.contains_id(id) || !seen.insert(id) {
                    return Err(StoreError::Api {
                        status: 409,
                        message: format!("duplicate key value violates unique constraint: id={id}"),
                    });
                }
            }
        }

        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            let id = match get_i64(&row, "id") {
                Some(id) => id,
                None => {
                    let mut id = entry.next_id + 1;
                    while entry.contains_id(id) || seen.contains(&id) {
                        id += 1;
                    }
                    id
                }
            };
            entry.next_id = entry.next_id.max(id);
            row.insert("id".into(), Value::from(id));

            let needs_stamp = row.get(stamp_column).is_none_or(Value::is_null);
            if needs_stamp {
                row.insert(stamp_column.into(), Value::from(types::now_iso()));
            }

            entry.rows.push(row.clone());
            stored.push(row);
        }
        Ok(stored)
    }

    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        self.check_online(table)?;
        let tables = self.tables.lock();
        let Some(entry) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<&Row> = entry
            .rows
            .iter()
            .filter(|r| matches_all(&query.filters, r))
            .collect();

        if let Some(order) = &query.order {
            let null = Value::Null;
            rows.sort_by(|a, b| {
                let x = a.get(&order.column).unwrap_or(&null);
                let y = b.get(&order.column).unwrap_or(&null);
                let ord = compare_values(x, y);
                if order.descending { ord.reverse() } else { ord }
            });
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|r| project(r, &query.columns))
            .collect())
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>> {
        self.check_online(table)?;
        let mut tables = self.tables.lock();
        let Some(entry) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in entry.rows.iter_mut().filter(|r| matches_all(filters, r)) {
            for (column, value) in &patch {
                if column != "id" {
                    row.insert(column.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<Vec<Row>> {
        self.check_online(table)?;
        let mut tables = self.tables.lock();
        let Some(entry) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut entry.rows)
            .into_iter()
            .partition(|r| matches_all(filters, r));
        entry.rows = kept;
        Ok(removed)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_timestamps() {
        let store = MemoryStore::new();
        let out = store
            .insert(
                tables::EVENTS,
                vec![row(json!({"headline": "a"})), row(json!({"headline": "b"}))],
            )
            .await
            .unwrap();

        assert_eq!(get_i64(&out[0], "id"), Some(1));
        assert_eq!(get_i64(&out[1], "id"), Some(2));
        assert!(out[0].get("created_at").is_some());
        assert_eq!(store.len(tables::EVENTS), 2);
    }

    #[tokio::test]
    async fn test_price_snapshots_stamp_taken_at() {
        let store = MemoryStore::new();
        let out = store
            .insert(tables::PRICE_SNAPSHOTS, vec![row(json!({"price": 10.0}))])
            .await
            .unwrap();
        assert!(out[0].get("taken_at").is_some());
        assert!(out[0].get("created_at").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let store = MemoryStore::new();
        store
            .insert(tables::ROUNDS, vec![row(json!({"id": 1, "round_no": 1}))])
            .await
            .unwrap();
        let err = store
            .insert(tables::ROUNDS, vec![row(json!({"id": 1, "round_no": 1}))])
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Auto ids continue past explicit ones.
        let out = store
            .insert(tables::ROUNDS, vec![row(json!({"round_no": 2}))])
            .await
            .unwrap();
        assert_eq!(get_i64(&out[0], "id"), Some(2));
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for etype in ["MACRO", "MICRO", "MACRO", "MICRO"] {
            store
                .insert(tables::EVENTS, vec![row(json!({"etype": etype}))])
                .await
                .unwrap();
        }

        let query = Query::new()
            .eq("etype", "MACRO")
            .order_by("id", true)
            .limit(1)
            .columns(&["id"]);
        let out = store.select(tables::EVENTS, &query).await.unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(get_i64(&out[0], "id"), Some(3));
        assert!(out[0].get("etype").is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        store
            .insert(tables::TICKERS, vec![row(json!({"symbol": "ACME"}))])
            .await
            .unwrap();

        let updated = store
            .update(
                tables::TICKERS,
                &[Filter::eq("id", 1)],
                row(json!({"name": "Acme Corp", "id": 99})),
            )
            .await
            .unwrap();
        assert_eq!(updated[0]["name"], "Acme Corp");
        assert_eq!(get_i64(&updated[0], "id"), Some(1));

        let removed = store
            .delete(tables::TICKERS, &[Filter::eq("id", 1)])
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert!(store.is_empty(tables::TICKERS));

        let none = store
            .delete(tables::TICKERS, &[Filter::eq("id", 1)])
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_offline_table_fails() {
        let store = MemoryStore::new();
        store.set_offline(tables::EVENTS, true);
        let err = store.ping().await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 503, .. }));

        store.set_offline(tables::EVENTS, false);
        assert!(store.ping().await.is_ok());
    }
}
