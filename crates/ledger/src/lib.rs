//! Persistence for the pass-through game entities.
//!
//! Each module is a thin set of functions over a [`TableStore`]: build a
//! query, run it, decode the rows into the typed entities from `types`.
//!
//! - [`tickers`]: instruments, unique by upper-cased symbol
//! - [`games`]: games and their rounds (create-or-get semantics)
//! - [`round_scores`]: per-participant results of a round
//! - [`price_snapshots`]: ticker prices captured during play

pub mod games;
pub mod price_snapshots;
pub mod round_scores;
pub mod tickers;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use store::row::{decode, get_f64};
use store::{Row, StoreError, TableStore};

/// Largest batch accepted by [`price_snapshots::create_batch`].
pub const MAX_BATCH: usize = 1000;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// The store accepted a write but echoed nothing back.
    #[error("store returned no row for {0}")]
    Missing(&'static str),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Decode a row, first turning numeric strings in `float_columns` into numbers.
///
/// `numeric` columns may come back as strings depending on how the column
/// is declared.
pub(crate) fn decode_row<T: DeserializeOwned>(
    mut row: Row,
    float_columns: &[&str],
) -> LedgerResult<T> {
    for column in float_columns {
        if let Some(value) = get_f64(&row, column) {
            if row.get(*column).is_some_and(Value::is_string) {
                row.insert((*column).to_string(), value.into());
            }
        }
    }
    Ok(decode(row)?)
}

pub(crate) fn decode_rows<T: DeserializeOwned>(
    rows: Vec<Row>,
    float_columns: &[&str],
) -> LedgerResult<Vec<T>> {
    rows.into_iter()
        .map(|r| decode_row(r, float_columns))
        .collect()
}

/// Insert one row and decode the echoed result.
pub(crate) async fn insert_returning<T: DeserializeOwned>(
    store: &dyn TableStore,
    table: &'static str,
    row: Row,
    float_columns: &[&str],
) -> LedgerResult<T> {
    match store.insert_one(table, row).await? {
        Some(stored) => decode_row(stored, float_columns),
        None => Err(LedgerError::Missing(table)),
    }
}
