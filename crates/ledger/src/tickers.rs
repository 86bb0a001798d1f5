//! Tickers: tradable instruments, unique by symbol.

use tracing::info;

use store::row::encode;
use store::{Query, TableStore, tables};
use types::{Ticker, TickerCreate, TickerId};

use crate::{LedgerError, LedgerResult, decode_row, decode_rows, insert_returning};

/// All tickers ordered by symbol.
pub async fn list(store: &dyn TableStore) -> LedgerResult<Vec<Ticker>> {
    let rows = store
        .select(tables::TICKERS, &Query::new().order_by("symbol", false))
        .await?;
    decode_rows(rows, &[])
}

pub async fn get(store: &dyn TableStore, id: TickerId) -> LedgerResult<Option<Ticker>> {
    let query = Query::new().eq("id", id.raw());
    match store.select_one(tables::TICKERS, query).await? {
        Some(row) => Ok(Some(decode_row(row, &[])?)),
        None => Ok(None),
    }
}

/// Lookup by symbol (case-insensitive; symbols are stored upper-case).
pub async fn get_by_symbol(store: &dyn TableStore, symbol: &str) -> LedgerResult<Option<Ticker>> {
    let query = Query::new().eq("symbol", normalize_symbol(symbol));
    match store.select_one(tables::TICKERS, query).await? {
        Some(row) => Ok(Some(decode_row(row, &[])?)),
        None => Ok(None),
    }
}

/// Create a ticker. Blank fields and duplicate symbols are rejected.
pub async fn create(store: &dyn TableStore, request: &TickerCreate) -> LedgerResult<Ticker> {
    let symbol = normalize_symbol(&request.symbol);
    let name = request.name.trim();
    let sector = request.sector.trim();

    if symbol.is_empty() || name.is_empty() || sector.is_empty() {
        return Err(LedgerError::Validation(
            "symbol, name and sector are required".into(),
        ));
    }

    if get_by_symbol(store, &symbol).await?.is_some() {
        return Err(LedgerError::Conflict(format!(
            "Ticker with symbol '{symbol}' already exists"
        )));
    }

    let row = encode(&TickerCreate {
        symbol: symbol.clone(),
        name: name.to_string(),
        sector: sector.to_string(),
    })?;
    let ticker: Ticker = match insert_returning(store, tables::TICKERS, row, &[]).await {
        Err(LedgerError::Store(e)) if e.is_conflict() => {
            return Err(LedgerError::Conflict(format!(
                "Ticker with symbol '{symbol}' already exists"
            )));
        }
        other => other?,
    };

    info!(symbol = %ticker.symbol, id = ticker.id.raw(), "Ticker created");
    Ok(ticker)
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}
