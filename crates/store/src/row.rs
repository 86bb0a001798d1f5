//! Row representation and lenient field accessors.
//!
//! The hosted store may return numeric columns as JSON numbers or as
//! numeric strings depending on column type, so the accessors accept both.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{StoreError, StoreResult};

/// One table row: column name → JSON value.
pub type Row = Map<String, Value>;

/// Integer column (number, or numeric string).
pub fn get_i64(row: &Row, column: &str) -> Option<i64> {
    match row.get(column)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float column (number, or numeric string).
pub fn get_f64(row: &Row, column: &str) -> Option<f64> {
    match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-empty string column.
pub fn get_str<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column)?.as_str().filter(|s| !s.is_empty())
}

/// Boolean column (bool, or `"true"`/`"false"`).
pub fn get_bool(row: &Row, column: &str) -> Option<bool> {
    match row.get(column)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First present non-empty string among `columns`.
pub fn first_str<'a>(row: &'a Row, columns: &[&str]) -> Option<&'a str> {
    columns.iter().find_map(|c| get_str(row, c))
}

/// First present float among `columns`.
pub fn first_f64(row: &Row, columns: &[&str]) -> Option<f64> {
    columns.iter().find_map(|c| get_f64(row, c))
}

/// String list column (JSON array of strings).
pub fn get_string_list(row: &Row, column: &str) -> Option<Vec<String>> {
    let items = row.get(column)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

/// Decode a row into a typed entity.
pub fn decode<T: DeserializeOwned>(row: Row) -> StoreResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Encode a typed value into a row. Non-object values are rejected.
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Decode(format!(
            "expected an object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_numeric_accessors_accept_strings() {
        let r = row(json!({"id": "12", "price": "101.25", "qty": 3.0}));
        assert_eq!(get_i64(&r, "id"), Some(12));
        assert_eq!(get_f64(&r, "price"), Some(101.25));
        assert_eq!(get_i64(&r, "qty"), Some(3));
        assert_eq!(get_f64(&r, "missing"), None);
    }

    #[test]
    fn test_first_str_skips_empty() {
        let r = row(json!({"headline": "", "title": "CPI cools"}));
        assert_eq!(first_str(&r, &["headline", "title"]), Some("CPI cools"));
    }

    #[test]
    fn test_get_bool_and_list() {
        let r = row(json!({"reacted": "true", "tags": ["rates", 3, "fed"]}));
        assert_eq!(get_bool(&r, "reacted"), Some(true));
        assert_eq!(
            get_string_list(&r, "tags"),
            Some(vec!["rates".to_string(), "fed".to_string()])
        );
    }

    #[test]
    fn test_decode_reports_missing_fields() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Needs {
            id: i64,
            name: String,
        }
        let err = decode::<Needs>(row(json!({"id": 1}))).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
