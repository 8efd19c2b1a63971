//! Projection of provider JSON responses into tables.
//!
//! Columns are described as `(name, pointer)` pairs, where the pointer is an
//! RFC 6901 JSON pointer into each item (e.g. `/quotes/USD/price`).

use chrono::{DateTime, Utc};
use coinshell_types::{Cell, Table};
use serde_json::Value;

use crate::{ProviderError, ProviderResult};

/// Converts a JSON value into a cell, inferring numbers and dates from strings.
#[must_use]
pub fn cell(value: &Value) -> Cell {
    match value {
        Value::String(s) => Cell::infer(s),
        other => Cell::from_json(other),
    }
}

/// Reads the value at `pointer` as a cell; missing paths become empty cells.
#[must_use]
pub fn pick(value: &Value, pointer: &str) -> Cell {
    value.pointer(pointer).map_or(Cell::Empty, cell)
}

/// Builds one row per item from `(column, pointer)` pairs.
#[must_use]
pub fn rows<L, P>(items: &[Value], columns: &[(L, P)]) -> Table
where
    L: AsRef<str>,
    P: AsRef<str>,
{
    let mut table = Table::new(columns.iter().map(|(name, _)| name.as_ref()));
    for item in items {
        table.push_row(
            columns
                .iter()
                .map(|(_, pointer)| pick(item, pointer.as_ref()))
                .collect(),
        );
    }
    table
}

/// Builds a `Metric` / `Value` table from `(label, pointer)` pairs of one object.
#[must_use]
pub fn metrics<L, P>(value: &Value, fields: &[(L, P)]) -> Table
where
    L: AsRef<str>,
    P: AsRef<str>,
{
    Table::key_value(
        fields
            .iter()
            .map(|(label, pointer)| (label.as_ref(), pick(value, pointer.as_ref()))),
    )
}

/// Returns the array at `pointer` (use `""` for the document root).
///
/// # Errors
///
/// Returns [`ProviderError::Parse`] naming `what` if the value is not an array.
pub fn array<'a>(value: &'a Value, pointer: &str, what: &str) -> ProviderResult<&'a [Value]> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| ProviderError::Parse(what.to_string()))
}

/// Reads a number that may be encoded as a JSON number or a numeric string.
#[must_use]
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Converts a millisecond Unix timestamp (integer or float) into a UTC time.
#[must_use]
pub fn millis(value: &Value) -> Option<DateTime<Utc>> {
    let ms = value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp_millis(ms)
}

/// Joins a named field of every object in an array (e.g. tag names).
#[must_use]
pub fn join_field(value: &Value, pointer: &str, field: &str) -> Cell {
    let names: Vec<&str> = value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|i| i.get(field)?.as_str()).collect())
        .unwrap_or_default();
    if names.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(names.join(", "))
    }
}
