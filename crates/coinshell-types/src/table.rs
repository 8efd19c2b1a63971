//! Tabular results produced by every command.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use crate::{CoinshellError, Result};

/// A single heterogeneous table value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Missing value.
    #[default]
    Empty,
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Free text.
    Text(String),
    /// Point in time (UTC).
    Date(DateTime<Utc>),
}

impl Cell {
    /// Creates a text cell.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Converts a JSON value into a cell.
    ///
    /// Strings holding RFC 3339 timestamps become dates, arrays of scalars are
    /// joined with commas, and nested objects are kept as compact JSON text.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Empty),
            Value::String(s) if s.trim().is_empty() => Self::Empty,
            Value::String(s) => parse_date(s).map_or_else(|| Self::Text(s.clone()), Self::Date),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
                if parts.is_empty() {
                    Self::Empty
                } else {
                    Self::Text(parts.join(", "))
                }
            }
            Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// Infers a typed cell from scraped or stringly-typed text.
    ///
    /// Currency signs, thousands separators and trailing percent signs are
    /// stripped before numeric parsing; placeholders such as `?`, `-` and
    /// `N/A` become [`Cell::Empty`].
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if matches!(trimmed, "" | "?" | "-" | "N/A" | "n/a") {
            return Self::Empty;
        }

        let numeric: String = trimmed
            .trim_start_matches('$')
            .trim_end_matches('%')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if let Ok(i) = numeric.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = numeric.parse::<f64>()
            && f.is_finite()
        {
            return Self::Float(f);
        }

        parse_date(trimmed).map_or_else(|| Self::Text(trimmed.to_string()), Self::Date)
    }

    /// Returns the value as `f64` when the cell is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the text when the cell holds text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for [`Cell::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Converts the cell back to JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.to_rfc3339()),
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Numbers always compare as `f64`, so integer and float storage mix
    /// without breaking transitivity.
    /// Different kinds order as bool < number < date < text < empty.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (Self::Empty, Self::Empty) => Ordering::Equal,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.kind_rank().cmp(&b.kind_rank()),
            },
        }
    }

    const fn kind_rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Date(_) => 2,
            Self::Text(_) => 3,
            Self::Empty => 4,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M")),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<DateTime<Utc>> for Cell {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// An ordered set of named columns with rows of [`Cell`] values.
///
/// Every row always has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given column names.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Creates a two-column `Metric` / `Value` table.
    #[must_use]
    pub fn key_value<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Cell)>,
        K: Into<String>,
    {
        let mut table = Self::new(["Metric", "Value"]);
        for (key, value) in pairs {
            table.push_row(vec![Cell::Text(key.into()), value]);
        }
        table
    }

    /// Appends a row, padding with empty cells or dropping extra cells so the
    /// row matches the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a column index by name (case-insensitive).
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Stable-sorts the rows by the named column.
    ///
    /// With `descending` the comparator is inverted, so for a column of unique
    /// values the two orders are exact reverses of each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist.
    pub fn sort_by_column(&mut self, name: &str, descending: bool) -> Result<()> {
        let idx = self.require_column(name)?;
        self.rows.sort_by(|a, b| {
            let ord = a[idx].compare(&b[idx]);
            if descending { ord.reverse() } else { ord }
        });
        Ok(())
    }

    /// Keeps at most `limit` rows.
    pub fn truncate(&mut self, limit: usize) {
        self.rows.truncate(limit);
    }

    /// Removes a column if it exists. Returns true if a column was removed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Inserts a leading 1-based `rank` column reflecting the current row order.
    pub fn insert_rank(&mut self) {
        self.columns.insert(0, "rank".to_string());
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.insert(0, Cell::Int(i as i64 + 1));
        }
    }

    /// Reverses the row order.
    pub fn reverse(&mut self) {
        self.rows.reverse();
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| CoinshellError::UnknownColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_table() -> Table {
        let mut table = Table::new(["name", "price", "change"]);
        table.push_row(vec!["Bitcoin".into(), Cell::Float(42_000.0), Cell::Float(1.5)]);
        table.push_row(vec!["Ethereum".into(), Cell::Int(2_200), Cell::Float(-0.4)]);
        table.push_row(vec!["Solana".into(), Cell::Float(98.5), Cell::Empty]);
        table.push_row(vec!["Cardano".into(), Cell::Float(0.52), Cell::Float(3.1)]);
        table
    }

    fn names(table: &Table) -> Vec<String> {
        table.rows().iter().map(|r| r[0].to_string()).collect()
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut table = Table::new(["a", "b"]);
        table.push_row(vec![Cell::Int(1)]);
        table.push_row(vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]);
        assert!(table.rows().iter().all(|r| r.len() == 2));
        assert_eq!(table.rows()[0][1], Cell::Empty);
    }

    #[test]
    fn test_sort_mixed_numeric_storage() {
        let mut table = sample_table();
        table.sort_by_column("price", false).unwrap();
        assert_eq!(names(&table), ["Cardano", "Solana", "Ethereum", "Bitcoin"]);
    }

    #[test]
    fn test_descending_is_exact_reverse_for_unique_keys() {
        let mut asc = sample_table();
        let mut desc = sample_table();
        asc.sort_by_column("name", false).unwrap();
        desc.sort_by_column("name", true).unwrap();

        let mut reversed = names(&desc);
        reversed.reverse();
        assert_eq!(names(&asc), reversed);
    }

    #[test]
    fn test_empty_cells_sort_last_ascending() {
        let mut table = sample_table();
        table.sort_by_column("change", false).unwrap();
        assert_eq!(names(&table).last().map(String::as_str), Some("Solana"));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut table = Table::new(["group", "id"]);
        for (group, id) in [("b", 1), ("a", 2), ("b", 3), ("a", 4)] {
            table.push_row(vec![group.into(), Cell::Int(id)]);
        }
        table.sort_by_column("group", false).unwrap();
        let ids: Vec<_> = table.rows().iter().map(|r| r[1].clone()).collect();
        assert_eq!(ids, [Cell::Int(2), Cell::Int(4), Cell::Int(1), Cell::Int(3)]);
    }

    #[test]
    fn test_unknown_sort_column() {
        let mut table = sample_table();
        let err = table.sort_by_column("volume", false).unwrap_err();
        assert!(matches!(err, CoinshellError::UnknownColumn { .. }));
        assert!(err.to_string().contains("name, price, change"));
    }

    #[test]
    fn test_truncate_larger_than_len_keeps_all() {
        let mut table = sample_table();
        table.truncate(100);
        assert_eq!(table.len(), 4);
        table.truncate(2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_drop_and_rank() {
        let mut table = sample_table();
        assert!(table.drop_column("CHANGE"));
        assert!(!table.drop_column("change"));
        table.insert_rank();
        assert_eq!(table.columns(), ["rank", "name", "price"]);
        assert_eq!(table.rows()[3][0], Cell::Int(4));
    }

    #[test]
    fn test_cell_from_json() {
        assert_eq!(Cell::from_json(&json!(null)), Cell::Empty);
        assert_eq!(Cell::from_json(&json!(5)), Cell::Int(5));
        assert_eq!(Cell::from_json(&json!(2.5)), Cell::Float(2.5));
        assert_eq!(Cell::from_json(&json!(["a", "", "b"])), Cell::text("a, b"));
        assert!(matches!(
            Cell::from_json(&json!("2021-11-10T14:24:11.849Z")),
            Cell::Date(_)
        ));
    }

    #[test]
    fn test_cell_infer() {
        assert_eq!(Cell::infer("$1,234"), Cell::Int(1234));
        assert_eq!(Cell::infer(" 12.5% "), Cell::Float(12.5));
        assert_eq!(Cell::infer("?"), Cell::Empty);
        assert_eq!(Cell::infer("Uniswap (v3)"), Cell::text("Uniswap (v3)"));
        assert!(matches!(Cell::infer("2024-01-05"), Cell::Date(_)));
    }

    #[test]
    fn test_large_ints_compare_consistently_with_floats() {
        let big = 1_i64 << 53;
        let a = Cell::Int(big);
        let b = Cell::Int(big + 1);
        let c = Cell::Float(big as f64);
        // a == c and b == c under f64, so a and b must tie as well
        assert_eq!(a.compare(&c), Ordering::Equal);
        assert_eq!(b.compare(&c), Ordering::Equal);
        assert_eq!(a.compare(&b), Ordering::Equal);

        let mut table = Table::new(["n"]);
        for cell in [b, c, a, Cell::Int(1), Cell::Float(0.5)] {
            table.push_row(vec![cell]);
        }
        table.sort_by_column("n", false).unwrap();
        assert_eq!(table.rows()[0][0], Cell::Float(0.5));
        assert_eq!(table.rows()[1][0], Cell::Int(1));
    }

    #[test]
    fn test_reverse_keeps_columns() {
        let mut table = sample_table();
        table.reverse();
        assert_eq!(names(&table), ["Cardano", "Solana", "Ethereum", "Bitcoin"]);
        assert_eq!(table.columns(), ["name", "price", "change"]);
    }
}
