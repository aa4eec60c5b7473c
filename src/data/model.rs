use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::summary::Observation;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as guessed from CSV text or read from JSON / Parquet.
/// Filters keep these in `BTreeSet`s, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Text is not coerced here; the loaders
    /// already guessed numeric types.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Guess the type of a raw text field (CSV cells, etc.).
    pub fn guess(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Column errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ColumnError {
    #[error("column '{0}' not found")]
    Missing(String),
    #[error("row {row}: column '{column}' holds '{value}', which is not a finite number")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Table – the complete loaded file
// ---------------------------------------------------------------------------

pub type Row = BTreeMap<String, CellValue>;

/// A loaded table with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Rows in file order.
    pub rows: Vec<Row>,
    /// Column names in header order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Table {
    /// Build column indices from loaded rows. `column_names` keeps the
    /// source order; columns only seen in rows are appended.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Row>) -> Self {
        let mut column_names = column_names;
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();

        for row in &rows {
            for (col, val) in row {
                if !column_names.contains(col) {
                    column_names.push(col.clone());
                }
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        Table {
            rows,
            column_names,
            unique_values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    pub fn require_column(&self, column: &str) -> Result<(), ColumnError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ColumnError::Missing(column.to_string()))
        }
    }

    /// Text of a cell, `<null>` when absent.
    pub fn label(&self, row: usize, column: &str) -> String {
        self.rows[row]
            .get(column)
            .map(|v| v.to_string())
            .unwrap_or_else(|| CellValue::Null.to_string())
    }

    /// Distinct labels of a column in first-seen order.
    pub fn column_labels(&self, column: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        (0..self.rows.len())
            .map(|i| self.label(i, column))
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }

    /// Finite numeric value of a cell.
    pub fn numeric(&self, row: usize, column: &str) -> Result<f64, ColumnError> {
        let cell = self.rows[row].get(column).unwrap_or(&CellValue::Null);
        cell.as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ColumnError::NotNumeric {
                row,
                column: column.to_string(),
                value: cell.to_string(),
            })
    }

    /// Pair every row's group label with its numeric value.
    pub fn observations(
        &self,
        group_column: &str,
        value_column: &str,
    ) -> Result<Vec<Observation>, ColumnError> {
        self.require_column(group_column)?;
        self.require_column(value_column)?;
        (0..self.rows.len())
            .map(|i| {
                Ok(Observation::new(
                    self.label(i, group_column),
                    self.numeric(i, value_column)?,
                ))
            })
            .collect()
    }

    /// New table holding only the given rows, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Table {
        let rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
        Table::from_rows(self.column_names.clone(), rows)
    }
}
