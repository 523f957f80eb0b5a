use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// Value – a single cell in a participant table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Using `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        fn discriminant(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Integer(_) => 2,
                Value::Float(_) => 3,
                Value::String(_) => 4,
            }
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64`; non-numeric cells become NaN so they
    /// drop out with the other non-finite values.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Float(v) => *v,
            Value::Integer(i) => *i as f64,
            _ => f64::NAN,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Selection – the chosen subset of rows
// ---------------------------------------------------------------------------

/// Row identifiers (positions) of the selected participants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(pub Vec<usize>);

impl Selection {
    pub fn new(rows: impl IntoIterator<Item = usize>) -> Self {
        Selection(rows.into_iter().collect())
    }

    /// Select every row of a table with `n_rows` rows.
    pub fn all(n_rows: usize) -> Self {
        Selection((0..n_rows).collect())
    }

    pub fn rows(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Selection(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Column – one named attribute
// ---------------------------------------------------------------------------

/// A named column; row identifiers are the positions `0..len`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Restrict the column to the selected rows, in selection order.
    pub fn select(&self, selection: &Selection) -> Result<Column> {
        let values = selection
            .rows()
            .iter()
            .map(|&row| {
                self.values
                    .get(row)
                    .cloned()
                    .ok_or(PlotError::InvalidSelection {
                        row,
                        len: self.values.len(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Column {
            name: self.name.clone(),
            values,
        })
    }

    /// Numeric view of the column (NaN for non-numeric cells).
    pub fn as_f64(&self) -> Vec<f64> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Finite numeric values only.
    pub fn finite_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(Value::as_f64)
            .filter(|v| v.is_finite())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete participant pool
// ---------------------------------------------------------------------------

/// A table of equally long named columns with pre-computed unique values.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    /// Ordered list of column names.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<Value>>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        if let Some(col) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(PlotError::ColumnLengthMismatch {
                column: col.name.clone(),
                len: col.len(),
                expected: n_rows,
            });
        }
        Ok(Self::build(columns, n_rows))
    }

    fn build(columns: Vec<Column>, n_rows: usize) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();
        for col in &columns {
            unique_values
                .entry(col.name.clone())
                .or_default()
                .extend(col.values.iter().cloned());
        }
        let column_names = columns.iter().map(|c| c.name.clone()).collect();
        Table {
            columns,
            column_names,
            unique_values,
            n_rows,
        }
    }

    /// Build a table from rows of `column -> value` records.
    pub fn from_records(records: Vec<BTreeMap<String, Value>>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for rec in &records {
            for key in rec.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }
        let columns = names
            .into_iter()
            .map(|name| {
                let values = records
                    .iter()
                    .map(|rec| rec.get(&name).cloned().unwrap_or(Value::Null))
                    .collect();
                Column { name, values }
            })
            .collect();
        Table::build(columns, records.len())
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PlotError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_keeps_selection_order() {
        let col = Column::new("g", vec!["a".into(), "b".into(), "c".into()]);
        let sel = col.select(&Selection::new([2, 0])).unwrap();
        assert_eq!(sel.values, vec![Value::from("c"), Value::from("a")]);
        assert_eq!(sel.name, "g");
    }

    #[test]
    fn test_select_out_of_range() {
        let col = Column::new("g", vec!["a".into(), "b".into()]);
        let err = col.select(&Selection::new([0, 5])).unwrap_err();
        assert_eq!(err, PlotError::InvalidSelection { row: 5, len: 2 });
    }

    #[test]
    fn test_from_records_pads_missing_cells() {
        let mut r0 = BTreeMap::new();
        r0.insert("age".to_string(), Value::Integer(30));
        let mut r1 = BTreeMap::new();
        r1.insert("sex".to_string(), Value::from("F"));
        let table = Table::from_records(vec![r0, r1]);

        assert_eq!(table.len(), 2);
        let age = table.column("age").unwrap();
        assert_eq!(age.values, vec![Value::Integer(30), Value::Null]);
        assert!(table.unique_values["sex"].contains(&Value::Null));
    }

    #[test]
    fn test_unequal_columns_rejected() {
        let err = Table::from_columns(vec![
            Column::new("sex", vec!["F".into(), "M".into()]),
            Column::new("age", vec![Value::Integer(30)]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            PlotError::ColumnLengthMismatch {
                column: "age".into(),
                len: 1,
                expected: 2,
            }
        );
    }

    #[test]
    fn test_missing_column() {
        let table = Table::from_columns(vec![]).unwrap();
        assert!(table.is_empty());
        assert!(matches!(
            table.column("nope"),
            Err(PlotError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_value_ordering_groups_by_type() {
        let mut values = vec![
            Value::from("b"),
            Value::Float(1.5),
            Value::Null,
            Value::Integer(3),
            Value::from("a"),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Integer(3),
                Value::Float(1.5),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn test_finite_values_skip_nan_and_text() {
        let col = Column::new(
            "x",
            vec![
                Value::Float(1.0),
                Value::Float(f64::NAN),
                Value::Float(f64::INFINITY),
                Value::from("n/a"),
                Value::Integer(2),
            ],
        );
        assert_eq!(col.finite_values(), vec![1.0, 2.0]);
    }
}
