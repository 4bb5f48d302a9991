//! Display-ready projection of query results

use serde::Serialize;

use crate::engine::{Row, Value};

/// Rows laid out against a fixed column list.
///
/// A `None` cell means the row had no value under that column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<Value>>>,
    /// The engine stopped collecting rows at its limit
    #[serde(skip)]
    pub truncated: bool,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Project rows onto the first row's columns.
///
/// Later rows are read against that column set only: keys they lack become
/// `None`, keys the first row lacks are dropped.
pub fn project(rows: &[Row]) -> ResultTable {
    let Some(first) = rows.first() else {
        return ResultTable::default();
    };

    let columns: Vec<String> = first.keys().map(str::to_string).collect();
    let rows = rows
        .iter()
        .map(|row| columns.iter().map(|c| row.get(c).cloned()).collect())
        .collect();

    ResultTable {
        columns,
        rows,
        truncated: false,
    }
}
