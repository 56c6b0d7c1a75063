use std::collections::BTreeSet;

use super::error::{TableError, TableResult};
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Row filter: which distinct values of one column are kept
// ---------------------------------------------------------------------------

/// A column name plus the set of its values to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    pub column: String,
    pub selected: BTreeSet<CellValue>,
}

impl ColumnSelection {
    /// A selection with every current distinct value of `column` chosen,
    /// i.e. a filter that keeps everything.
    pub fn all(table: &Table, column: &str) -> TableResult<Self> {
        let col = table
            .column(column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;
        Ok(ColumnSelection {
            column: column.to_string(),
            selected: col.distinct_values().into_iter().collect(),
        })
    }

    /// Toggle a single value in the selection.
    pub fn toggle(&mut self, value: &CellValue) {
        if !self.selected.remove(value) {
            self.selected.insert(value.clone());
        }
    }

    pub fn contains(&self, value: &CellValue) -> bool {
        self.selected.contains(value)
    }
}

/// Keep only rows whose value in the selected column is part of the
/// selection. Returns the number of rows removed.
///
/// Filters compose: each call narrows the table it is given, so a second
/// filter only ever sees rows that survived the first.
pub fn apply_selection(table: &mut Table, selection: &ColumnSelection) -> TableResult<usize> {
    let column = table
        .column(&selection.column)
        .ok_or_else(|| TableError::UnknownColumn(selection.column.clone()))?;

    let keep: Vec<bool> = column
        .values
        .iter()
        .map(|v| selection.contains(v))
        .collect();

    let before = table.len();
    table.retain_rows(&keep);
    table.refresh_types();
    Ok(before - table.len())
}
