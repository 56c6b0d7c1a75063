use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Rows are deduplicated through `HashSet` and selections kept in `BTreeSet`,
/// so `CellValue` must be `Eq + Ord + Hash`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Spreadsheet date/time rendered as ISO-8601 text.
    Date(String),
}

// -- Manual Eq/Ord so we can put CellValue in ordered and hashed sets --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
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
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<NA>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell, used for statistics and charting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnType – explicit per-column type tag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Numeric,
    Text,
    Other,
}

impl ColumnType {
    /// Classify a column from its current cells.
    ///
    /// * any text cell → `Text` (mixed columns behave like object columns)
    /// * only integers / floats (ignoring missing) → `Numeric`
    /// * anything else, including all-missing columns → `Other`
    pub fn infer(values: &[CellValue]) -> Self {
        let mut saw_number = false;
        let mut saw_other = false;
        for v in values {
            match v {
                CellValue::Text(_) => return ColumnType::Text,
                CellValue::Integer(_) | CellValue::Float(_) => saw_number = true,
                CellValue::Null => {}
                CellValue::Bool(_) | CellValue::Date(_) => saw_other = true,
            }
        }
        if saw_number && !saw_other {
            ColumnType::Numeric
        } else {
            ColumnType::Other
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

/// One named column with its cells and cached type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
    kind: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let kind = ColumnType::infer(&values);
        Column {
            name: name.into(),
            values,
            kind,
        }
    }

    pub fn kind(&self) -> ColumnType {
        self.kind
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Present numeric values, skipping missing cells.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_f64).collect()
    }

    /// Distinct values in order of first appearance (missing included).
    pub fn distinct_values(&self) -> Vec<CellValue> {
        let mut seen = HashSet::new();
        self.values
            .iter()
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect()
    }

    /// Promote integers to floats when the column mixes both.
    pub(crate) fn unify_numeric(&mut self) {
        let has_float = self.values.iter().any(|v| matches!(v, CellValue::Float(_)));
        if !has_float {
            return;
        }
        for v in &mut self.values {
            if let CellValue::Integer(i) = v {
                *v = CellValue::Float(*i as f64);
            }
        }
    }

    /// Re-derive the type tag from the cells. A column left without cells
    /// keeps the tag it had.
    pub(crate) fn refresh_kind(&mut self) {
        if !self.values.is_empty() {
            self.kind = ColumnType::infer(&self.values);
        }
    }
}

/// An ordered, columnar table with uniquely named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns. Callers guarantee equal lengths and unique
    /// names (the loaders enforce both).
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        debug_assert!(columns.iter().all(|c| c.values.len() == n_rows));
        Table { columns, n_rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.columns[col].values[row]
    }

    /// Borrowed view of one row, in column order.
    pub fn row(&self, row: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[row]).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnType::Numeric)
    }

    pub fn text_columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns
            .iter_mut()
            .filter(|c| c.kind() == ColumnType::Text)
    }

    /// A copy of rows `[start, end)`, clamped to the table length.
    pub fn slice(&self, start: usize, end: usize) -> Table {
        let end = end.min(self.n_rows);
        let start = start.min(end);
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c.values[start..end].to_vec(),
                kind: c.kind,
            })
            .collect();
        Table {
            columns,
            n_rows: end - start,
        }
    }

    /// The first `n` rows (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> Table {
        self.slice(0, n)
    }

    /// The last `n` rows (fewer if the table is shorter).
    pub fn tail(&self, n: usize) -> Table {
        self.slice(self.n_rows.saturating_sub(n), self.n_rows)
    }

    /// Keep only rows whose mask entry is `true`.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.n_rows);
        for col in &mut self.columns {
            let mut mask = keep.iter();
            col.values.retain(|_| *mask.next().unwrap_or(&false));
        }
        self.n_rows = keep.iter().filter(|k| **k).count();
    }

    /// Recompute every column's type tag after cells changed.
    pub(crate) fn refresh_types(&mut self) {
        for col in &mut self.columns {
            col.refresh_kind();
        }
    }

    /// Mask marking rows that repeat an earlier row.
    pub fn duplicate_mask(&self) -> Vec<bool> {
        let mut seen = HashSet::with_capacity(self.n_rows);
        (0..self.n_rows).map(|i| !seen.insert(self.row(i))).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    /// The `name,age` table used across the data-layer tests.
    pub(crate) fn people() -> Table {
        Table::from_columns(vec![
            Column::new("name", vec![text("Alice"), text("Bob"), text("Alice")]),
            Column::new(
                "age",
                vec![CellValue::Integer(30), CellValue::Null, CellValue::Integer(30)],
            ),
        ])
    }

    #[test]
    fn column_types_are_inferred_from_cells() {
        assert_eq!(
            ColumnType::infer(&[CellValue::Integer(1), CellValue::Null, CellValue::Float(2.5)]),
            ColumnType::Numeric
        );
        assert_eq!(
            ColumnType::infer(&[CellValue::Integer(1), text("x")]),
            ColumnType::Text
        );
        assert_eq!(
            ColumnType::infer(&[CellValue::Bool(true), CellValue::Null]),
            ColumnType::Other
        );
        assert_eq!(
            ColumnType::infer(&[CellValue::Null, CellValue::Null]),
            ColumnType::Other
        );
    }

    #[test]
    fn head_and_tail_clamp_to_length() {
        let t = people();
        assert_eq!(t.head(7).len(), 3);
        assert_eq!(t.head(2).len(), 2);
        assert_eq!(t.tail(1).cell(0, 0), &text("Alice"));
        assert_eq!(t.tail(10), t);
    }

    #[test]
    fn duplicate_mask_flags_later_repeats_only() {
        assert_eq!(people().duplicate_mask(), vec![false, false, true]);
    }

    #[test]
    fn distinct_values_keep_first_appearance_order() {
        let t = people();
        let ages = t.column("age").map(Column::distinct_values);
        assert_eq!(ages, Some(vec![CellValue::Integer(30), CellValue::Null]));
    }

    #[test]
    fn nan_floats_compare_equal_to_themselves() {
        assert_eq!(CellValue::Float(f64::NAN), CellValue::Float(f64::NAN));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
    }
}
