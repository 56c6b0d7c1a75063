use std::collections::HashMap;

use serde::Serialize;

use super::model::{CellValue, Column, ColumnType, Table};

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// `describe()`-style statistics for one numeric column.
/// Statistics are `None` when there are too few present values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Frequency statistics for a text or other non-numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<CellValue>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
    /// Missing cells per column, in column order.
    pub missing: Vec<(String, usize)>,
}

/// Compute the summary of the table as it stands now.
pub fn summarize(table: &Table) -> SummaryReport {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();
    for column in table.columns() {
        match column.kind() {
            ColumnType::Numeric => numeric.push(numeric_summary(column)),
            ColumnType::Text | ColumnType::Other => categorical.push(categorical_summary(column)),
        }
    }
    let missing = table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.missing_count()))
        .collect();

    SummaryReport {
        numeric,
        categorical,
        missing,
    }
}

pub(crate) fn numeric_summary(column: &Column) -> NumericSummary {
    let mut values = column.numbers();
    values.sort_by(f64::total_cmp);

    NumericSummary {
        column: column.name.clone(),
        count: values.len(),
        mean: mean(&values),
        std: std_dev(&values),
        min: values.first().copied(),
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

pub(crate) fn categorical_summary(column: &Column) -> CategoricalSummary {
    let counts = value_counts(column);
    let top = counts.first().map(|(v, n)| ((*v).clone(), *n));
    CategoricalSummary {
        column: column.name.clone(),
        count: column.values.len() - column.missing_count(),
        unique: counts.len(),
        freq: top.as_ref().map_or(0, |(_, n)| *n),
        top: top.map(|(v, _)| v),
    }
}

/// Present values with their frequency, most frequent first; ties keep the
/// order of first appearance.
pub(crate) fn value_counts(column: &Column) -> Vec<(&CellValue, usize)> {
    let mut index: HashMap<&CellValue, usize> = HashMap::new();
    let mut counts: Vec<(&CellValue, usize)> = Vec::new();
    for v in column.values.iter().filter(|v| !v.is_null()) {
        match index.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v, counts.len());
                counts.push((v, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1).
pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Linear-interpolation quantile over already sorted values.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;
    use crate::data::model::tests::text;

    #[test]
    fn numeric_columns_get_describe_statistics() {
        let t = read_csv(b"x,label\n1,a\n2,b\n3,a\n4,\n").unwrap();
        let report = summarize(&t);
        assert_eq!(report.numeric.len(), 1);

        let x = &report.numeric[0];
        assert_eq!(x.count, 4);
        assert_eq!(x.mean, Some(2.5));
        assert_eq!(x.min, Some(1.0));
        assert_eq!(x.q25, Some(1.75));
        assert_eq!(x.median, Some(2.5));
        assert_eq!(x.q75, Some(3.25));
        assert_eq!(x.max, Some(4.0));
        let std = x.std.unwrap();
        assert!((std - 1.290_994_448_735_805_6).abs() < 1e-12);
    }

    #[test]
    fn categorical_columns_report_top_value() {
        let t = read_csv(b"x,label\n1,a\n2,b\n3,a\n4,\n").unwrap();
        let label = &summarize(&t).categorical[0];
        assert_eq!(label.count, 3);
        assert_eq!(label.unique, 2);
        assert_eq!(label.top, Some(text("a")));
        assert_eq!(label.freq, 2);
    }

    #[test]
    fn missing_counts_follow_column_order() {
        let t = read_csv(b"b,a\n,1\n,\nz,3\n").unwrap();
        assert_eq!(
            summarize(&t).missing,
            vec![("b".to_string(), 2), ("a".to_string(), 1)]
        );
    }

    #[test]
    fn single_value_has_no_std() {
        let t = read_csv(b"x\n5\n").unwrap();
        let x = &summarize(&t).numeric[0];
        assert_eq!(x.std, None);
        assert_eq!(x.median, Some(5.0));
    }
}
