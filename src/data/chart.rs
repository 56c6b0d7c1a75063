use super::error::TableWarning;
use super::model::Table;

/// One bar series: a column name and its per-row values (`None` = missing).
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Grouped bar chart over the first two numeric columns, indexed by row.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartData {
    pub series: [BarSeries; 2],
}

/// Build chart data from the first two numeric columns, or warn when the
/// table has fewer than two.
pub fn bar_chart_data(table: &Table) -> Result<BarChartData, TableWarning> {
    let numeric: Vec<BarSeries> = table
        .numeric_columns()
        .take(2)
        .map(|c| BarSeries {
            name: c.name.clone(),
            values: c.values.iter().map(|v| v.as_f64()).collect(),
        })
        .collect();

    match <[BarSeries; 2]>::try_from(numeric) {
        Ok(series) => Ok(BarChartData { series }),
        Err(found) => Err(TableWarning::NotEnoughNumericColumns { found: found.len() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    #[test]
    fn first_two_numeric_columns_are_charted() {
        let t = read_csv(b"name,a,b,c\nx,1,2.5,9\ny,,3,9\n").unwrap();
        let chart = bar_chart_data(&t).unwrap();
        assert_eq!(chart.series[0].name, "a");
        assert_eq!(chart.series[0].values, vec![Some(1.0), None]);
        assert_eq!(chart.series[1].name, "b");
        assert_eq!(chart.series[1].values, vec![Some(2.5), Some(3.0)]);
    }

    #[test]
    fn one_numeric_column_warns_and_leaves_table_alone() {
        let t = read_csv(b"name,a\nx,1\n").unwrap();
        let before = t.clone();
        assert_eq!(
            bar_chart_data(&t),
            Err(TableWarning::NotEnoughNumericColumns { found: 1 })
        );
        assert_eq!(t, before);
    }
}
