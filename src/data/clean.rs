use std::sync::OnceLock;

use regex::Regex;

use super::error::TableWarning;
use super::model::{CellValue, ColumnType, Table};

// ---------------------------------------------------------------------------
// In-place cleaning transforms
// ---------------------------------------------------------------------------
//
// Every transform mutates the table it is given and leaves the column type
// tags up to date.

/// Drop rows that repeat an earlier row, keeping the first occurrence.
/// Returns the number of rows removed.
pub fn remove_duplicates(table: &mut Table) -> usize {
    let keep: Vec<bool> = table.duplicate_mask().iter().map(|dup| !dup).collect();
    let before = table.len();
    table.retain_rows(&keep);
    before - table.len()
}

/// Lowercase every text cell of every text column.
/// Returns the number of cells that changed.
pub fn lowercase_text(table: &mut Table) -> usize {
    let mut changed = 0;
    for column in table.text_columns_mut() {
        for value in &mut column.values {
            if let CellValue::Text(s) = value {
                let lower = s.to_lowercase();
                if lower != *s {
                    *s = lower;
                    changed += 1;
                }
            }
        }
    }
    changed
}

/// Replace missing cells of numeric columns with the column mean over the
/// values present right now. Filled columns become float columns.
///
/// Returns the number of cells filled, or a warning when the table has no
/// numeric column at all.
pub fn fill_missing_numeric(table: &mut Table) -> Result<usize, TableWarning> {
    if table.numeric_columns().next().is_none() {
        return Err(TableWarning::NoNumericColumns);
    }

    let mut filled = 0;
    for column in table.columns_mut() {
        if column.kind() != ColumnType::Numeric || column.missing_count() == 0 {
            continue;
        }
        let present = column.numbers();
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        for value in &mut column.values {
            if value.is_null() {
                *value = CellValue::Float(mean);
                filled += 1;
            }
        }
        column.unify_numeric();
        column.refresh_kind();
    }
    Ok(filled)
}

fn special_chars() -> &'static Regex {
    static SPECIAL: OnceLock<Regex> = OnceLock::new();
    SPECIAL.get_or_init(|| Regex::new(r"[^A-Za-z0-9 ]+").expect("valid regex"))
}

/// Remove every character outside `[A-Za-z0-9 ]` from text cells.
/// Returns the number of cells that changed.
pub fn strip_special_chars(table: &mut Table) -> usize {
    let re = special_chars();
    let mut changed = 0;
    for column in table.text_columns_mut() {
        for value in &mut column.values {
            if let CellValue::Text(s) = value {
                if re.is_match(s) {
                    *s = re.replace_all(s, "").into_owned();
                    changed += 1;
                }
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;
    use crate::data::model::tests::{people, text};
    use crate::data::model::Column;

    fn messy() -> Table {
        read_csv(
            "name,city,score,joined\n\
             Alice!,New-York,1.5,true\n\
             BOB,São Paulo,,false\n\
             Alice!,New-York,1.5,true\n\
             carol,L.A.,4,\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn remove_duplicates_keeps_first_and_is_idempotent() {
        let mut t = messy();
        assert_eq!(remove_duplicates(&mut t), 1);
        assert_eq!(t.len(), 3);
        assert_eq!(t.cell(2, 0), &text("carol"));

        let once = t.clone();
        assert_eq!(remove_duplicates(&mut t), 0);
        assert_eq!(t, once);
    }

    #[test]
    fn missing_values_count_as_equal_for_duplicates() {
        let mut t = read_csv(b"a,b\n1,\n1,\n").unwrap();
        assert_eq!(remove_duplicates(&mut t), 1);
    }

    #[test]
    fn lowercase_is_idempotent_and_leaves_other_columns() {
        let mut t = messy();
        assert!(lowercase_text(&mut t) > 0);
        assert_eq!(t.cell(1, 0), &text("bob"));
        assert_eq!(t.cell(1, 1), &text("são paulo"));
        assert_eq!(t.cell(0, 3), &CellValue::Bool(true));

        let once = t.clone();
        assert_eq!(lowercase_text(&mut t), 0);
        assert_eq!(t, once);
    }

    #[test]
    fn fill_missing_uses_mean_of_present_values() {
        let mut t = messy();
        assert_eq!(fill_missing_numeric(&mut t), Ok(1));
        let mean = (1.5 + 1.5 + 4.0) / 3.0;
        assert_eq!(t.cell(1, 2), &CellValue::Float(mean));
        // bool column is not numeric and keeps its gap
        assert_eq!(t.cell(3, 3), &CellValue::Null);
    }

    #[test]
    fn fill_missing_without_gaps_changes_nothing() {
        let mut t = read_csv(b"a,b\n1,x\n2,y\n").unwrap();
        let before = t.clone();
        assert_eq!(fill_missing_numeric(&mut t), Ok(0));
        assert_eq!(t, before);
    }

    #[test]
    fn fill_missing_warns_without_numeric_columns() {
        let mut t = read_csv(b"a,b\nx,\ny,z\n").unwrap();
        let before = t.clone();
        assert_eq!(
            fill_missing_numeric(&mut t),
            Err(TableWarning::NoNumericColumns)
        );
        assert_eq!(t, before);
    }

    #[test]
    fn filled_integer_column_becomes_float() {
        let mut t = people();
        fill_missing_numeric(&mut t).unwrap();
        let age = t.column("age").unwrap();
        assert_eq!(age.kind(), ColumnType::Numeric);
        assert!(age.values.iter().all(|v| *v == CellValue::Float(30.0)));
    }

    #[test]
    fn strip_leaves_only_alphanumerics_and_spaces() {
        let mut t = messy();
        strip_special_chars(&mut t);
        for column in t.columns().iter().filter(|c| c.kind() == ColumnType::Text) {
            for value in &column.values {
                if let Some(s) = value.as_text() {
                    assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == ' '), "{s}");
                }
            }
        }
        assert_eq!(t.cell(0, 1), &text("NewYork"));
        assert_eq!(t.cell(1, 1), &text("So Paulo"));

        let once = t.clone();
        assert_eq!(strip_special_chars(&mut t), 0);
        assert_eq!(t, once);
    }

    #[test]
    fn strip_ignores_non_text_cells_in_mixed_columns() {
        let mut t = Table::from_columns(vec![Column::new(
            "mixed",
            vec![text("a-b"), CellValue::Float(-1.5), CellValue::Null],
        )]);
        assert_eq!(strip_special_chars(&mut t), 1);
        assert_eq!(t.cell(0, 0), &text("ab"));
        assert_eq!(t.cell(1, 0), &CellValue::Float(-1.5));
    }
}
