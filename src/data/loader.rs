use std::collections::HashSet;
use std::io::Cursor;

use calamine::{Data, DataType, Reader, Xlsx};

use super::error::{TableError, TableResult};
use super::model::{CellValue, Column, Table};
use super::upload::{FileFormat, UploadedFile};

/// Field values read as missing, matching the pandas reader defaults.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded file into a [`Table`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row, comma separated, column types inferred
/// * `.xlsx` – first worksheet, first row is the header
pub fn load(upload: &UploadedFile) -> TableResult<Table> {
    let table = match upload.format()? {
        FileFormat::Csv => read_csv(&upload.bytes)?,
        FileFormat::Xlsx => read_xlsx(&upload.bytes)?,
    };
    log::info!(
        "Loaded {}: {} rows x {} columns",
        upload.name,
        table.len(),
        table.width()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Read CSV bytes. Short rows are padded with missing values; rows longer
/// than the header are rejected.
pub fn read_csv(bytes: &[u8]) -> TableResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(TableError::Empty);
    }
    let width = headers.len();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); width];
    for result in reader.records() {
        let record = result?;
        if record.len() > width {
            return Err(TableError::Malformed {
                line: record.position().map_or(0, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        for (i, col) in raw.iter_mut().enumerate() {
            col.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = unique_headers(headers)
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(&cells)))
        .collect();
    Ok(Table::from_columns(columns))
}

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

/// Column-level type inference: the narrowest type every present value
/// parses as wins (integer, then float, then bool), otherwise text.
fn infer_column(raw: &[String]) -> Vec<CellValue> {
    parse_all(raw, |s| s.trim().parse::<i64>().ok().map(CellValue::Integer))
        .or_else(|| parse_all(raw, |s| s.trim().parse::<f64>().ok().map(CellValue::Float)))
        .or_else(|| parse_all(raw, parse_bool))
        .unwrap_or_else(|| {
            raw.iter()
                .map(|s| {
                    if is_na(s) {
                        CellValue::Null
                    } else {
                        CellValue::Text(s.clone())
                    }
                })
                .collect()
        })
}

/// Parse every present value with `parse`, failing if any value does not fit.
/// An all-missing column never "fits" a typed parse and falls through to nulls.
fn parse_all(
    raw: &[String],
    parse: impl Fn(&str) -> Option<CellValue>,
) -> Option<Vec<CellValue>> {
    let mut any_present = false;
    let values = raw
        .iter()
        .map(|s| {
            if is_na(s) {
                Some(CellValue::Null)
            } else {
                any_present = true;
                parse(s)
            }
        })
        .collect::<Option<Vec<_>>>()?;
    any_present.then_some(values)
}

fn parse_bool(s: &str) -> Option<CellValue> {
    match s.trim() {
        "true" | "True" | "TRUE" => Some(CellValue::Bool(true)),
        "false" | "False" | "FALSE" => Some(CellValue::Bool(false)),
        _ => None,
    }
}

/// Make header names unique: blanks become `Unnamed: {i}`, repeats get a
/// `.1`, `.2`, ... suffix.
fn unique_headers(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut used = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut n = 0;
            while used.contains(&candidate) {
                n += 1;
                candidate = format!("{base}.{n}");
            }
            used.insert(candidate.clone());
            candidate
        })
        .collect()
}

// ---------------------------------------------------------------------------
// XLSX reader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an `.xlsx` workbook.
pub fn read_xlsx(bytes: &[u8]) -> TableResult<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(calamine::Error::Xlsx)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(calamine::Error::Xlsx)?,
        None => return Err(TableError::Empty),
    };

    let mut rows = range.rows();
    let header = rows.next().ok_or(TableError::Empty)?;
    let names = unique_headers(header.iter().map(|cell| match sheet_cell(cell) {
        CellValue::Null => String::new(),
        CellValue::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
        other => other.to_string(),
    }));

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (i, col) in cells.iter_mut().enumerate() {
            col.push(row.get(i).map_or(CellValue::Null, sheet_cell));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| {
            let mut column = Column::new(name, integral_to_integer(values));
            column.unify_numeric();
            column.refresh_kind();
            column
        })
        .collect();
    Ok(Table::from_columns(columns))
}

fn sheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if is_na(s) => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => cell
            .as_datetime()
            .map_or(CellValue::Null, |dt| CellValue::Date(dt.to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

/// Spreadsheets store every number as a float; a column whose numbers are
/// all whole reads back as integers.
fn integral_to_integer(values: Vec<CellValue>) -> Vec<CellValue> {
    let all_integral = values.iter().all(|v| match v {
        CellValue::Null | CellValue::Integer(_) => true,
        CellValue::Float(f) => f.fract() == 0.0 && f.abs() < i64::MAX as f64,
        _ => false,
    });
    if !all_integral {
        return values;
    }
    values
        .into_iter()
        .map(|v| match v {
            CellValue::Float(f) => CellValue::Integer(f as i64),
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::text;
    use crate::data::model::ColumnType;

    #[test]
    fn csv_columns_are_typed_per_column() {
        let t = read_csv(b"id,price,flag,label\n1,2.5,true,x\n2,3,False,7\n").unwrap();
        let kinds: Vec<ColumnType> = t.columns().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnType::Numeric,
                ColumnType::Numeric,
                ColumnType::Other,
                ColumnType::Text
            ]
        );
        assert_eq!(t.cell(1, 1), &CellValue::Float(3.0));
        assert_eq!(t.cell(1, 2), &CellValue::Bool(false));
        // a numeric-looking value in a text column stays text
        assert_eq!(t.cell(1, 3), &text("7"));
    }

    #[test]
    fn na_tokens_become_missing() {
        let t = read_csv(b"a,b\n1,NA\nn/a,x\n,null\n").unwrap();
        assert_eq!(t.column("a").map(Column::missing_count), Some(2));
        assert_eq!(t.column("b").map(Column::missing_count), Some(2));
        assert_eq!(t.column("a").map(Column::kind), Some(ColumnType::Numeric));
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let t = read_csv(b"a,b,c\n1,2\n").unwrap();
        assert_eq!(t.cell(0, 2), &CellValue::Null);

        let err = read_csv(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(
            err,
            TableError::Malformed {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn empty_input_has_no_columns() {
        assert!(matches!(read_csv(b""), Err(TableError::Empty)));
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let t = read_csv(b"a,a,,a\n1,2,3,4\n").unwrap();
        assert_eq!(t.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn load_rejects_txt_uploads() {
        let upload = UploadedFile::new("notes.txt", b"a,b\n1,2\n".to_vec());
        assert!(matches!(load(&upload), Err(TableError::UnsupportedFormat(_))));
    }

    #[test]
    fn load_dispatches_csv() {
        let upload = UploadedFile::new("people.CSV", b"name,age\nAlice,30\n".to_vec());
        let t = load(&upload).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.cell(0, 1), &CellValue::Integer(30));
    }

    #[test]
    fn garbage_xlsx_is_a_recoverable_error() {
        let upload = UploadedFile::new("broken.xlsx", b"not a zip".to_vec());
        assert!(matches!(load(&upload), Err(TableError::Excel(_))));
    }

    #[test]
    fn integral_sheet_numbers_become_integers() {
        let values = integral_to_integer(vec![
            CellValue::Float(1.0),
            CellValue::Null,
            CellValue::Float(3.0),
        ]);
        assert_eq!(
            values,
            vec![CellValue::Integer(1), CellValue::Null, CellValue::Integer(3)]
        );
        let mixed = integral_to_integer(vec![CellValue::Float(1.5), CellValue::Float(2.0)]);
        assert_eq!(mixed, vec![CellValue::Float(1.5), CellValue::Float(2.0)]);
    }
}
