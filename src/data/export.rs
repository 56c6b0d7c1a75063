use rust_xlsxwriter::{Workbook, XlsxError};

use super::error::{TableError, TableResult};
use super::model::{CellValue, Table};
use super::upload::{FileFormat, UploadedFile};

// ---------------------------------------------------------------------------
// Convert & export
// ---------------------------------------------------------------------------

/// An in-memory export ready to be saved by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub file_name: String,
    pub format: FileFormat,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Serialize `table` into `format`, naming the result after the uploaded
/// file's base name. Never modifies the table.
pub fn export(
    table: &Table,
    source: &UploadedFile,
    format: FileFormat,
) -> TableResult<ExportedFile> {
    let bytes = match format {
        FileFormat::Csv => write_csv(table)?,
        FileFormat::Xlsx => write_xlsx(table)?,
    };
    let file_name = format!("{}.{}", source.base_name(), format.extension());
    log::info!("Exported {} ({} bytes)", file_name, bytes.len());
    Ok(ExportedFile {
        file_name,
        format,
        bytes,
    })
}

fn csv_field(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Header row, then one record per row. Missing cells are empty fields.
pub fn write_csv(table: &Table) -> TableResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for row in 0..table.len() {
        writer.write_record(table.row(row).into_iter().map(csv_field))?;
    }
    writer
        .into_inner()
        .map_err(|e| TableError::Io(e.into_error()))
}

/// One worksheet with a header row. Missing cells stay blank.
pub fn write_xlsx(table: &Table) -> TableResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (c, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string(0, col, column.name.as_str())?;

        for (r, value) in column.values.iter().enumerate() {
            let row = u32::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            match value {
                CellValue::Null => {}
                CellValue::Bool(b) => {
                    sheet.write_boolean(row, col, *b)?;
                }
                CellValue::Integer(i) => {
                    sheet.write_number(row, col, *i as f64)?;
                }
                CellValue::Float(f) if f.is_finite() => {
                    sheet.write_number(row, col, *f)?;
                }
                CellValue::Float(f) => {
                    sheet.write_string(row, col, f.to_string())?;
                }
                CellValue::Text(s) | CellValue::Date(s) => {
                    sheet.write_string(row, col, s.as_str())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load, read_csv, read_xlsx};
    use crate::data::model::tests::text;

    fn sample() -> Table {
        read_csv(b"A,B,when\nx,1.25,2024\ny,,\nz z,-3.5,1999\n").unwrap()
    }

    #[test]
    fn csv_round_trip_preserves_values_and_order() {
        let t = sample();
        let reloaded = read_csv(&write_csv(&t).unwrap()).unwrap();
        assert_eq!(reloaded, t);
    }

    #[test]
    fn xlsx_round_trip_preserves_values_and_order() {
        let t = sample();
        let reloaded = read_xlsx(&write_xlsx(&t).unwrap()).unwrap();
        assert_eq!(reloaded.column_names(), t.column_names());
        assert_eq!(reloaded, t);
    }

    #[test]
    fn floats_keep_a_fractional_part() {
        let t = read_csv(b"v\n30.0\n0.1\n").unwrap();
        assert_eq!(write_csv(&t).unwrap(), b"v\n30.0\n0.1\n".to_vec());
    }

    #[test]
    fn export_names_file_after_source_and_sets_mime() {
        let upload = UploadedFile::new("report.2024.xlsx", Vec::<u8>::new());
        let t = sample();

        let csv = export(&t, &upload, FileFormat::Csv).unwrap();
        assert_eq!(csv.file_name, "report.2024.csv");
        assert_eq!(csv.mime_type(), "text/csv");

        let xlsx = export(&t, &upload, FileFormat::Xlsx).unwrap();
        assert_eq!(xlsx.file_name, "report.2024.xlsx");
        assert_eq!(
            xlsx.mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn export_is_a_pure_read() {
        let upload = UploadedFile::new("ab.csv", Vec::<u8>::new());
        let t = sample();
        let before = t.clone();

        let first = export(&t, &upload, FileFormat::Csv).unwrap();
        export(&t, &upload, FileFormat::Xlsx).unwrap();
        let second = export(&t, &upload, FileFormat::Csv).unwrap();

        assert_eq!(first.bytes, second.bytes);
        assert_eq!(t, before);
    }

    #[test]
    fn exported_csv_loads_back_through_load() {
        let upload = UploadedFile::new("people.xlsx", Vec::<u8>::new());
        let t = sample();
        let out = export(&t, &upload, FileFormat::Csv).unwrap();
        let reloaded = load(&UploadedFile::new(out.file_name, out.bytes)).unwrap();
        assert_eq!(reloaded.cell(2, 0), &text("z z"));
        assert_eq!(reloaded, t);
    }
}
