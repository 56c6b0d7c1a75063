use std::fmt;

use super::chart::{self, BarChartData};
use super::clean;
use super::error::{TableResult, TableWarning};
use super::export::{self, ExportedFile};
use super::filter::{self, ColumnSelection};
use super::loader;
use super::model::Table;
use super::profile::{self, ProfileOptions, ProfileReport};
use super::summary::{self, SummaryReport};
use super::upload::{FileFormat, UploadedFile};

// ---------------------------------------------------------------------------
// Operation history
// ---------------------------------------------------------------------------

/// An action applied to a session, recorded in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    RemoveDuplicates { removed: usize },
    Lowercase { changed: usize },
    FillMissing { filled: usize },
    StripSpecialChars { changed: usize },
    Filter { column: String, removed: usize },
    Profiled,
    Visualized,
    Exported { file_name: String },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::RemoveDuplicates { removed } => {
                write!(f, "Removed duplicates ({removed} rows)")
            }
            Operation::Lowercase { changed } => write!(f, "Lowercased text ({changed} cells)"),
            Operation::FillMissing { filled } => {
                write!(f, "Filled missing numbers ({filled} cells)")
            }
            Operation::StripSpecialChars { changed } => {
                write!(f, "Stripped special characters ({changed} cells)")
            }
            Operation::Filter { column, removed } => {
                write!(f, "Filtered on '{column}' ({removed} rows removed)")
            }
            Operation::Profiled => write!(f, "Generated report"),
            Operation::Visualized => write!(f, "Charted numeric columns"),
            Operation::Exported { file_name } => write!(f, "Exported {file_name}"),
        }
    }
}

/// Result of a cleaning action as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(String),
    Warning(TableWarning),
}

/// A rendered report tagged with the table revision it describes.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub revision: u64,
    pub report: ProfileReport,
    pub html: String,
}

// ---------------------------------------------------------------------------
// TableSession – one uploaded file and its working table
// ---------------------------------------------------------------------------

/// Owns the working table of one uploaded file. Every action runs against
/// the latest table state, in the order it is triggered.
#[derive(Debug, Clone)]
pub struct TableSession {
    upload: UploadedFile,
    table: Table,
    history: Vec<Operation>,
    /// Bumped whenever the table contents change.
    revision: u64,
}

impl TableSession {
    /// Parse the upload. Unsupported or malformed files fail here and no
    /// session is created.
    pub fn open(upload: UploadedFile) -> TableResult<Self> {
        let table = loader::load(&upload)?;
        Ok(TableSession {
            upload,
            table,
            history: Vec::new(),
            revision: 0,
        })
    }

    pub fn upload(&self) -> &UploadedFile {
        &self.upload
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn history(&self) -> &[Operation] {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn preview(&self, rows: usize) -> Table {
        self.table.head(rows)
    }

    pub fn summarize(&self) -> SummaryReport {
        summary::summarize(&self.table)
    }

    fn record(&mut self, op: Operation, changed: bool) {
        log::info!("{}: {op}", self.upload.name);
        if changed {
            self.revision += 1;
        }
        self.history.push(op);
    }

    pub fn remove_duplicates(&mut self) -> Outcome {
        let removed = clean::remove_duplicates(&mut self.table);
        self.record(Operation::RemoveDuplicates { removed }, removed > 0);
        Outcome::Success(format!("Duplicates removed ({removed} rows)."))
    }

    pub fn lowercase_text(&mut self) -> Outcome {
        let changed = clean::lowercase_text(&mut self.table);
        self.record(Operation::Lowercase { changed }, changed > 0);
        Outcome::Success("Text columns converted to lowercase.".to_string())
    }

    pub fn fill_missing(&mut self) -> Outcome {
        match clean::fill_missing_numeric(&mut self.table) {
            Ok(filled) => {
                self.record(Operation::FillMissing { filled }, filled > 0);
                Outcome::Success(format!("Missing values filled ({filled} cells)."))
            }
            Err(warning) => {
                log::warn!("{}: {warning}", self.upload.name);
                Outcome::Warning(warning)
            }
        }
    }

    pub fn strip_special_chars(&mut self) -> Outcome {
        let changed = clean::strip_special_chars(&mut self.table);
        self.record(Operation::StripSpecialChars { changed }, changed > 0);
        Outcome::Success("Special characters removed.".to_string())
    }

    /// Narrow the table to the selected values. Returns rows removed.
    pub fn apply_filter(&mut self, selection: &ColumnSelection) -> TableResult<usize> {
        let removed = filter::apply_selection(&mut self.table, selection)?;
        self.record(
            Operation::Filter {
                column: selection.column.clone(),
                removed,
            },
            removed > 0,
        );
        Ok(removed)
    }

    /// Build and render the profiling report for the current table.
    pub fn profile(&mut self, options: &ProfileOptions) -> TableResult<RenderedReport> {
        let report = ProfileReport::build(&self.table, options);
        let html = profile::render_report(&report, &self.upload.name, options)?;
        self.record(Operation::Profiled, false);
        Ok(RenderedReport {
            revision: self.revision,
            report,
            html,
        })
    }

    pub fn visualize(&mut self) -> Result<BarChartData, TableWarning> {
        match chart::bar_chart_data(&self.table) {
            Ok(data) => {
                self.record(Operation::Visualized, false);
                Ok(data)
            }
            Err(warning) => {
                log::warn!("{}: {warning}", self.upload.name);
                Err(warning)
            }
        }
    }

    pub fn export(&mut self, format: FileFormat) -> TableResult<ExportedFile> {
        let file = export::export(&self.table, &self.upload, format)?;
        self.record(
            Operation::Exported {
                file_name: file.file_name.clone(),
            },
            false,
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::TableError;
    use crate::data::model::CellValue;

    fn open(name: &str, content: &str) -> TableSession {
        TableSession::open(UploadedFile::new(name, content.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn dedupe_then_fill_uses_mean_of_remaining_rows() {
        let mut s = open("people.csv", "name,age\nAlice,30\nBob,\nAlice,30\n");
        s.remove_duplicates();
        assert_eq!(s.table().len(), 2);

        assert!(matches!(s.fill_missing(), Outcome::Success(_)));
        assert_eq!(s.table().cell(1, 1), &CellValue::Float(30.0));

        let out = s.export(FileFormat::Csv).unwrap();
        assert_eq!(
            String::from_utf8(out.bytes).unwrap(),
            "name,age\nAlice,30.0\nBob,30.0\n"
        );
        assert_eq!(s.revision(), 2);
    }

    #[test]
    fn unsupported_upload_creates_no_session() {
        let txt = TableSession::open(UploadedFile::new("notes.txt", b"a\n1\n".to_vec()));
        assert!(matches!(txt, Err(TableError::UnsupportedFormat(_))));

        // another upload is unaffected
        let csv = open("ok.csv", "a\n1\n");
        assert_eq!(csv.table().len(), 1);
    }

    #[test]
    fn visualize_with_one_numeric_column_warns() {
        let mut s = open("one.csv", "name,n\nx,1\ny,2\n");
        let before = s.table().clone();
        assert_eq!(
            s.visualize(),
            Err(TableWarning::NotEnoughNumericColumns { found: 1 })
        );
        assert_eq!(s.table(), &before);
        assert!(s.history().is_empty());
    }

    #[test]
    fn fill_without_numeric_columns_is_a_warning() {
        let mut s = open("text.csv", "a\nx\n\n");
        assert_eq!(
            s.fill_missing(),
            Outcome::Warning(TableWarning::NoNumericColumns)
        );
    }

    #[test]
    fn repeated_exports_are_byte_identical() {
        let mut s = open("ab.csv", "A,B\n1,x\n2,y\n");
        let first = s.export(FileFormat::Csv).unwrap();
        let xlsx = s.export(FileFormat::Xlsx).unwrap();
        let second = s.export(FileFormat::Csv).unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(xlsx.file_name, "ab.xlsx");
        assert_eq!(s.revision(), 0);
    }

    #[test]
    fn history_records_actions_in_order() {
        let mut s = open("h.csv", "a,b\nX,1\nY,2\n");
        s.lowercase_text();
        let mut sel = ColumnSelection::all(s.table(), "a").unwrap();
        sel.toggle(&CellValue::Text("y".into()));
        assert_eq!(s.apply_filter(&sel).unwrap(), 1);

        assert_eq!(
            s.history(),
            &[
                Operation::Lowercase { changed: 2 },
                Operation::Filter {
                    column: "a".into(),
                    removed: 1
                },
            ]
        );
        assert_eq!(s.history()[1].to_string(), "Filtered on 'a' (1 rows removed)");
    }

    #[test]
    fn profile_is_tagged_with_current_revision() {
        let mut s = open("p.csv", "a,b\n1,2\n1,2\n");
        s.remove_duplicates();
        let rendered = s.profile(&ProfileOptions::default()).unwrap();
        assert_eq!(rendered.revision, s.revision());
        assert_eq!(rendered.report.overview.rows, 1);
        assert!(rendered.html.contains("p.csv"));
    }
}
