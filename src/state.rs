use crate::config::Settings;
use crate::data::chart::BarChartData;
use crate::data::error::TableWarning;
use crate::data::export::ExportedFile;
use crate::data::filter::ColumnSelection;
use crate::data::model::CellValue;
use crate::data::session::{Outcome, RenderedReport, TableSession};
use crate::data::summary::SummaryReport;
use crate::data::upload::{FileFormat, UploadedFile};

// ---------------------------------------------------------------------------
// Per-file UI state
// ---------------------------------------------------------------------------

/// A value derived from the table, remembered with the revision it was
/// computed for.
type Cached<T> = Option<(u64, T)>;

/// Everything shown for one uploaded file, independent of rendering.
pub struct FilePanel {
    pub session: TableSession,

    pub show_summary: bool,
    pub show_clean: bool,
    pub show_report: bool,
    pub show_chart: bool,

    /// Result of the last cleaning button.
    pub notice: Option<Outcome>,

    /// Pending row filter (column + chosen values), defaults to everything.
    /// Rebuilt whenever the table revision moves past `selection_revision`.
    selection: Option<ColumnSelection>,
    selection_revision: u64,
    pub filter_error: Option<String>,

    summary: Cached<SummaryReport>,
    chart: Cached<Result<BarChartData, TableWarning>>,
    pub report: Option<RenderedReport>,
    pub report_error: Option<String>,

    pub export_format: FileFormat,
    pub export: Option<ExportedFile>,
    pub export_error: Option<String>,
}

impl FilePanel {
    pub fn new(session: TableSession) -> Self {
        let mut panel = Self {
            session,
            show_summary: false,
            show_clean: false,
            show_report: false,
            show_chart: false,
            notice: None,
            selection: None,
            selection_revision: 0,
            filter_error: None,
            summary: None,
            chart: None,
            report: None,
            report_error: None,
            export_format: FileFormat::Csv,
            export: None,
            export_error: None,
        };
        if let Some(first) = panel.session.table().column_names().into_iter().next() {
            panel.select_filter_column(&first);
        }
        panel
    }

    pub fn name(&self) -> &str {
        &self.session.upload().name
    }

    /// Pick the filter column; every current value starts selected.
    pub fn select_filter_column(&mut self, column: &str) {
        self.selection = ColumnSelection::all(self.session.table(), column).ok();
        self.selection_revision = self.session.revision();
    }

    /// The pending filter, re-seeded with every current value of its column
    /// if the table changed since it was built.
    pub fn selection(&mut self) -> Option<&ColumnSelection> {
        self.sync_selection();
        self.selection.as_ref()
    }

    fn sync_selection(&mut self) {
        if self.selection_revision == self.session.revision() {
            return;
        }
        if let Some(col) = self.selection.as_ref().map(|s| s.column.clone()) {
            log::debug!("{}: table changed, resetting filter on '{col}'", self.name());
            self.select_filter_column(&col);
        }
    }

    pub fn toggle_filter_value(&mut self, value: &CellValue) {
        self.sync_selection();
        if let Some(sel) = &mut self.selection {
            sel.toggle(value);
        }
    }

    /// Select all values of the current filter column.
    pub fn select_all(&mut self) {
        if let Some(col) = self.selection.as_ref().map(|s| s.column.clone()) {
            self.select_filter_column(&col);
        }
    }

    /// Deselect all values of the current filter column.
    pub fn select_none(&mut self) {
        self.sync_selection();
        if let Some(sel) = &mut self.selection {
            sel.selected.clear();
        }
    }

    /// Apply the pending filter, then reset it to "everything" over the
    /// narrowed table.
    pub fn apply_filter(&mut self) {
        self.sync_selection();
        let Some(sel) = self.selection.clone() else {
            return;
        };
        match self.session.apply_filter(&sel) {
            Ok(removed) => {
                self.filter_error = None;
                self.notice = Some(Outcome::Success(format!(
                    "Filter applied, {removed} rows removed."
                )));
            }
            Err(e) => {
                log::error!("{}: filter failed: {e}", self.name());
                self.filter_error = Some(e.to_string());
            }
        }
        self.select_filter_column(&sel.column);
    }

    pub fn summary(&mut self) -> &SummaryReport {
        let revision = self.session.revision();
        if self.summary.as_ref().is_some_and(|(rev, _)| *rev != revision) {
            self.summary = None;
        }
        let session = &self.session;
        &self
            .summary
            .get_or_insert_with(|| (revision, session.summarize()))
            .1
    }

    /// Chart data for the first two numeric columns, or the reason there is
    /// none. Recomputed only after the table changes.
    pub fn chart(&mut self) -> &Result<BarChartData, TableWarning> {
        let revision = self.session.revision();
        if self.chart.as_ref().is_some_and(|(rev, _)| *rev != revision) {
            self.chart = None;
        }
        let session = &mut self.session;
        &self
            .chart
            .get_or_insert_with(|| (revision, session.visualize()))
            .1
    }

    /// Whether the stored report no longer matches the table.
    pub fn report_is_stale(&self) -> bool {
        self.report
            .as_ref()
            .is_some_and(|r| r.revision != self.session.revision())
    }

    /// Generate (or regenerate) the profiling report. Blocks until done.
    pub fn generate_report(&mut self, settings: &Settings) {
        match self.session.profile(&settings.profile_options()) {
            Ok(report) => {
                self.report = Some(report);
                self.report_error = None;
            }
            Err(e) => {
                log::error!("{}: report failed: {e}", self.name());
                self.report_error = Some(e.to_string());
            }
        }
    }

    pub fn convert(&mut self) {
        match self.session.export(self.export_format) {
            Ok(file) => {
                self.export = Some(file);
                self.export_error = None;
            }
            Err(e) => {
                log::error!("{}: export failed: {e}", self.name());
                self.export = None;
                self.export_error = Some(e.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// One panel per successfully loaded upload, in upload order.
    pub panels: Vec<FilePanel>,

    /// Uploads that could not be loaded: (file name, error message).
    pub rejected: Vec<(String, String)>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            panels: Vec::new(),
            rejected: Vec::new(),
            status_message: None,
        }
    }

    /// Load each upload independently; a failure only affects its own file.
    pub fn add_uploads(&mut self, uploads: impl IntoIterator<Item = UploadedFile>) {
        for upload in uploads {
            let name = upload.name.clone();
            match TableSession::open(upload) {
                Ok(session) => self.panels.push(FilePanel::new(session)),
                Err(e) => {
                    log::error!("Failed to load {name}: {e}");
                    self.rejected.push((name, e.to_string()));
                }
            }
        }
        self.status_message = None;
    }

    pub fn close_panel(&mut self, index: usize) {
        if index < self.panels.len() {
            let panel = self.panels.remove(index);
            log::info!("Closed {}", panel.name());
        }
    }

    pub fn clear_rejected(&mut self) {
        self.rejected.clear();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(name, content.as_bytes().to_vec())
    }

    #[test]
    fn bad_uploads_are_rejected_without_affecting_others() {
        let mut state = AppState::default();
        state.add_uploads([
            upload("a.csv", "x\n1\n"),
            upload("notes.txt", "hello"),
            upload("b.csv", "y\n2\n"),
        ]);
        assert_eq!(state.panels.len(), 2);
        assert_eq!(state.rejected.len(), 1);
        assert_eq!(state.rejected[0].0, "notes.txt");
        assert_eq!(state.rejected[0].1, "Unsupported file format: .txt");
    }

    #[test]
    fn filter_defaults_to_every_value_of_first_column() {
        let mut state = AppState::default();
        state.add_uploads([upload("c.csv", "city,n\nOslo,1\nRome,2\n")]);
        let panel = &state.panels[0];
        let sel = panel.selection.as_ref().unwrap();
        assert_eq!(sel.column, "city");
        assert_eq!(sel.selected.len(), 2);
    }

    #[test]
    fn applying_a_filter_resets_selection_to_remaining_values() {
        let mut state = AppState::default();
        state.add_uploads([upload("c.csv", "city,n\nOslo,1\nRome,2\nOslo,3\n")]);
        let panel = &mut state.panels[0];
        panel.toggle_filter_value(&CellValue::Text("Rome".into()));
        panel.apply_filter();

        assert_eq!(panel.session.table().len(), 2);
        let sel = panel.selection.as_ref().unwrap();
        assert_eq!(sel.selected.len(), 1);
        assert!(sel.contains(&CellValue::Text("Oslo".into())));
    }

    fn rows_after_default_filter(content: &str, clean: fn(&mut TableSession) -> Outcome) -> usize {
        let mut state = AppState::default();
        state.add_uploads([upload("g.csv", content)]);
        let panel = &mut state.panels[0];
        clean(&mut panel.session);
        panel.apply_filter();
        panel.session.table().len()
    }

    #[test]
    fn default_filter_keeps_every_row_after_lowercase() {
        assert_eq!(
            rows_after_default_filter("city,n\nOslo,1\nRome,2\n", TableSession::lowercase_text),
            2
        );
    }

    #[test]
    fn default_filter_keeps_every_row_after_fill() {
        assert_eq!(
            rows_after_default_filter("age,name\n30,Alice\n,Bob\n", TableSession::fill_missing),
            2
        );
    }

    #[test]
    fn default_filter_keeps_every_row_after_strip() {
        assert_eq!(
            rows_after_default_filter(
                "city,n\nNew-York,1\nL.A.,2\n",
                TableSession::strip_special_chars
            ),
            2
        );
    }

    #[test]
    fn default_filter_keeps_every_row_after_dedupe() {
        assert_eq!(
            rows_after_default_filter(
                "city,n\nOslo,1\nOslo,1\nRome,2\n",
                TableSession::remove_duplicates
            ),
            2
        );
    }

    #[test]
    fn selection_follows_cleaned_values() {
        let mut state = AppState::default();
        state.add_uploads([upload("h.csv", "city,n\nOslo,1\nRome,2\n")]);
        let panel = &mut state.panels[0];
        panel.toggle_filter_value(&CellValue::Text("Rome".into()));
        panel.session.lowercase_text();

        let sel = panel.selection().unwrap();
        assert_eq!(sel.selected.len(), 2);
        assert!(sel.contains(&CellValue::Text("oslo".into())));
        assert!(sel.contains(&CellValue::Text("rome".into())));
    }

    #[test]
    fn cached_summary_follows_table_changes() {
        let mut state = AppState::default();
        state.add_uploads([upload("d.csv", "n\n1\n1\n2\n")]);
        let panel = &mut state.panels[0];
        assert_eq!(panel.summary().numeric[0].count, 3);
        panel.session.remove_duplicates();
        assert_eq!(panel.summary().numeric[0].count, 2);
    }

    #[test]
    fn report_becomes_stale_after_cleaning() {
        let mut state = AppState::default();
        state.add_uploads([upload("e.csv", "n,m\n1,2\n1,2\n")]);
        let settings = state.settings.clone();
        let panel = &mut state.panels[0];
        panel.generate_report(&settings);
        assert!(panel.report.is_some());
        assert!(!panel.report_is_stale());

        panel.session.remove_duplicates();
        assert!(panel.report_is_stale());
    }

    #[test]
    fn cached_chart_follows_table_changes() {
        let mut state = AppState::default();
        state.add_uploads([upload("i.csv", "a,b\n1,2\n1,2\n")]);
        let panel = &mut state.panels[0];
        assert_eq!(panel.chart().as_ref().map(|c| c.series[0].values.len()), Ok(2));
        panel.session.remove_duplicates();
        assert_eq!(panel.chart().as_ref().map(|c| c.series[0].values.len()), Ok(1));
    }

    #[test]
    fn chart_warning_is_cached() {
        let mut state = AppState::default();
        state.add_uploads([upload("f.csv", "name,n\nx,1\n")]);
        let panel = &mut state.panels[0];
        assert!(panel.chart().is_err());
        assert!(panel.chart().is_err());
    }
}
