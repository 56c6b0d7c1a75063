use crate::data::profile::ProfileOptions;

// ---------------------------------------------------------------------------
// Application settings
// ---------------------------------------------------------------------------

/// Fixed tunables for the viewer. Logging is controlled through `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Rows shown in each file's preview.
    pub preview_rows: usize,
    /// Height of the inline report viewport, in points.
    pub report_height: f32,
    pub chart_height: f32,
    pub histogram_bins: usize,
    /// Rows shown at the head and tail of the report.
    pub report_sample_rows: usize,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_rows: 7,
            report_height: 1000.0,
            chart_height: 320.0,
            histogram_bins: 10,
            report_sample_rows: 10,
            window_size: [1280.0, 860.0],
            min_window_size: [640.0, 420.0],
        }
    }
}

impl Settings {
    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            histogram_bins: self.histogram_bins,
            sample_rows: self.report_sample_rows,
            accent: crate::color::hex(crate::color::series_colors(1)[0]),
            ..ProfileOptions::default()
        }
    }
}
