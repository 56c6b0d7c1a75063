use std::hash::Hash;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::series_colors;
use crate::data::chart::BarChartData;
use crate::data::profile::Histogram;

// ---------------------------------------------------------------------------
// Bar chart of the first two numeric columns
// ---------------------------------------------------------------------------

const BAR_WIDTH: f64 = 0.4;

/// Grouped bars: one pair per row, missing values leave a gap.
pub fn numeric_bar_chart(ui: &mut Ui, id: impl Hash, data: &BarChartData, height: f32) {
    let colors = series_colors(data.series.len());

    Plot::new(id)
        .legend(Legend::default())
        .height(height)
        .x_axis_label("Row")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (k, (series, color)) in data.series.iter().zip(colors).enumerate() {
                let offset = (k as f64 - 0.5) * BAR_WIDTH;
                let bars: Vec<Bar> = series
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(row, value)| {
                        value.map(|y| Bar::new(row as f64 + offset, y).width(BAR_WIDTH))
                    })
                    .collect();

                plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(color));
            }
        });
}

// ---------------------------------------------------------------------------
// Small histogram used in the report view
// ---------------------------------------------------------------------------

pub fn histogram(ui: &mut Ui, id: impl Hash, hist: &Histogram, color: Color32) {
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .zip(hist.edges.windows(2))
        .map(|(count, edge)| {
            let width = match edge[1] - edge[0] {
                w if w > 0.0 => w,
                _ => 1.0,
            };
            Bar::new((edge[0] + edge[1]) / 2.0, *count as f64).width(width * 0.95)
        })
        .collect();

    Plot::new(id)
        .height(110.0)
        .width(320.0)
        .show_axes([true, false])
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}
