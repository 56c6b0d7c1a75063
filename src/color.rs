use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting from blue so a single series gets a calm default.
pub fn series_colors(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = 215.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// CSS hex form, e.g. `#3b82f6`, for the HTML report.
pub fn hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_distinct_colors() {
        let colors = series_colors(2);
        assert_eq!(colors.len(), 2);
        assert_ne!(colors[0], colors[1]);
        assert!(series_colors(0).is_empty());
    }

    #[test]
    fn hex_is_lowercase_rgb() {
        assert_eq!(hex(Color32::from_rgb(255, 16, 0)), "#ff1000");
    }
}
