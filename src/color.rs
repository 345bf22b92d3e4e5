use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_color(hue, 0.75, 0.55)
        })
        .collect()
}

fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Continuous maps for heatmap / contour rendering
// ---------------------------------------------------------------------------

/// Sequential map for contour levels: sweep hue from deep blue to yellow
/// as `t` goes 0 → 1.
pub fn sequential(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    hsl_color(240.0 - 180.0 * t, 0.70, 0.30 + 0.35 * t)
}

/// Diverging map for correlations: blue at -1, white at 0, red at +1.
/// NaN (degenerate pair) renders gray.
pub fn diverging(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::GRAY;
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    if t < 0.0 {
        let s = -t;
        hsl_color(220.0, 0.70, 0.95 - 0.50 * s)
    } else {
        hsl_color(5.0, 0.75, 0.95 - 0.50 * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_hues() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        assert_ne!(colors[0], colors[3]);
    }

    #[test]
    fn diverging_endpoints_and_nan() {
        assert_eq!(diverging(f64::NAN), Color32::GRAY);
        // Zero correlation is near-white; extremes are saturated.
        let mid = diverging(0.0);
        assert!(mid.r() > 220 && mid.g() > 220 && mid.b() > 220);
        assert_ne!(diverging(1.0), diverging(-1.0));
    }
}
