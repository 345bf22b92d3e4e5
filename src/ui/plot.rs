use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::analysis::contour::IsoSegment;
use crate::analysis::summary::CategoricalSummary;
use crate::analysis::transform::std_dev;
use crate::color::{diverging, generate_palette, sequential};
use crate::session::{ChartData, SessionState};

// ---------------------------------------------------------------------------
// Analysis tab (central panel)
// ---------------------------------------------------------------------------

/// Render the derived chart for the current selection.  All derivation
/// happens in the session; this module only encodes it visually.
pub fn analysis_view(ui: &mut Ui, state: &mut SessionState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to analyze  (File → Open data file…)");
        });
        return;
    }

    let Some(data) = state.derived_chart() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No chart data for the current selection.");
        });
        return;
    };

    match data {
        ChartData::GroupedScatter {
            x_label,
            y_label,
            title,
            frame,
        } => {
            ui.strong(title);
            let labels = frame.group_labels();
            let palette = generate_palette(labels.len());

            Plot::new("grouped_scatter")
                .legend(Legend::default())
                .x_axis_label(x_label)
                .y_axis_label(y_label)
                .show(ui, |plot_ui| {
                    for (label, color) in labels.iter().zip(palette) {
                        let points: PlotPoints = frame
                            .groups
                            .iter()
                            .enumerate()
                            .filter(|(_, g)| *g == label)
                            .map(|(row, _)| [frame.data[0][row], frame.data[1][row]])
                            .collect();
                        plot_ui.points(
                            Points::new(points).name(label).color(color).radius(4.0),
                        );
                    }
                });
        }

        ChartData::Distribution { series } => {
            let palette = generate_palette(series.len());
            Plot::new("distribution")
                .legend(Legend::default())
                .x_axis_label("value")
                .y_axis_label("density")
                .show(ui, |plot_ui| {
                    for ((name, values), color) in series.iter().zip(palette) {
                        let bars = histogram_bars(values, 30);
                        plot_ui.bar_chart(
                            BarChart::new(bars).name(name).color(color.gamma_multiply(0.5)),
                        );
                        let curve: PlotPoints = kde_points(values, 200).into();
                        plot_ui.line(Line::new(curve).name(name).color(color).width(2.0));
                    }
                });
        }

        ChartData::Heatmap(matrix) => {
            let n = matrix.len();
            ui.strong(format!("{} correlation", matrix.method.label()));
            Plot::new("correlation_heatmap")
                .data_aspect(1.0)
                .show_grid(false)
                .show(ui, |plot_ui| {
                    for i in 0..n {
                        for j in 0..n {
                            let value = matrix.values[i][j];
                            // Row 0 on top.
                            let (x, y) = (j as f64, (n - 1 - i) as f64);
                            let cell: PlotPoints = vec![
                                [x - 0.5, y - 0.5],
                                [x + 0.5, y - 0.5],
                                [x + 0.5, y + 0.5],
                                [x - 0.5, y + 0.5],
                            ]
                            .into();
                            plot_ui.polygon(
                                Polygon::new(cell)
                                    .fill_color(diverging(value))
                                    .stroke((1.0, Color32::WHITE)),
                            );
                            let label = if value.is_nan() {
                                "n/a".to_string()
                            } else {
                                format!("{value:.2}")
                            };
                            plot_ui.text(Text::new(
                                PlotPoint::new(x, y),
                                RichText::new(label).color(Color32::BLACK),
                            ));
                        }
                    }
                    // Column labels along the top, row labels on the left.
                    for (j, name) in matrix.columns.iter().enumerate() {
                        plot_ui.text(Text::new(
                            PlotPoint::new(j as f64, n as f64 - 0.3),
                            RichText::new(name.clone()).strong(),
                        ));
                        plot_ui.text(Text::new(
                            PlotPoint::new(-0.8, (n - 1 - j) as f64),
                            RichText::new(name.clone()).strong(),
                        ));
                    }
                });
        }

        ChartData::Contour {
            x_label,
            y_label,
            z_label,
            sample,
            value_range,
            grid_segments,
            tri_segments,
            ..
        } => {
            ui.columns(2, |cols| {
                contour_plot(
                    &mut cols[0],
                    "contour_grid",
                    &format!("Interpolated contour ({z_label})"),
                    x_label,
                    y_label,
                    grid_segments,
                    sample,
                    *value_range,
                );
                contour_plot(
                    &mut cols[1],
                    "contour_tri",
                    &format!("Triangulated contour ({z_label})"),
                    x_label,
                    y_label,
                    tri_segments,
                    sample,
                    *value_range,
                );
            });
        }

        ChartData::Empty(message) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(message);
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn contour_plot(
    ui: &mut Ui,
    id: &str,
    title: &str,
    x_label: &str,
    y_label: &str,
    segments: &[IsoSegment],
    sample: &crate::analysis::interpolate::ScatterSample,
    (lo, hi): (f64, f64),
) {
    ui.strong(title);
    Plot::new(id.to_owned())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for seg in segments {
                let t = if hi > lo { (seg.level - lo) / (hi - lo) } else { 0.5 };
                let points: PlotPoints = vec![seg.start, seg.end].into();
                plot_ui.line(Line::new(points).color(sequential(t)).width(1.0));
            }
            let dots: PlotPoints = sample
                .x
                .iter()
                .zip(&sample.y)
                .map(|(&x, &y)| [x, y])
                .collect();
            plot_ui.points(Points::new(dots).color(Color32::DARK_GRAY).radius(2.0));
        });
}

// ---------------------------------------------------------------------------
// Overview tab (central panel)
// ---------------------------------------------------------------------------

/// Render the reference-workbook overview: the performance scatter plus
/// the categorical breakdowns.
pub fn overview_view(ui: &mut Ui, state: &SessionState) {
    let overview = &state.overview;
    if overview.scatter.is_none() && overview.summaries.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open the reference workbook to see the performance overview.");
        });
        return;
    }

    if let Some(sample) = &overview.scatter {
        ui.strong("Compressor performance (speed vs mass flow, colored by isentropic efficiency)");
        let (lo, hi) = sample
            .z
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Plot::new("overview_scatter")
            .x_axis_label("speed")
            .y_axis_label("mass flow")
            .show(ui, |plot_ui| {
                for ((&x, &y), &z) in sample.x.iter().zip(&sample.y).zip(&sample.z) {
                    let t = if hi > lo { (z - lo) / (hi - lo) } else { 0.5 };
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[x, y]]))
                            .color(sequential(t))
                            .radius(4.0),
                    );
                }
            });
    }

    if !overview.summaries.is_empty() {
        ui.separator();
        ui.columns(overview.summaries.len(), |cols| {
            for (col, summary) in cols.iter_mut().zip(&overview.summaries) {
                categorical_bars(col, summary);
            }
        });
    }
}

/// One categorical breakdown as a bar chart; the same view serves every
/// summarized column.
fn categorical_bars(ui: &mut Ui, summary: &CategoricalSummary) {
    ui.strong(&summary.column);
    if let Some((label, share)) = summary.top_share() {
        ui.small(format!("top: {label} ({share:.1}%)"));
    }
    let bars: Vec<Bar> = summary
        .entries
        .iter()
        .enumerate()
        .map(|(i, (label, count, color))| {
            Bar::new(i as f64, *count as f64)
                .name(label)
                .fill(*color)
                .width(0.8)
        })
        .collect();
    Plot::new(format!("summary_{}", summary.column))
        .show_grid(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Density helpers
// ---------------------------------------------------------------------------

/// Equal-width histogram bars normalized to density (area sums to 1).
fn histogram_bars(values: &[f64], bin_count: usize) -> Vec<Bar> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        // Constant column: one unit-width bar of density 1.
        return vec![Bar::new(lo, 1.0).width(1.0)];
    }
    let width = (hi - lo) / bin_count as f64;

    let mut counts = vec![0usize; bin_count];
    for &v in values {
        let bin = (((v - lo) / width) as usize).min(bin_count - 1);
        counts[bin] += 1;
    }
    let norm = values.len() as f64 * width;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(lo + (i as f64 + 0.5) * width, c as f64 / norm).width(width)
        })
        .collect()
}

/// Gaussian kernel density estimate with Silverman's bandwidth, evaluated
/// at `resolution` points across a slightly padded value range.
fn kde_points(values: &[f64], resolution: usize) -> Vec<[f64; 2]> {
    if values.len() < 2 || resolution == 0 {
        return Vec::new();
    }
    let sd = std_dev(values);
    if sd == 0.0 {
        return Vec::new();
    }
    let bandwidth = 1.06 * sd * (values.len() as f64).powf(-0.2);
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;

    let step = (hi - lo) / (resolution - 1) as f64;
    (0..resolution)
        .map(|i| {
            let x = lo + i as f64 * step;
            let density: f64 = values
                .iter()
                .map(|&v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
            [x, density]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_density_integrates_to_one() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        let bars = histogram_bars(&values, 20);
        let area: f64 = bars.iter().map(|b| b.value * b.bar_width).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_column_histogram_stays_finite() {
        let bars = histogram_bars(&[3.0, 3.0, 3.0], 30);
        assert_eq!(bars.len(), 1);
        assert!(bars[0].value.is_finite());
        let area: f64 = bars.iter().map(|b| b.value * b.bar_width).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kde_peaks_near_the_data_mass() {
        let values = vec![0.0, 0.1, -0.1, 0.05, -0.05, 5.0];
        let pts = kde_points(&values, 300);
        let peak = pts
            .iter()
            .cloned()
            .max_by(|a, b| a[1].total_cmp(&b[1]))
            .unwrap();
        assert!(peak[0].abs() < 1.0, "peak at {}", peak[0]);
    }
}
