use std::path::PathBuf;

use crate::analysis::contour::{
    contour_levels, grid_contours, grid_value_range, triangle_contours, IsoSegment,
};
use crate::analysis::correlation::{correlation_matrix, CorrelationMatrix, Method};
use crate::analysis::interpolate::{ScatterSample, Triangulation};
use crate::analysis::summary::CategoricalSummary;
use crate::analysis::transform::standardize;
use crate::chart::{ChartKind, ChartSelector};
use crate::chat::{ChatConfig, ChatHistory, StreamingReply};
use crate::data::clean::{clean, clean_requiring};
use crate::data::model::{Table, Value};
use crate::data::ranges::{fill_labels, partition, GroupedFrame, RangeSpec};
use crate::error::PipelineError;

/// Grid resolution for contour interpolation (nodes per axis).
const GRID_NODES: usize = 100;
/// Number of contour levels.
const CONTOUR_LEVELS: usize = 14;

// ---------------------------------------------------------------------------
// Derived chart data (renderer input)
// ---------------------------------------------------------------------------

/// What the renderer consumes: fully derived, label-carrying data with no
/// visual styling decisions baked in.
#[derive(Debug)]
pub enum ChartData {
    GroupedScatter {
        x_label: String,
        y_label: String,
        title: String,
        frame: GroupedFrame,
    },
    Distribution {
        /// One cleaned (and possibly standardized) series per column.
        series: Vec<(String, Vec<f64>)>,
    },
    Heatmap(CorrelationMatrix),
    Contour {
        x_label: String,
        y_label: String,
        z_label: String,
        sample: ScatterSample,
        levels: Vec<f64>,
        value_range: (f64, f64),
        /// Iso-lines from the 100×100 resampled grid.
        grid_segments: Vec<IsoSegment>,
        /// Iso-lines computed directly on the triangulation.
        tri_segments: Vec<IsoSegment>,
    },
    /// Valid-but-empty derivation: distinct from an error, rendered as an
    /// informational message.
    Empty(String),
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Analysis,
    Chat,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Analysis, Tab::Chat];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Analysis => "Analysis",
            Tab::Chat => "Chat",
        }
    }
}

// ---------------------------------------------------------------------------
// Overview tab state
// ---------------------------------------------------------------------------

/// State of the reference-workbook overview: the performance scatter
/// sampled from fixed row windows plus categorical breakdowns.
#[derive(Default)]
pub struct OverviewState {
    pub workbook: Option<PathBuf>,
    pub scatter: Option<ScatterSample>,
    pub summaries: Vec<CategoricalSummary>,
}

// ---------------------------------------------------------------------------
// Chat tab state
// ---------------------------------------------------------------------------

pub struct ChatState {
    pub config: Option<ChatConfig>,
    pub api_key_input: String,
    pub history: ChatHistory,
    pub input: String,
    pub reply: Option<StreamingReply>,
    pub error: Option<String>,
}

impl Default for ChatState {
    fn default() -> Self {
        ChatState {
            config: ChatConfig::from_env(),
            api_key_input: String::new(),
            history: ChatHistory::default(),
            input: String::new(),
            reply: None,
            error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The full session, independent of rendering.  All derived entities are
/// recomputed from `table` whenever a selection parameter changes and are
/// dropped with the session; nothing is persisted.
pub struct SessionState {
    /// Loaded dataset (None until the user uploads a file).
    pub table: Option<Table>,
    pub source_name: Option<String>,
    /// Leading metadata rows skipped before the header on load.
    pub skip_rows: usize,

    /// Current chart selection.
    pub chart: ChartKind,
    /// Set when a selection changed and `derived` is stale.
    chart_dirty: bool,
    derived: Option<ChartData>,
    /// Non-fatal warnings from the last recomputation pass.
    pub warnings: Vec<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    pub tab: Tab,
    pub overview: OverviewState,
    pub chat: ChatState,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            table: None,
            source_name: None,
            skip_rows: 2,
            chart: ChartKind::Distribution {
                columns: Vec::new(),
                standardize: false,
            },
            chart_dirty: false,
            derived: None,
            warnings: Vec::new(),
            status_message: None,
            tab: Tab::Analysis,
            overview: OverviewState::default(),
            chat: ChatState::default(),
        }
    }
}

impl SessionState {
    /// Ingest a newly loaded table and reset every chart selection to a
    /// sensible default for its columns.  Derived entities from the
    /// previous table are discarded.
    pub fn set_table(&mut self, table: Table, source_name: String) {
        self.chart = default_grouped_scatter(&table);
        self.chart_dirty = true;
        self.derived = None;
        self.warnings.clear();
        self.status_message = None;
        self.source_name = Some(source_name);
        self.table = Some(table);
    }

    /// Flag the derived chart data as stale after a selection change.
    pub fn mark_chart_dirty(&mut self) {
        self.chart_dirty = true;
    }

    /// Recompute (if stale) and return the derived chart data.  Errors
    /// degrade to warnings plus no data; they never unload the table.
    pub fn derived_chart(&mut self) -> Option<&ChartData> {
        if self.chart_dirty {
            self.chart_dirty = false;
            self.warnings.clear();
            match &self.table {
                Some(table) => match derive_chart(table, &self.chart, &mut self.warnings) {
                    Ok(data) => self.derived = Some(data),
                    Err(e) => {
                        self.warnings.push(e.to_string());
                        self.derived = None;
                    }
                },
                None => self.derived = None,
            }
        }
        self.derived.as_ref()
    }

    /// Replace the chart kind, seeding its parameters from the current
    /// table's columns.
    pub fn switch_chart(&mut self, selector: ChartSelector) {
        let Some(table) = &self.table else { return };
        let columns = table.column_names();
        let first = |i: usize| columns.get(i).cloned().unwrap_or_default();

        self.chart = match selector {
            ChartSelector::GroupedScatter => default_grouped_scatter(table),
            ChartSelector::Distribution => ChartKind::Distribution {
                columns: columns.iter().take(2).cloned().collect(),
                standardize: false,
            },
            ChartSelector::CorrelationHeatmap => ChartKind::CorrelationHeatmap {
                columns: columns.iter().take(2).cloned().collect(),
                method: Method::Pearson,
            },
            ChartSelector::Contour => ChartKind::Contour {
                x: first(0),
                y: first(1),
                z: first(2),
            },
        };
        self.chart_dirty = true;
    }
}

/// Default grouped-scatter selection: first two columns, the classic four
/// quarter ranges clipped to the table.
fn default_grouped_scatter(table: &Table) -> ChartKind {
    let columns = table.column_names();
    let last = table.row_count().saturating_sub(1);
    let clip = |v: usize| v.min(last);
    ChartKind::GroupedScatter {
        x: columns.first().cloned().unwrap_or_default(),
        y: columns.get(1).cloned().unwrap_or_default(),
        ranges: vec![
            RangeSpec::new(0, clip(25), "Range 1"),
            RangeSpec::new(clip(26), clip(50), "Range 2"),
            RangeSpec::new(clip(51), clip(75), "Range 3"),
            RangeSpec::new(clip(76), last, "Range 4"),
        ],
        title: String::new(),
    }
}

// ---------------------------------------------------------------------------
// Derivation pipeline (one synchronous pass per interaction)
// ---------------------------------------------------------------------------

/// Run the derivation pipeline for one chart selection.  Each chart kind
/// walks clean → {partition | transform | correlate | interpolate} and
/// hands the renderer fully derived data.
fn derive_chart(
    table: &Table,
    chart: &ChartKind,
    warnings: &mut Vec<String>,
) -> Result<ChartData, PipelineError> {
    match chart {
        ChartKind::GroupedScatter {
            x,
            y,
            ranges,
            title,
        } => {
            let outcome = clean(table, &[x.clone(), y.clone()])?;
            warn_rejected(&outcome.rejected_columns, warnings);
            if outcome.frame.is_empty() {
                return Ok(ChartData::Empty(format!(
                    "columns '{x}' and '{y}' have no valid numeric rows"
                )));
            }

            let mut specs = ranges.clone();
            fill_labels(&mut specs);
            let partitioned = partition(&outcome.frame, &specs);
            warnings.extend(partitioned.warnings);

            if partitioned.frame.is_empty() {
                return Ok(ChartData::Empty(
                    "no rows fall inside the selected ranges".into(),
                ));
            }
            Ok(ChartData::GroupedScatter {
                x_label: x.clone(),
                y_label: y.clone(),
                title: if title.trim().is_empty() {
                    format!("{y} by range")
                } else {
                    title.clone()
                },
                frame: partitioned.frame,
            })
        }

        ChartKind::Distribution {
            columns,
            standardize: standardize_requested,
        } => {
            let mut series = Vec::new();
            for name in columns {
                // Each column cleans independently so one bad column does
                // not drop rows from the others.
                let outcome = clean(table, std::slice::from_ref(name))?;
                warn_rejected(&outcome.rejected_columns, warnings);
                if outcome.numeric_columns.is_empty() {
                    continue;
                }
                let values = outcome.frame.column(name)?.to_vec();
                if values.is_empty() {
                    warnings.push(format!("column '{name}' has no valid numeric rows"));
                    continue;
                }
                if *standardize_requested {
                    match standardize(name, &values) {
                        Ok(scaled) => series.push((format!("{name} (standardized)"), scaled)),
                        Err(e) => warnings.push(e.to_string()),
                    }
                } else {
                    series.push((name.clone(), values));
                }
            }
            if series.is_empty() {
                return Ok(ChartData::Empty(
                    "no usable columns for the distribution plot".into(),
                ));
            }
            Ok(ChartData::Distribution { series })
        }

        ChartKind::CorrelationHeatmap { columns, method } => {
            let outcome = clean_requiring(table, columns, 2)?;
            warn_rejected(&outcome.rejected_columns, warnings);
            if outcome.frame.is_empty() {
                return Ok(ChartData::Empty(
                    "no rows survive cleaning for the selected columns".into(),
                ));
            }
            let matrix = correlation_matrix(&outcome.frame, *method)?;
            Ok(ChartData::Heatmap(matrix))
        }

        ChartKind::Contour { x, y, z } => {
            let outcome = clean(table, &[x.clone(), y.clone(), z.clone()])?;
            warn_rejected(&outcome.rejected_columns, warnings);
            let frame = &outcome.frame;
            if frame.column_count() < 3 || frame.row_count() < 3 {
                return Err(PipelineError::InsufficientPoints {
                    got: if frame.column_count() < 3 {
                        0
                    } else {
                        frame.row_count()
                    },
                });
            }

            let sample = ScatterSample {
                x: frame.column(x)?.to_vec(),
                y: frame.column(y)?.to_vec(),
                z: frame.column(z)?.to_vec(),
            };
            let tri = Triangulation::build(&sample)?;
            let grid = tri.resample(GRID_NODES, GRID_NODES);

            let Some(value_range) = grid_value_range(&grid) else {
                return Ok(ChartData::Empty(
                    "interpolation produced no defined grid values".into(),
                ));
            };
            let levels = contour_levels(value_range.0, value_range.1, CONTOUR_LEVELS);

            Ok(ChartData::Contour {
                x_label: x.clone(),
                y_label: y.clone(),
                z_label: z.clone(),
                grid_segments: grid_contours(&grid, &levels),
                tri_segments: triangle_contours(&tri, &levels),
                sample,
                levels,
                value_range,
            })
        }
    }
}

fn warn_rejected(rejected: &[String], warnings: &mut Vec<String>) {
    for name in rejected {
        warnings.push(format!("column '{name}' is not numeric, excluded"));
    }
}

// ---------------------------------------------------------------------------
// Overview derivation (reference workbook)
// ---------------------------------------------------------------------------

/// Fixed row windows of the reference workbook sampled by the performance
/// overview scatter (speed, mass flow, isentropic efficiency).
pub mod overview_windows {
    use crate::data::loader::ColumnSlice;

    pub const SPEED_COLUMN: usize = 61;
    pub const FLOW_COLUMN: usize = 60;
    pub const EFFICIENCY_COLUMN: usize = 70;

    /// The three disjoint measurement blocks of the workbook.
    pub const BLOCKS: [(usize, usize); 3] = [(137, 53), (437, 17), (521, 50)];

    pub fn slices(column: usize) -> Vec<ColumnSlice> {
        BLOCKS
            .iter()
            .map(|&(skip_rows, rows)| ColumnSlice {
                column,
                skip_rows,
                rows,
            })
            .collect()
    }
}

/// Load the overview scatter from the reference workbook: three column
/// slices, cleaned row-wise across the (speed, flow, efficiency) triple.
pub fn load_overview_scatter(path: &std::path::Path) -> Result<ScatterSample, PipelineError> {
    use crate::data::loader::load_column_slices;
    use overview_windows::*;

    let speed = load_column_slices(path, &slices(SPEED_COLUMN))?;
    let flow = load_column_slices(path, &slices(FLOW_COLUMN))?;
    let efficiency = load_column_slices(path, &slices(EFFICIENCY_COLUMN))?;

    let mut sample = ScatterSample::default();
    for ((s, f), e) in speed.iter().zip(&flow).zip(&efficiency) {
        if let (Some(s), Some(f), Some(e)) = (s.as_number(), f.as_number(), e.as_number()) {
            sample.x.push(s);
            sample.y.push(f);
            sample.z.push(e);
        }
    }
    Ok(sample)
}

/// Categorical breakdowns for the overview: one summary per text column,
/// capped at two panels like the database-details view.
pub fn overview_summaries(table: &Table) -> Vec<CategoricalSummary> {
    use crate::analysis::summary::categorical_summary;

    let mut summaries = Vec::new();
    for column in table.columns() {
        let is_textual = column
            .values
            .iter()
            .any(|v| matches!(v, Value::Text(_)) && v.as_number().is_none());
        if !is_textual {
            continue;
        }
        if let Ok(summary) = categorical_summary(table, &column.name) {
            if !summary.entries.is_empty() {
                summaries.push(summary);
            }
        }
        if summaries.len() == 2 {
            break;
        }
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    fn sample_table() -> Table {
        Table::from_columns(vec![
            Column::new("x", vec![n(1.0), n(2.0), n(3.0), n(4.0), n(5.0)]),
            Column::new(
                "y",
                vec![
                    n(2.0),
                    n(4.0),
                    n(6.0),
                    Value::Text("bad".into()),
                    n(10.0),
                ],
            ),
        ])
    }

    #[test]
    fn end_to_end_scatter_correlation_scenario() {
        // Upload → coerce → drop row 4 → Pearson(x, y) = 1.0 exactly.
        let table = sample_table();
        let outcome = clean_requiring(&table, &["x".into(), "y".into()], 2).unwrap();
        assert_eq!(outcome.frame.row_count(), 4);

        let matrix = correlation_matrix(&outcome.frame, Method::Pearson).unwrap();
        assert!((matrix.values[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn derive_reports_warnings_without_unloading() {
        let mut session = SessionState::default();
        session.set_table(sample_table(), "test.csv".into());
        session.chart = ChartKind::GroupedScatter {
            x: "x".into(),
            y: "y".into(),
            ranges: vec![RangeSpec::new(3, 1, "bad"), RangeSpec::new(0, 2, "ok")],
            title: String::new(),
        };
        session.mark_chart_dirty();

        assert!(matches!(
            session.derived_chart(),
            Some(ChartData::GroupedScatter { .. })
        ));
        assert_eq!(session.warnings.len(), 1);
        assert!(session.table.is_some());
    }

    #[test]
    fn degenerate_column_is_a_warning_not_a_failure() {
        let table = Table::from_columns(vec![
            Column::new("flat", vec![n(2.0), n(2.0), n(2.0)]),
            Column::new("v", vec![n(1.0), n(2.0), n(3.0)]),
        ]);
        let mut warnings = Vec::new();
        let chart = ChartKind::Distribution {
            columns: vec!["flat".into(), "v".into()],
            standardize: true,
        };
        let data = derive_chart(&table, &chart, &mut warnings).unwrap();
        let ChartData::Distribution { series } = data else {
            panic!("expected distribution data");
        };
        // The flat column is skipped with a warning; the other survives.
        assert_eq!(series.len(), 1);
        assert!(series[0].0.starts_with("v"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn contour_with_too_few_points_fails_soft() {
        let table = Table::from_columns(vec![
            Column::new("x", vec![n(0.0), n(1.0)]),
            Column::new("y", vec![n(0.0), n(1.0)]),
            Column::new("z", vec![n(0.0), n(1.0)]),
        ]);
        let chart = ChartKind::Contour {
            x: "x".into(),
            y: "y".into(),
            z: "z".into(),
        };
        let err = derive_chart(&table, &chart, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientPoints { got: 2 }));
    }

    #[test]
    fn overview_summaries_pick_text_columns_only() {
        let table = Table::from_columns(vec![
            Column::new("rpm", vec![n(1.0), n(2.0)]),
            Column::new(
                "paper_kind",
                vec![Value::Text("journal".into()), Value::Text("thesis".into())],
            ),
        ]);
        let summaries = overview_summaries(&table);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].column, "paper_kind");
    }
}
