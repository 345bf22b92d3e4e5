use crate::analysis::correlation::Method;
use crate::data::ranges::RangeSpec;

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

/// The chart the analysis panel is showing.  One variant per kind, each
/// carrying only the parameters that kind needs; rendering dispatches on
/// this with a single exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// Scatter of `x` vs `y` comparing up to four labeled row ranges.
    GroupedScatter {
        x: String,
        y: String,
        ranges: Vec<RangeSpec>,
        title: String,
    },
    /// Histogram + density per selected column, optionally standardized.
    Distribution {
        columns: Vec<String>,
        standardize: bool,
    },
    /// Pairwise correlation heatmap over the selected columns.
    CorrelationHeatmap {
        columns: Vec<String>,
        method: Method,
    },
    /// Interpolated + direct triangulated contour of z over (x, y).
    Contour { x: String, y: String, z: String },
}

impl ChartKind {
    pub fn selector(&self) -> ChartSelector {
        match self {
            ChartKind::GroupedScatter { .. } => ChartSelector::GroupedScatter,
            ChartKind::Distribution { .. } => ChartSelector::Distribution,
            ChartKind::CorrelationHeatmap { .. } => ChartSelector::CorrelationHeatmap,
            ChartKind::Contour { .. } => ChartSelector::Contour,
        }
    }
}

/// Parameter-free tag for the chart-kind picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSelector {
    GroupedScatter,
    Distribution,
    CorrelationHeatmap,
    Contour,
}

impl ChartSelector {
    pub const ALL: [ChartSelector; 4] = [
        ChartSelector::GroupedScatter,
        ChartSelector::Distribution,
        ChartSelector::CorrelationHeatmap,
        ChartSelector::Contour,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartSelector::GroupedScatter => "Grouped scatter",
            ChartSelector::Distribution => "Distribution",
            ChartSelector::CorrelationHeatmap => "Correlation heatmap",
            ChartSelector::Contour => "Contour",
        }
    }
}
