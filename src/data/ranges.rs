use super::clean::NumericFrame;

// ---------------------------------------------------------------------------
// Named row ranges for comparative plotting
// ---------------------------------------------------------------------------

/// An inclusive row interval `[start, end]` plus a group label.  Up to four
/// ranges are compared side by side; ranges may overlap or leave gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl RangeSpec {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        RangeSpec {
            start,
            end,
            label: label.into(),
        }
    }
}

/// Fill blank labels with positional defaults ("Range 1", "Range 2", ...).
pub fn fill_labels(specs: &mut [RangeSpec]) {
    for (i, spec) in specs.iter_mut().enumerate() {
        if spec.label.trim().is_empty() {
            spec.label = format!("Range {}", i + 1);
        }
    }
}

// ---------------------------------------------------------------------------
// GroupedFrame – the row-wise union of the valid ranges
// ---------------------------------------------------------------------------

/// Rows extracted from a [`NumericFrame`] with a group label per row.
/// Output order is the concatenation of valid ranges in supplied order;
/// a row appearing in overlapping ranges is kept once per range.
#[derive(Debug, Clone)]
pub struct GroupedFrame {
    pub columns: Vec<String>,
    /// Column-major, parallel to `groups`.
    pub data: Vec<Vec<f64>>,
    /// Group label of each output row.
    pub groups: Vec<String>,
}

impl GroupedFrame {
    pub fn row_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Distinct group labels in first-appearance order.
    pub fn group_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for g in &self.groups {
            if !labels.contains(g) {
                labels.push(g.clone());
            }
        }
        labels
    }
}

/// Result of partitioning: the grouped rows plus one warning per skipped
/// range.  Skipping is not fatal; the remaining ranges proceed.
#[derive(Debug, Clone)]
pub struct Partitioned {
    pub frame: GroupedFrame,
    pub warnings: Vec<String>,
}

/// Slice `frame` into labeled row ranges.  A range is valid when
/// `start <= end` and both indices are within bounds; invalid ranges are
/// skipped with a warning.
pub fn partition(frame: &NumericFrame, specs: &[RangeSpec]) -> Partitioned {
    let row_count = frame.row_count();
    let mut data: Vec<Vec<f64>> = vec![Vec::new(); frame.column_count()];
    let mut groups = Vec::new();
    let mut warnings = Vec::new();

    for (i, spec) in specs.iter().enumerate() {
        if spec.start > spec.end || spec.end >= row_count {
            warnings.push(format!(
                "range {} ({}..{}) is invalid or out of bounds for {} rows, skipping",
                i + 1,
                spec.start,
                spec.end,
                row_count
            ));
            continue;
        }
        for row in spec.start..=spec.end {
            for (col_idx, col_out) in data.iter_mut().enumerate() {
                col_out.push(frame.data[col_idx][row]);
            }
            groups.push(spec.label.clone());
        }
    }

    Partitioned {
        frame: GroupedFrame {
            columns: frame.columns.clone(),
            data,
            groups,
        },
        warnings,
    }
}
