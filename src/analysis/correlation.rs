use crate::data::clean::NumericFrame;
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Correlation matrix (Pearson / Spearman)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Pearson,
    Spearman,
}

impl Method {
    pub fn label(&self) -> &'static str {
        match self {
            Method::Pearson => "Pearson",
            Method::Spearman => "Spearman",
        }
    }
}

/// A square, symmetric pairwise correlation matrix with unit diagonal.
/// Off-diagonal entries of a zero-variance column are NaN.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` = correlation of columns i and j.
    pub values: Vec<Vec<f64>>,
    pub method: Method,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Compute the pairwise correlation matrix over a cleaned numeric frame.
/// Requires at least two columns; the frame's row-wise cleaning guarantees
/// no missing values, so identical input always yields the same matrix.
pub fn correlation_matrix(
    frame: &NumericFrame,
    method: Method,
) -> Result<CorrelationMatrix, PipelineError> {
    let n = frame.column_count();
    if n < 2 {
        return Err(PipelineError::InsufficientColumns { needed: 2, got: n });
    }

    // Spearman is Pearson over average ranks.
    let series: Vec<Vec<f64>> = match method {
        Method::Pearson => frame.data.clone(),
        Method::Spearman => frame.data.iter().map(|col| average_ranks(col)).collect(),
    };

    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: frame.columns.clone(),
        values,
        method,
    })
}

/// Pearson product-moment correlation.  Zero variance in either input
/// yields NaN (the documented degenerate-column policy).
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.len() < 2 {
        return f64::NAN;
    }

    let mean_a = a.iter().sum::<f64>() / a.len() as f64;
    let mean_b = b.iter().sum::<f64>() / b.len() as f64;

    let numerator: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    let var_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum();
    let var_b: f64 = b.iter().map(|y| (y - mean_b).powi(2)).sum();

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    numerator / (var_a.sqrt() * var_b.sqrt())
}

/// Average (fractional) ranks, 1-based; ties share the mean of the ranks
/// they would occupy.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        // Find the run of tied values.
        let mut j = i + 1;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // Ranks i+1 ..= j averaged over the tie run.
        let avg = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg;
        }
        i = j;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn frame(cols: Vec<(&str, Vec<f64>)>) -> NumericFrame {
        NumericFrame {
            columns: cols.iter().map(|(n, _)| n.to_string()).collect(),
            data: cols.into_iter().map(|(_, v)| v).collect(),
        }
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let f = frame(vec![
            ("a", vec![1.0, 2.0, 3.0, 4.0]),
            ("b", vec![4.0, 1.0, 3.0, 2.0]),
            ("c", vec![2.0, 2.0, 1.0, 5.0]),
        ]);
        let m = correlation_matrix(&f, Method::Pearson).unwrap();
        for i in 0..3 {
            assert!((m.values[i][i] - 1.0).abs() < TOL);
            for j in 0..3 {
                assert!((m.values[i][j] - m.values[j][i]).abs() < TOL);
            }
        }
    }

    #[test]
    fn perfect_linear_relation_is_exactly_one() {
        let f = frame(vec![
            ("x", vec![1.0, 2.0, 3.0, 5.0]),
            ("y", vec![2.0, 4.0, 6.0, 10.0]),
        ]);
        let m = correlation_matrix(&f, Method::Pearson).unwrap();
        assert!((m.values[0][1] - 1.0).abs() < TOL);
    }

    #[test]
    fn zero_variance_column_yields_nan_off_diagonal() {
        let f = frame(vec![
            ("x", vec![1.0, 2.0, 3.0]),
            ("flat", vec![7.0, 7.0, 7.0]),
        ]);
        let m = correlation_matrix(&f, Method::Pearson).unwrap();
        assert!(m.values[0][1].is_nan());
        assert!(m.values[1][0].is_nan());
        assert!((m.values[1][1] - 1.0).abs() < TOL);
    }

    #[test]
    fn spearman_sees_monotone_nonlinear_as_one() {
        let f = frame(vec![
            ("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("y", vec![1.0, 8.0, 27.0, 64.0, 125.0]),
        ]);
        let m = correlation_matrix(&f, Method::Spearman).unwrap();
        assert!((m.values[0][1] - 1.0).abs() < TOL);
    }

    #[test]
    fn tied_ranks_are_averaged() {
        assert_eq!(average_ranks(&[10.0, 20.0, 20.0, 30.0]), vec![
            1.0, 2.5, 2.5, 4.0
        ]);
    }

    #[test]
    fn single_column_is_insufficient() {
        let f = frame(vec![("x", vec![1.0, 2.0])]);
        assert!(matches!(
            correlation_matrix(&f, Method::Pearson),
            Err(PipelineError::InsufficientColumns { needed: 2, got: 1 })
        ));
    }
}
