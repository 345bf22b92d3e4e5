use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Standardization (zero mean, unit variance)
// ---------------------------------------------------------------------------

/// Sample mean of a slice.  Empty input yields 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor n), matching the behavior the
/// distribution panel standardizes against.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Standardize a column: subtract the mean, divide by the standard
/// deviation.  Purely functional; nothing is fitted or reused across
/// calls.  A zero-variance column fails with `DegenerateColumn` so the
/// caller can warn and skip it instead of dividing by zero.
pub fn standardize(name: &str, values: &[f64]) -> Result<Vec<f64>, PipelineError> {
    let m = mean(values);
    let sd = std_dev(values);
    if sd == 0.0 {
        return Err(PipelineError::DegenerateColumn(name.to_string()));
    }
    Ok(values.iter().map(|v| (v - m) / sd).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn standardized_column_has_zero_mean_unit_std() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let out = standardize("v", &values).unwrap();
        assert!(mean(&out).abs() < TOL);
        assert!((std_dev(&out) - 1.0).abs() < TOL);
    }

    #[test]
    fn double_standardization_still_normalizes() {
        // Not idempotent in value, but the second pass is still mean 0 / std 1.
        let values = vec![10.0, 20.0, 35.0, 70.0];
        let once = standardize("v", &values).unwrap();
        let twice = standardize("v", &once).unwrap();
        assert!(mean(&twice).abs() < TOL);
        assert!((std_dev(&twice) - 1.0).abs() < TOL);
    }

    #[test]
    fn constant_column_is_degenerate() {
        let err = standardize("flat", &[3.0, 3.0, 3.0]).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateColumn(name) if name == "flat"));
    }
}
