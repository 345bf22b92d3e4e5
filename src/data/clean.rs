use super::model::Table;
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// NumericFrame – the cleaned numeric subset
// ---------------------------------------------------------------------------

/// A table restricted to chosen columns with every cell coerced to `f64`.
/// Invariant: every row has a valid number in every column.  An empty
/// frame is valid and distinct from an error.
#[derive(Debug, Clone)]
pub struct NumericFrame {
    pub columns: Vec<String>,
    /// Column-major: `data[col][row]`.
    pub data: Vec<Vec<f64>>,
}

impl NumericFrame {
    pub fn row_count(&self) -> usize {
        self.data.first().map(Vec::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column(&self, name: &str) -> Result<&[f64], PipelineError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.data[i].as_slice())
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
    }
}

/// Outcome of cleaning: the surviving frame plus a report of which target
/// columns were usable.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub frame: NumericFrame,
    /// Target columns that produced at least one coercible value.
    pub numeric_columns: Vec<String>,
    /// Target columns with no coercible values at all; excluded from the
    /// frame but reported so the UI can warn about them.
    pub rejected_columns: Vec<String>,
}

// ---------------------------------------------------------------------------
// clean – coercion + row-wise dropna
// ---------------------------------------------------------------------------

/// Coerce the target columns of `table` to numeric and drop every row with
/// a non-coercible or missing cell in any surviving target column.
///
/// Per-cell failures never raise; a column whose every cell fails is
/// rejected as a whole (reported, not fatal).  Unknown column names fail
/// with `UnknownColumn`.  Zero surviving rows is a valid empty outcome.
pub fn clean(table: &Table, targets: &[String]) -> Result<CleanOutcome, PipelineError> {
    // Coerce each target column independently; None marks a failed cell.
    let mut coerced: Vec<(String, Vec<Option<f64>>)> = Vec::with_capacity(targets.len());
    let mut rejected_columns = Vec::new();

    for name in targets {
        let column = table.column(name)?;
        let values: Vec<Option<f64>> = column.values.iter().map(|v| v.as_number()).collect();
        if values.iter().any(Option::is_some) {
            coerced.push((name.clone(), values));
        } else {
            log::warn!("column '{name}' has no numeric values, excluding it");
            rejected_columns.push(name.clone());
        }
    }

    // Row-wise drop: a row survives only if every kept column coerced.
    let row_count = table.row_count();
    let keep: Vec<usize> = (0..row_count)
        .filter(|&row| coerced.iter().all(|(_, vals)| vals[row].is_some()))
        .collect();

    let columns: Vec<String> = coerced.iter().map(|(name, _)| name.clone()).collect();
    let data: Vec<Vec<f64>> = coerced
        .iter()
        .map(|(_, vals)| keep.iter().filter_map(|&row| vals[row]).collect())
        .collect();

    Ok(CleanOutcome {
        frame: NumericFrame { columns, data },
        numeric_columns: coerced.into_iter().map(|(name, _)| name).collect(),
        rejected_columns,
    })
}

/// Convenience: clean and require at least `needed` surviving numeric
/// columns (correlation wants 2, contouring wants 3).
pub fn clean_requiring(
    table: &Table,
    targets: &[String],
    needed: usize,
) -> Result<CleanOutcome, PipelineError> {
    let outcome = clean(table, targets)?;
    let got = outcome.numeric_columns.len();
    if got < needed {
        return Err(PipelineError::InsufficientColumns { needed, got });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};

    fn make_table(cols: Vec<(&str, Vec<Value>)>) -> Table {
        Table::from_columns(
            cols.into_iter()
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    fn t(s: &str) -> Value {
        Value::Text(s.into())
    }

    #[test]
    fn rows_with_any_bad_cell_are_dropped() {
        let table = make_table(vec![
            ("x", vec![n(1.0), n(2.0), n(3.0), n(4.0), n(5.0)]),
            ("y", vec![n(2.0), n(4.0), n(6.0), t("bad"), n(10.0)]),
        ]);
        let outcome = clean(&table, &["x".into(), "y".into()]).unwrap();
        assert_eq!(outcome.frame.row_count(), 4);
        assert_eq!(outcome.frame.column("x").unwrap(), &[1.0, 2.0, 3.0, 5.0]);
        assert_eq!(outcome.frame.column("y").unwrap(), &[2.0, 4.0, 6.0, 10.0]);
    }

    #[test]
    fn clean_is_idempotent() {
        let table = make_table(vec![
            ("a", vec![n(1.0), t("x"), n(3.0)]),
            ("b", vec![n(4.0), n(5.0), Value::Missing]),
        ]);
        let targets = vec!["a".to_string(), "b".to_string()];
        let once = clean(&table, &targets).unwrap();

        // Rebuild a table from the cleaned frame and clean again.
        let rebuilt = Table::from_columns(
            once.frame
                .columns
                .iter()
                .zip(&once.frame.data)
                .map(|(name, vals)| {
                    Column::new(name.clone(), vals.iter().map(|&v| n(v)).collect())
                })
                .collect(),
        );
        let twice = clean(&rebuilt, &targets).unwrap();
        assert_eq!(once.frame.data, twice.frame.data);
    }

    #[test]
    fn fully_textual_column_is_rejected_not_fatal() {
        let table = make_table(vec![
            ("x", vec![n(1.0), n(2.0)]),
            ("label", vec![t("lo"), t("hi")]),
        ]);
        let outcome = clean(&table, &["x".into(), "label".into()]).unwrap();
        assert_eq!(outcome.numeric_columns, vec!["x"]);
        assert_eq!(outcome.rejected_columns, vec!["label"]);
        assert_eq!(outcome.frame.row_count(), 2);
    }

    #[test]
    fn zero_survivors_is_empty_but_valid() {
        // Partial failures on disjoint rows: nothing survives row-wise
        // cleaning, yet both columns are numeric and the result is valid.
        let table = make_table(vec![
            ("x", vec![n(1.0), Value::Missing]),
            ("y", vec![Value::Missing, n(2.0)]),
        ]);
        let outcome = clean(&table, &["x".into(), "y".into()]).unwrap();
        assert!(outcome.frame.is_empty());
        assert_eq!(outcome.numeric_columns.len(), 2);
    }

    #[test]
    fn insufficient_columns_for_strict_callers() {
        let table = make_table(vec![
            ("x", vec![n(1.0)]),
            ("label", vec![t("a")]),
        ]);
        let err = clean_requiring(&table, &["x".into(), "label".into()], 2).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InsufficientColumns { needed: 2, got: 1 }
        ));
    }
}
