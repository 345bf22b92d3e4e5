use eframe::egui::Color32;

use crate::color::generate_palette;
use crate::data::model::{Table, Value};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Categorical summary (value counts + palette)
// ---------------------------------------------------------------------------

/// Value counts of one categorical column with a color per category.
/// One parametrized operation serves every categorical breakdown panel
/// (the per-column pie/donut views share this instead of duplicating the
/// counting logic).
#[derive(Debug, Clone)]
pub struct CategoricalSummary {
    pub column: String,
    /// (label, count, color), sorted by descending count.
    pub entries: Vec<(String, usize, Color32)>,
}

impl CategoricalSummary {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n, _)| n).sum()
    }

    /// Share of the largest category, as a percentage of all counted rows.
    pub fn top_share(&self) -> Option<(String, f64)> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        self.entries
            .first()
            .map(|(label, n, _)| (label.clone(), *n as f64 / total as f64 * 100.0))
    }
}

/// Count the occurrences of each distinct value in a text column, missing
/// cells excluded.  Equal counts break ties by label so output is
/// deterministic.
pub fn categorical_summary(table: &Table, column: &str) -> Result<CategoricalSummary, PipelineError> {
    let col = table.column(column)?;

    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in &col.values {
        let label = match value {
            Value::Missing => continue,
            other => other.to_string(),
        };
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    counts.sort_by(|(la, na), (lb, nb)| nb.cmp(na).then_with(|| la.cmp(lb)));

    let palette = generate_palette(counts.len());
    let entries = counts
        .into_iter()
        .zip(palette)
        .map(|((label, n), color)| (label, n, color))
        .collect();

    Ok(CategoricalSummary {
        column: column.to_string(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn t(s: &str) -> Value {
        Value::Text(s.into())
    }

    #[test]
    fn counts_sort_descending_and_skip_missing() {
        let table = Table::from_columns(vec![Column::new(
            "kind",
            vec![t("exp"), t("sim"), t("exp"), Value::Missing, t("exp"), t("sim"), t("field")],
        )]);
        let summary = categorical_summary(&table, "kind").unwrap();
        let labels: Vec<&str> = summary.entries.iter().map(|(l, _, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["exp", "sim", "field"]);
        assert_eq!(summary.entries[0].1, 3);
        assert_eq!(summary.total(), 6);
    }

    #[test]
    fn top_share_is_a_percentage() {
        let table = Table::from_columns(vec![Column::new(
            "kind",
            vec![t("a"), t("a"), t("a"), t("b")],
        )]);
        let summary = categorical_summary(&table, "kind").unwrap();
        let (label, share) = summary.top_share().unwrap();
        assert_eq!(label, "a");
        assert!((share - 75.0).abs() < 1e-9);
    }

    #[test]
    fn empty_column_gives_empty_summary() {
        let table = Table::from_columns(vec![Column::new("kind", vec![Value::Missing])]);
        let summary = categorical_summary(&table, "kind").unwrap();
        assert!(summary.entries.is_empty());
        assert!(summary.top_share().is_none());
    }
}
