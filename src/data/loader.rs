use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::model::{Column, Table, Value};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// Options applied while reading a file into a [`Table`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Number of leading metadata rows discarded before the header row.
    /// The first non-skipped row supplies the column names.
    pub skip_rows: usize,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`             – delimited text, header on the first kept row
/// * `.xlsx` / `.xls`   – spreadsheet workbook, first sheet
pub fn load_table(path: &Path, options: LoadOptions) -> Result<Table, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, options),
        "xlsx" | "xls" => load_workbook(path, options),
        other => Err(PipelineError::UnsupportedFormat(format!(".{other}"))),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, options: LoadOptions) -> Result<Table, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PipelineError::Parse(format!("opening CSV: {e}")))?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| PipelineError::Parse(format!("CSV row {row_no}: {e}")))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    table_from_rows(rows, options)
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path, options: LoadOptions) -> Result<Table, PipelineError> {
    let range = first_sheet_range(path)?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    table_from_rows(rows, options)
}

fn first_sheet_range(path: &Path) -> Result<calamine::Range<Data>, PipelineError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| PipelineError::Parse(format!("opening workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or_else(|| PipelineError::Parse("workbook has no sheets".into()))?
        .clone();

    workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| PipelineError::Parse(format!("reading sheet '{sheet_name}': {e}")))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
    }
}

// ---------------------------------------------------------------------------
// Row assembly
// ---------------------------------------------------------------------------

/// Skip leading rows, take the header from the first kept row, and pivot
/// the remaining rows into typed columns.  Short rows pad with `Missing`;
/// a row wider than the header is malformed input.
fn table_from_rows(rows: Vec<Vec<String>>, options: LoadOptions) -> Result<Table, PipelineError> {
    let mut kept = rows.into_iter().skip(options.skip_rows);

    let header = kept
        .next()
        .ok_or_else(|| PipelineError::Parse("no header row after skipping".into()))?;

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let trimmed = h.trim();
            if trimmed.is_empty() {
                format!("column_{i}")
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    let mut columns: Vec<Column> = names
        .into_iter()
        .map(|name| Column::new(name, Vec::new()))
        .collect();

    for (offset, row) in kept.enumerate() {
        if row.len() > columns.len() {
            return Err(PipelineError::Parse(format!(
                "row {} has {} fields, header has {}",
                options.skip_rows + 1 + offset,
                row.len(),
                columns.len()
            )));
        }
        for (col_idx, col) in columns.iter_mut().enumerate() {
            let cell = row.get(col_idx).map(String::as_str).unwrap_or("");
            col.values.push(Value::from_raw(cell));
        }
    }

    Ok(Table::from_columns(columns))
}

// ---------------------------------------------------------------------------
// Column slices (overview chart)
// ---------------------------------------------------------------------------

/// A headerless row window of one workbook column: read `rows` rows of
/// column `column` starting at `skip_rows`.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSlice {
    pub column: usize,
    pub skip_rows: usize,
    pub rows: usize,
}

/// Read fixed row windows of a single workbook column, concatenated in
/// call order.  Cells that do not coerce to a number become `Missing`.
/// Used by the performance-overview scatter, which samples disjoint row
/// blocks of the reference workbook rather than a headered table.
pub fn load_column_slices(path: &Path, slices: &[ColumnSlice]) -> Result<Vec<Value>, PipelineError> {
    let range = first_sheet_range(path)?;
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    Ok(collect_slices(&rows, slices))
}

fn collect_slices(rows: &[Vec<String>], slices: &[ColumnSlice]) -> Vec<Value> {
    let mut out = Vec::new();
    for slice in slices {
        for row in rows.iter().skip(slice.skip_rows).take(slice.rows) {
            let value = match row.get(slice.column) {
                Some(cell) => Value::from_raw(cell),
                None => Value::Missing,
            };
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "compressor-lab-test-{}-{}.csv",
            std::process::id(),
            contents.len()
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_table(Path::new("data.pdf"), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
    }

    #[test]
    fn skip_rows_moves_the_header() {
        let path = write_temp_csv("junk,junk\nmore junk,\nrpm,flow\n1,2\n3,4\n");
        let table = load_table(&path, LoadOptions { skip_rows: 2 }).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.column_names(), vec!["rpm", "flow"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column("rpm").unwrap().values[1],
            Value::Number(3.0)
        );
    }

    #[test]
    fn over_wide_rows_are_a_parse_error() {
        let path = write_temp_csv("a,b\n1,2\n1,2,3\n");
        let err = load_table(&path, LoadOptions::default()).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, PipelineError::Parse(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn ragged_rows_pad_with_missing() {
        let path = write_temp_csv("a,b,c\n1,2,3\n4,5\n");
        let table = load_table(&path, LoadOptions::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("c").unwrap().values[1], Value::Missing);
    }

    #[test]
    fn column_slices_concatenate_windows_in_call_order() {
        let rows: Vec<Vec<String>> = (0..10)
            .map(|i| vec![format!("{i}"), format!("{}", i * 10)])
            .collect();
        let slices = [
            ColumnSlice {
                column: 1,
                skip_rows: 6,
                rows: 2,
            },
            ColumnSlice {
                column: 1,
                skip_rows: 1,
                rows: 3,
            },
        ];
        let values = collect_slices(&rows, &slices);
        let numbers: Vec<f64> = values.iter().filter_map(Value::as_number).collect();
        assert_eq!(numbers, vec![60.0, 70.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn blank_header_cells_get_positional_names() {
        let path = write_temp_csv("x,,z\n1,2,3\n");
        let table = load_table(&path, LoadOptions::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.column_names(), vec!["x", "column_1", "z"]);
    }
}
