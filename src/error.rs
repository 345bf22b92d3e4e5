use thiserror::Error;

// ---------------------------------------------------------------------------
// Pipeline error taxonomy
// ---------------------------------------------------------------------------

/// Errors raised by the data ingestion and chart derivation pipeline.
///
/// Every variant is local and non-fatal: the UI surfaces it as a panel
/// warning or status message and the rest of the session keeps working.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// File extension / content not recognised as CSV or a workbook.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Malformed file content (unreadable workbook, broken CSV, ...).
    #[error("parse error: {0}")]
    Parse(String),

    /// A referenced column does not exist in the table.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Fewer numeric columns survived cleaning than the operation needs.
    #[error("need at least {needed} numeric columns, got {got}")]
    InsufficientColumns { needed: usize, got: usize },

    /// Fewer than 3 usable points for triangulation.
    #[error("need at least 3 points for triangulation, got {got}")]
    InsufficientPoints { got: usize },

    /// Standardization requested on a zero-variance column.
    #[error("column '{0}' has zero variance, cannot standardize")]
    DegenerateColumn(String),
}
