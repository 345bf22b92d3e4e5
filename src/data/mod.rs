/// Data layer: core types, loading, cleaning, and range partitioning.
///
/// Architecture:
/// ```text
///  .csv / .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named typed columns, equal length
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  coerce targets to f64, drop bad rows → NumericFrame
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  ranges   │  labeled row ranges → GroupedFrame
///   └──────────┘
/// ```

pub mod clean;
pub mod loader;
pub mod model;
pub mod ranges;
