/// Data layer: core table types, loading, and cleaning.
///
/// Architecture:
/// ```text
///  .xlsx / .csv
///       │
///       ▼
///  ┌──────────┐
///  │  loader   │  parse file → Table
///  └──────────┘
///       │
///       ▼
///  ┌──────────┐
///  │  Table    │  named columns, rows aligned by index
///  └──────────┘
///       │
///       ▼
///  ┌──────────┐
///  │  clean    │  drop first row, prune sparse columns, fill nulls
///  └──────────┘
/// ```
pub mod clean;
pub mod loader;
pub mod model;
