/// Data layer: core types, loading, and filter-based selection.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv        selection .json / .txt
///        │                               │
///        ▼                               ▼
///   ┌──────────┐                  ┌──────────────┐
///   │  loader   │  parse → Table  │ load_selection │
///   └──────────┘                  └──────────────┘
///        │                               │
///        ▼                               │
///   ┌──────────┐                         │
///   │  Table    │  columns, unique values │
///   └──────────┘                         │
///        │                               │
///        ▼                               ▼
///   ┌──────────┐                  ┌──────────┐
///   │  filter   │ ── predicates ─▶ │ Selection │
///   └──────────┘                  └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
