/// Data layer: MagIC table types, loading, and merging.
///
/// Architecture:
/// ```text
///  specimens.txt / samples.txt / sites.txt / ...
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse tab-delimited / JSON tables → Contribution
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ Contribution  │  BTreeMap<TableType, MagicTable>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  merge    │  propagate columns, join on sample, filter depths
///   └──────────┘
/// ```
pub mod loader;
pub mod merge;
pub mod model;
