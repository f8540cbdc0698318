/// Data layer: core types, loading, filtering, aggregation, and export.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (trimmed headers, Unknown backfill)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, Schema capability flags, distinct values
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply ANDed predicates → FilteredView (row indices)
///   └──────────┘
///        │
///        ├──────────────────┐
///        ▼                  ▼
///   ┌──────────┐      ┌──────────┐
///   │ aggregate │      │  export   │
///   │ KPIs +    │      │ CSV of the│
///   │ groupbys  │      │ view      │
///   └──────────┘      └──────────┘
/// ```
///
/// Everything below the loader is pure and synchronous: the dataset is
/// loaded once per process, and each interaction recomputes the view and
/// its aggregates in full.

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
