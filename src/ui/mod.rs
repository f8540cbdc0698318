/// Presentation adapter: renders the filtered view, KPIs, and grouped
/// aggregates.  Nothing in `data/` depends on this module.
pub mod dashboard;
pub mod panels;
