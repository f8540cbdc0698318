use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::aggregate::{self, KpiSet};
use crate::data::filter::{FilterSelection, FilteredView, apply};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The dataset is loaded once in `main` and read-only afterwards; every
/// interaction mutates the [`FilterSelection`] and synchronously recomputes
/// the visible rows and all aggregates before the next frame renders.
pub struct AppState {
    /// Process-lifetime dataset (possibly empty when loading failed).
    dataset: Dataset,

    /// Active filter selections.
    pub selection: FilterSelection,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    // Aggregates over the current filtered view (cached).
    pub kpis: KpiSet,
    pub status_counts: BTreeMap<String, usize>,
    pub monthly_trend: Vec<(String, usize)>,
    pub revenue_by_region: Option<BTreeMap<String, f64>>,
    pub volumes: Option<Vec<f64>>,

    /// Stable series colours for the charts.
    pub status_colors: ColorMap,
    pub region_colors: ColorMap,

    /// Load or export problem surfaced in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest the startup dataset, initialise filters, and compute the
    /// first round of aggregates.
    pub fn new(dataset: Dataset, status_message: Option<String>) -> Self {
        let selection = FilterSelection::all_of(&dataset);
        let status_colors = ColorMap::new(&dataset.statuses);
        let region_colors = ColorMap::new(&dataset.regions);

        let mut state = AppState {
            dataset,
            selection,
            visible_indices: Vec::new(),
            kpis: KpiSet::default(),
            status_counts: BTreeMap::new(),
            monthly_trend: Vec::new(),
            revenue_by_region: None,
            volumes: None,
            status_colors,
            region_colors,
            status_message,
        };
        state.refilter();
        state
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The current filtered view, rebuilt from the active selection.
    pub fn filtered(&self) -> FilteredView<'_> {
        apply(&self.dataset, &self.selection)
    }

    /// Recompute visible rows and every aggregate after a filter change.
    pub fn refilter(&mut self) {
        let view = apply(&self.dataset, &self.selection);
        self.kpis = aggregate::kpis(&view);
        self.status_counts = aggregate::status_distribution(&view);
        self.monthly_trend = aggregate::monthly_trend(&view);
        self.revenue_by_region = aggregate::revenue_by_region(&view);
        self.volumes = aggregate::volume_distribution(&view);
        self.visible_indices = view.into_indices();
    }

    /// Toggle a single status value in the selection.
    pub fn toggle_status(&mut self, value: &str) {
        if !self.selection.statuses.remove(value) {
            self.selection.statuses.insert(value.to_string());
        }
        self.refilter();
    }

    /// Toggle a single region value in the selection.
    pub fn toggle_region(&mut self, value: &str) {
        if !self.selection.regions.remove(value) {
            self.selection.regions.insert(value.to_string());
        }
        self.refilter();
    }

    pub fn select_all_statuses(&mut self) {
        self.selection.statuses = self.dataset.statuses.iter().cloned().collect();
        self.refilter();
    }

    pub fn select_no_statuses(&mut self) {
        self.selection.statuses.clear();
        self.refilter();
    }

    pub fn select_all_regions(&mut self) {
        self.selection.regions = self.dataset.regions.iter().cloned().collect();
        self.refilter();
    }

    pub fn select_no_regions(&mut self) {
        self.selection.regions.clear();
        self.refilter();
    }

    pub fn set_date_start(&mut self, date: NaiveDate) {
        self.selection.date_start = Some(date);
        self.refilter();
    }

    pub fn set_date_end(&mut self, date: NaiveDate) {
        self.selection.date_end = Some(date);
        self.refilter();
    }

    /// Restore the date bounds to the dataset's full range.
    pub fn reset_date_range(&mut self) {
        let (start, end) = match self.dataset.date_range {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };
        self.selection.date_start = start;
        self.selection.date_end = end;
        self.refilter();
    }
}
