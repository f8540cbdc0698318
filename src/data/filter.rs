use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// FilterSelection – the active filter state
// ---------------------------------------------------------------------------

/// User-selected predicates: status membership, region membership, and an
/// inclusive date interval.  Initialised to "everything selected, full date
/// range"; owned by the session and never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub statuses: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl FilterSelection {
    /// The default selection for a dataset: every distinct status and region
    /// selected, date bounds spanning the full dataset.
    pub fn all_of(dataset: &Dataset) -> Self {
        let (date_start, date_end) = match dataset.date_range {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };
        FilterSelection {
            statuses: dataset.statuses.iter().cloned().collect(),
            regions: dataset.regions.iter().cloned().collect(),
            date_start,
            date_end,
        }
    }

    /// The effective inclusive date interval, or `None` when the interval is
    /// malformed (a missing bound, or end before start).  A malformed
    /// interval disables the date predicate entirely rather than erroring —
    /// deliberate leniency carried over from the interactive widget, where a
    /// half-picked range is a transient state, not a mistake.
    pub fn date_interval(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.date_start, self.date_end) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – read-only view over the passing rows
// ---------------------------------------------------------------------------

/// The subset of a [`Dataset`] matching all active predicates, as a borrowed
/// index view.  Never mutates the source; recomputed whenever the selection
/// changes.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// Iterate over the passing records in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.indices.iter().map(|&i| &self.dataset.records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Predicate application
// ---------------------------------------------------------------------------

/// Apply all active predicates (ANDed) and return the passing rows.
///
/// A predicate is active only when its column exists in the schema:
/// * status / region — row value must be a member of the selected set
/// * date — row date must be present and inside the inclusive interval;
///   a malformed interval deactivates the predicate
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let interval = if dataset.schema.has_date {
        let interval = selection.date_interval();
        if interval.is_none() {
            if let (Some(start), Some(end)) = (selection.date_start, selection.date_end) {
                log::debug!("date interval [{start}, {end}] is reversed; skipping date filter");
            }
        }
        interval
    } else {
        None
    };

    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| row_passes(rec, dataset, selection, interval))
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, indices }
}

fn row_passes(
    rec: &Record,
    dataset: &Dataset,
    selection: &FilterSelection,
    interval: Option<(NaiveDate, NaiveDate)>,
) -> bool {
    if dataset.schema.has_status {
        match &rec.status {
            Some(status) if selection.statuses.contains(status) => {}
            _ => return false,
        }
    }

    if dataset.schema.has_region {
        match &rec.region {
            Some(region) if selection.regions.contains(region) => {}
            _ => return false,
        }
    }

    if let Some((start, end)) = interval {
        // An active date filter excludes rows without a date.
        match rec.date {
            Some(d) if start <= d && d <= end => {}
            _ => return false,
        }
    }

    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
