use std::collections::BTreeMap;

use chrono::Datelike;

use super::filter::FilteredView;
use super::model::{STATUS_CANCELLED, STATUS_COMPLETED, STATUS_PENDING};

// ---------------------------------------------------------------------------
// KpiSet – scalar summary metrics
// ---------------------------------------------------------------------------

/// The scalar KPIs shown in the metric row.  A pure function of the current
/// [`FilteredView`]; recomputed on every filter change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KpiSet {
    pub total_orders: usize,
    pub fulfilled: usize,
    pub pending: usize,
    pub cancelled: usize,
    /// Percentage of orders with status "Completed"; exactly `0.0` when the
    /// view is empty.
    pub fulfillment_rate: f64,
}

/// Compute the KPI row.  Status matching is exact and case-sensitive;
/// statuses outside the three well-known values count toward the total only.
pub fn kpis(view: &FilteredView) -> KpiSet {
    let mut kpi = KpiSet {
        total_orders: view.len(),
        ..KpiSet::default()
    };

    for rec in view.records() {
        match rec.status.as_deref() {
            Some(STATUS_COMPLETED) => kpi.fulfilled += 1,
            Some(STATUS_PENDING) => kpi.pending += 1,
            Some(STATUS_CANCELLED) => kpi.cancelled += 1,
            _ => {}
        }
    }

    if kpi.total_orders > 0 {
        kpi.fulfillment_rate = kpi.fulfilled as f64 / kpi.total_orders as f64 * 100.0;
    }
    kpi
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

/// Row count per distinct status value.  Empty without a status column.
pub fn status_distribution(view: &FilteredView) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    if !view.dataset().schema.has_status {
        return counts;
    }
    for rec in view.records() {
        if let Some(status) = &rec.status {
            *counts.entry(status.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Order count per calendar month over rows with a present date, as
/// `("YYYY-MM", count)` pairs in ascending chronological order.  Months with
/// no rows are omitted, not zero-filled.
pub fn monthly_trend(view: &FilteredView) -> Vec<(String, usize)> {
    if !view.dataset().schema.has_date {
        return Vec::new();
    }

    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for rec in view.records() {
        if let Some(d) = rec.date {
            *counts.entry((d.year(), d.month())).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((year, month), n)| (format!("{year:04}-{month:02}"), n))
        .collect()
}

/// Total revenue per region.  `None` unless both the `Region` and
/// `Revenue_USD` columns exist; rows with an absent revenue contribute
/// nothing.
pub fn revenue_by_region(view: &FilteredView) -> Option<BTreeMap<String, f64>> {
    let schema = view.dataset().schema;
    if !(schema.has_region && schema.has_revenue) {
        return None;
    }

    let mut totals = BTreeMap::new();
    for rec in view.records() {
        if let (Some(region), Some(revenue)) = (&rec.region, rec.revenue_usd) {
            *totals.entry(region.clone()).or_insert(0.0) += revenue;
        }
    }
    Some(totals)
}

/// The raw delivery-volume column, for external binning.  The aggregator does
/// not bin; histogram bucketing is a presentation concern.
pub fn volume_distribution(view: &FilteredView) -> Option<Vec<f64>> {
    if !view.dataset().schema.has_volume {
        return None;
    }
    Some(view.records().filter_map(|r| r.volume_barrels).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::{FilterSelection, apply};
    use crate::data::model::{Dataset, Record, Schema};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(status: &str, region: &str, day: &str, revenue: f64) -> Record {
        Record {
            date: Some(date(day)),
            status: Some(status.into()),
            region: Some(region.into()),
            revenue_usd: Some(revenue),
            ..Record::default()
        }
    }

    /// The reference scenario from the dashboard's acceptance checks.
    fn sample_dataset() -> Dataset {
        let schema = Schema {
            has_date: true,
            has_status: true,
            has_region: true,
            has_revenue: true,
            ..Schema::default()
        };
        Dataset::from_records(
            vec![
                record("Completed", "West", "2024-01-15", 100.0),
                record("Pending", "East", "2024-01-20", 50.0),
                record("Cancelled", "West", "2024-02-01", 75.0),
            ],
            schema,
        )
    }

    #[test]
    fn kpis_on_the_unfiltered_scenario() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all_of(&ds));
        let kpi = kpis(&view);

        assert_eq!(kpi.total_orders, 3);
        assert_eq!(kpi.fulfilled, 1);
        assert_eq!(kpi.pending, 1);
        assert_eq!(kpi.cancelled, 1);
        assert!((kpi.fulfillment_rate - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn kpis_with_only_completed_selected() {
        let ds = sample_dataset();
        let mut sel = FilterSelection::all_of(&ds);
        sel.statuses = ["Completed".to_string()].into();

        let kpi = kpis(&apply(&ds, &sel));
        assert_eq!(kpi.total_orders, 1);
        assert_eq!(kpi.fulfillment_rate, 100.0);
    }

    #[test]
    fn empty_view_has_zero_rate_not_a_division_by_zero() {
        let ds = Dataset::empty();
        let view = apply(&ds, &FilterSelection::default());
        let kpi = kpis(&view);

        assert_eq!(kpi.total_orders, 0);
        assert_eq!(kpi.fulfillment_rate, 0.0);
    }

    #[test]
    fn rate_stays_in_bounds_with_unmatched_statuses() {
        let schema = Schema {
            has_status: true,
            ..Schema::default()
        };
        let records = vec![
            Record {
                status: Some("Completed".into()),
                ..Record::default()
            },
            Record {
                status: Some("Unknown".into()),
                ..Record::default()
            },
            Record {
                status: Some("completed".into()), // case mismatch: not fulfilled
                ..Record::default()
            },
        ];
        let ds = Dataset::from_records(records, schema);
        let kpi = kpis(&apply(&ds, &FilterSelection::all_of(&ds)));

        assert_eq!(kpi.total_orders, 3);
        assert_eq!(kpi.fulfilled, 1);
        assert!(kpi.fulfillment_rate >= 0.0 && kpi.fulfillment_rate <= 100.0);
    }

    #[test]
    fn status_distribution_counts_every_value() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all_of(&ds));
        let dist = status_distribution(&view);

        assert_eq!(dist.len(), 3);
        assert_eq!(dist["Completed"], 1);
        assert_eq!(dist["Pending"], 1);
        assert_eq!(dist["Cancelled"], 1);
    }

    #[test]
    fn monthly_trend_matches_the_scenario() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all_of(&ds));
        let trend = monthly_trend(&view);

        assert_eq!(
            trend,
            vec![("2024-01".to_string(), 2), ("2024-02".to_string(), 1)]
        );
    }

    #[test]
    fn monthly_trend_is_strictly_ordered_with_no_zero_entries() {
        let schema = Schema {
            has_date: true,
            ..Schema::default()
        };
        let days = [
            "2023-12-01",
            "2024-03-10",
            "2023-12-25",
            "2024-01-05",
            "2024-03-11",
        ];
        let records = days
            .iter()
            .map(|d| Record {
                date: Some(date(d)),
                ..Record::default()
            })
            .collect();
        let ds = Dataset::from_records(records, schema);
        let trend = monthly_trend(&apply(&ds, &FilterSelection::all_of(&ds)));

        assert!(trend.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(trend.iter().all(|(_, n)| *n > 0));
        // February has no rows and must be omitted.
        assert!(!trend.iter().any(|(m, _)| m == "2024-02"));
    }

    #[test]
    fn revenue_by_region_matches_the_scenario() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all_of(&ds));
        let revenue = revenue_by_region(&view).unwrap();

        assert_eq!(revenue["West"], 175.0);
        assert_eq!(revenue["East"], 50.0);
    }

    #[test]
    fn revenue_grouping_equals_per_region_subsets() {
        let ds = sample_dataset();
        let all = FilterSelection::all_of(&ds);
        let grouped = revenue_by_region(&apply(&ds, &all)).unwrap();

        for region in &ds.regions {
            let mut sel = all.clone();
            sel.regions = [region.clone()].into();
            let subset = apply(&ds, &sel);
            let subtotal: f64 = subset.records().filter_map(|r| r.revenue_usd).sum();
            assert_eq!(grouped[region], subtotal);
        }
    }

    #[test]
    fn aggregates_degrade_without_their_columns() {
        let ds = Dataset::from_records(vec![Record::default()], Schema::default());
        let view = apply(&ds, &FilterSelection::all_of(&ds));

        assert!(status_distribution(&view).is_empty());
        assert!(monthly_trend(&view).is_empty());
        assert_eq!(revenue_by_region(&view), None);
        assert_eq!(volume_distribution(&view), None);
    }

    #[test]
    fn volume_distribution_passes_through_raw_values() {
        let schema = Schema {
            has_volume: true,
            ..Schema::default()
        };
        let records = vec![
            Record {
                volume_barrels: Some(12.5),
                ..Record::default()
            },
            Record {
                volume_barrels: None,
                ..Record::default()
            },
            Record {
                volume_barrels: Some(40.0),
                ..Record::default()
            },
        ];
        let ds = Dataset::from_records(records, schema);
        let volumes = volume_distribution(&apply(&ds, &FilterSelection::all_of(&ds))).unwrap();
        assert_eq!(volumes, vec![12.5, 40.0]);
    }
}
