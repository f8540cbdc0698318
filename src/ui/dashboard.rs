use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::data::model::{Dataset, Record};
use crate::state::AppState;

/// Histogram bucket count for the delivery-volume chart.  Binning is done
/// here, not in the aggregator: the data layer hands over the raw column.
const VOLUME_BINS: usize = 30;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the dashboard body: KPI row, charts, data table, summary line.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    if state.dataset().is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data to display — check the source workbook.");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Key Performance Indicators");
            kpi_row(ui, state);
            ui.separator();

            ui.heading("Operational Insights");
            ui.columns(2, |cols: &mut [Ui]| {
                status_chart(&mut cols[0], state);
                trend_chart(&mut cols[1], state);
            });
            ui.columns(2, |cols: &mut [Ui]| {
                share_chart(&mut cols[0], state);
                volume_histogram(&mut cols[1], state);
            });
            revenue_chart(ui, state);
            ui.separator();

            data_table(ui, state);
            executive_summary(ui, state);
        });
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, state: &AppState) {
    let k = &state.kpis;
    let cards = [
        ("Total Orders", k.total_orders.to_string()),
        ("Fulfilled", k.fulfilled.to_string()),
        ("Pending", k.pending.to_string()),
        ("Cancelled", k.cancelled.to_string()),
        ("Fulfillment Rate", format!("{:.1}%", k.fulfillment_rate)),
    ];

    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(cards) {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(label);
                    ui.heading(value);
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn status_chart(ui: &mut Ui, state: &AppState) {
    if !state.dataset().schema.has_status {
        return;
    }
    ui.strong("Order Status Distribution");

    let labels: Vec<String> = state.status_counts.keys().cloned().collect();
    let bars: Vec<Bar> = state
        .status_counts
        .iter()
        .enumerate()
        .map(|(i, (status, &count))| {
            Bar::new(i as f64, count as f64)
                .name(status)
                .fill(state.status_colors.color_for(status))
                .width(0.6)
        })
        .collect();

    Plot::new("status_distribution")
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| index_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn trend_chart(ui: &mut Ui, state: &AppState) {
    if !state.dataset().schema.has_date || state.monthly_trend.is_empty() {
        return;
    }
    ui.strong("Monthly Order Trend");

    let labels: Vec<String> = state.monthly_trend.iter().map(|(m, _)| m.clone()).collect();
    let points: PlotPoints = state
        .monthly_trend
        .iter()
        .enumerate()
        .map(|(i, (_, count))| [i as f64, *count as f64])
        .collect();

    Plot::new("monthly_trend")
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| index_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Orders").fill(0.0).width(2.0));
        });
}

/// Share of each status as a percentage of the filtered total.
fn share_chart(ui: &mut Ui, state: &AppState) {
    if !state.dataset().schema.has_status || state.kpis.total_orders == 0 {
        return;
    }
    ui.strong("Fulfillment Status Share");

    let total = state.kpis.total_orders as f64;
    let bars: Vec<Bar> = state
        .status_counts
        .iter()
        .enumerate()
        .map(|(i, (status, &count))| {
            Bar::new(i as f64, count as f64 / total * 100.0)
                .name(status)
                .fill(state.status_colors.color_for(status))
                .width(0.6)
        })
        .collect();

    Plot::new("status_share")
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn volume_histogram(ui: &mut Ui, state: &AppState) {
    let Some(volumes) = &state.volumes else {
        return;
    };
    if volumes.is_empty() {
        return;
    }
    ui.strong("Distribution of Delivery Volume");

    Plot::new("volume_histogram")
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(histogram_bars(volumes, VOLUME_BINS)));
        });
}

fn revenue_chart(ui: &mut Ui, state: &AppState) {
    let Some(revenue) = &state.revenue_by_region else {
        return;
    };
    if revenue.is_empty() {
        return;
    }
    ui.strong("Revenue by Region");

    let labels: Vec<String> = revenue.keys().cloned().collect();
    let bars: Vec<Bar> = revenue
        .iter()
        .enumerate()
        .map(|(i, (region, &total))| {
            Bar::new(i as f64, total)
                .name(region)
                .fill(state.region_colors.color_for(region))
                .width(0.6)
        })
        .collect();

    Plot::new("revenue_by_region")
        .height(240.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| index_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Label integer positions with their category name, everything else blank.
fn index_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 0.001 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Bucket raw values into equal-width bins.
fn histogram_bars(values: &[f64], bins: usize) -> Vec<Bar> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }

    let span = max - min;
    if span <= f64::EPSILON {
        // All values identical: one bar.
        return vec![Bar::new(min, values.len() as f64).width(1.0)];
    }

    let width = span / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .map(|(i, count)| {
            Bar::new(min + (i as f64 + 0.5) * width, count as f64).width(width * 0.95)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Data table
// ---------------------------------------------------------------------------

fn data_table(ui: &mut Ui, state: &AppState) {
    ui.strong("Filtered Orders");

    let dataset = state.dataset();
    let headers = table_headers(dataset);
    if headers.is_empty() {
        ui.weak("No recognised columns in the source.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::remainder().at_least(80.0), headers.len())
        .max_scroll_height(360.0)
        .header(20.0, |mut header| {
            for title in &headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(*title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, state.visible_indices.len(), |mut row| {
                let rec = &dataset.records[state.visible_indices[row.index()]];
                for title in &headers {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell_text(rec, title));
                    });
                }
            });
        });
}

fn table_headers(dataset: &Dataset) -> Vec<&'static str> {
    let schema = dataset.schema;
    let mut headers = Vec::new();
    if schema.has_date {
        headers.push("Date");
    }
    if schema.has_status {
        headers.push("Status");
    }
    if schema.has_region {
        headers.push("Region");
    }
    if schema.has_segment {
        headers.push("Customer_Segment");
    }
    if schema.has_volume {
        headers.push("Volume_Barrels");
    }
    if schema.has_revenue {
        headers.push("Revenue_USD");
    }
    headers
}

fn cell_text(rec: &Record, column: &str) -> String {
    match column {
        "Date" => rec
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        "Status" => rec.status.clone().unwrap_or_default(),
        "Region" => rec.region.clone().unwrap_or_default(),
        "Customer_Segment" => rec.customer_segment.clone().unwrap_or_default(),
        "Volume_Barrels" => rec
            .volume_barrels
            .map(|v| format!("{v:.1}"))
            .unwrap_or_default(),
        "Revenue_USD" => rec
            .revenue_usd
            .map(|v| format!("{v:.2}"))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Executive summary
// ---------------------------------------------------------------------------

fn executive_summary(ui: &mut Ui, state: &AppState) {
    ui.add_space(8.0);
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(RichText::new("Executive Insight").strong());
        ui.label(format!(
            "Current fulfillment rate is {:.1}%. Monitor cancelled orders and \
             regional revenue concentration to improve operational efficiency.",
            state.kpis.fulfillment_rate
        ));
    });
}
