//! Writes a deterministic sample order workbook to `data/orders.xlsx` so the
//! dashboard has something to show out of the box.  A few cells are left
//! blank on purpose to exercise the Unknown-backfill and absent-date paths.

use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;

const OUTPUT_PATH: &str = "data/orders.xlsx";
const N_ORDERS: usize = 500;

/// Minimal deterministic PRNG (splitmix64)
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Pick by cumulative weight.
    fn pick_weighted<'a>(&mut self, items: &'a [(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for (item, weight) in items {
            if roll < *weight {
                return item;
            }
            roll -= weight;
        }
        items[items.len() - 1].0
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let statuses: &[(&str, f64)] = &[
        ("Completed", 0.62),
        ("Pending", 0.23),
        ("Cancelled", 0.15),
    ];
    let regions = ["North", "South", "East", "West"];
    let segments = ["Industrial", "Commercial", "Government", "Retail"];

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let day_span = 730; // two years

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let headers = [
        "Date",
        "Status",
        "Region",
        "Customer_Segment",
        "Volume_Barrels",
        "Revenue_USD",
    ];
    for (col, title) in headers.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *title)
            .expect("write header");
    }

    for i in 0..N_ORDERS {
        let row = (i + 1) as u32;

        // ~3% of dates left blank so the loader's absent-date path runs.
        if rng.next_f64() > 0.03 {
            let date = start + chrono::Days::new(rng.next_u64() % day_span);
            sheet
                .write_string(row, 0, date.format("%Y-%m-%d").to_string())
                .expect("write date");
        }

        // ~2% blank statuses become "Unknown" at load time.
        if rng.next_f64() > 0.02 {
            sheet
                .write_string(row, 1, rng.pick_weighted(statuses))
                .expect("write status");
        }

        sheet
            .write_string(row, 2, *rng.pick(&regions))
            .expect("write region");
        sheet
            .write_string(row, 3, *rng.pick(&segments))
            .expect("write segment");

        let volume = 50.0 + rng.next_f64() * 950.0;
        let price_per_barrel = 55.0 + rng.next_f64() * 40.0;
        sheet
            .write_number(row, 4, (volume * 10.0).round() / 10.0)
            .expect("write volume");
        sheet
            .write_number(row, 5, (volume * price_per_barrel * 100.0).round() / 100.0)
            .expect("write revenue");
    }

    std::fs::create_dir_all("data").expect("create data directory");
    workbook.save(OUTPUT_PATH).expect("save workbook");

    println!("Wrote {N_ORDERS} orders to {OUTPUT_PATH}");
}
