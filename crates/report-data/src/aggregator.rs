//! Summary aggregation over the cleaned sales table.
//!
//! A pure function of its input: the same cleaned table always produces an
//! identical [`SalesSummary`], including ordering, so rendered reports are
//! reproducible.

use std::collections::{BTreeMap, HashMap};

use report_core::models::{
    BreakdownEntry, DailyPoint, GroupStats, SalesRecord, SalesSummary, Totals,
};

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that computes the aggregate view of a cleaned table.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Compute the full summary: totals, the three breakdowns, the top-N
    /// product ranking and the daily trend.
    ///
    /// An empty table yields all-zero totals and empty collections, not an
    /// error.
    pub fn aggregate(records: &[SalesRecord], top_n: usize) -> SalesSummary {
        let mut top_products = Self::breakdown(records, |r| r.product.as_str());
        top_products.truncate(top_n);

        SalesSummary {
            totals: Self::totals(records),
            by_category: Self::breakdown(records, |r| r.category.as_str()),
            by_region: Self::breakdown(records, |r| r.region.as_str()),
            by_salesperson: Self::breakdown(records, |r| r.salesperson.as_str()),
            top_products,
            daily_trend: Self::daily_trend(records),
        }
    }

    /// Single-pass overall totals.
    pub fn totals(records: &[SalesRecord]) -> Totals {
        let mut totals = Totals::default();
        for record in records {
            totals.total_revenue += record.revenue;
            totals.total_quantity += record.quantity;
            totals.order_count += 1;
            totals.date_range = Some(match totals.date_range {
                None => (record.date, record.date),
                Some((start, end)) => (start.min(record.date), end.max(record.date)),
            });
        }
        if totals.order_count > 0 {
            totals.average_order_value = totals.total_revenue / totals.order_count as f64;
        }
        totals
    }

    /// Partition `records` by `label_fn` and accumulate per-group stats.
    ///
    /// Groups are ordered by descending revenue; ties break by ascending
    /// label so the output is deterministic.
    pub fn breakdown<'a>(
        records: &'a [SalesRecord],
        label_fn: impl Fn(&'a SalesRecord) -> &'a str,
    ) -> Vec<BreakdownEntry> {
        let mut groups: HashMap<&str, GroupStats> = HashMap::new();
        for record in records {
            groups.entry(label_fn(record)).or_default().add_record(record);
        }

        let mut entries: Vec<BreakdownEntry> = groups
            .into_iter()
            .map(|(label, stats)| BreakdownEntry {
                label: label.to_string(),
                stats,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.stats
                .revenue
                .total_cmp(&a.stats.revenue)
                .then_with(|| a.label.cmp(&b.label))
        });
        entries
    }

    /// Per-day revenue and quantity, ascending by date.
    pub fn daily_trend(records: &[SalesRecord]) -> Vec<DailyPoint> {
        // BTreeMap keeps the days sorted.
        let mut days: BTreeMap<chrono::NaiveDate, (f64, u64)> = BTreeMap::new();
        for record in records {
            let day = days.entry(record.date).or_insert((0.0, 0));
            day.0 += record.revenue;
            day.1 += record.quantity;
        }

        days.into_iter()
            .map(|(date, (revenue, quantity))| DailyPoint {
                date,
                revenue,
                quantity,
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_record(
        date: &str,
        category: &str,
        region: &str,
        salesperson: &str,
        product: &str,
        quantity: u64,
        unit_price: f64,
    ) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: category.to_string(),
            region: region.to_string(),
            salesperson: salesperson.to_string(),
            product: product.to_string(),
            quantity,
            unit_price,
            revenue: quantity as f64 * unit_price,
        }
    }

    fn sample_records() -> Vec<SalesRecord> {
        vec![
            make_record("2024-01-05", "A", "East", "Kim", "Widget", 2, 10.0),
            make_record("2024-01-05", "B", "West", "Lee", "Gadget", 1, 50.0),
            make_record("2024-01-06", "A", "East", "Kim", "Widget", 3, 10.0),
            make_record("2024-01-07", "A", "West", "Lee", "Gizmo", 4, 5.0),
        ]
    }

    // ── totals ────────────────────────────────────────────────────────────────

    #[test]
    fn test_totals_sums_revenue_and_quantity() {
        let totals = SalesAggregator::totals(&sample_records());

        assert!((totals.total_revenue - 120.0).abs() < 1e-9);
        assert_eq!(totals.total_quantity, 10);
        assert_eq!(totals.order_count, 4);
        assert!((totals.average_order_value - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_totals_date_range() {
        let totals = SalesAggregator::totals(&sample_records());
        assert_eq!(
            totals.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            ))
        );
    }

    #[test]
    fn test_totals_empty_is_all_zero() {
        let totals = SalesAggregator::totals(&[]);
        assert_eq!(totals.order_count, 0);
        assert_eq!(totals.total_quantity, 0);
        assert_eq!(totals.average_order_value, 0.0);
        assert!(totals.date_range.is_none());
    }

    // ── breakdown ─────────────────────────────────────────────────────────────

    #[test]
    fn test_breakdown_groups_by_category() {
        let entries = SalesAggregator::breakdown(&sample_records(), |r| r.category.as_str());

        assert_eq!(entries.len(), 2);
        // Category A: 20 + 30 + 20 = 70 revenue; B: 50.
        assert_eq!(entries[0].label, "A");
        assert!((entries[0].stats.revenue - 70.0).abs() < 1e-9);
        assert_eq!(entries[0].stats.orders, 3);
        assert_eq!(entries[1].label, "B");
    }

    #[test]
    fn test_breakdown_two_rows_same_label_merge() {
        let records = vec![
            make_record("2024-01-05", "X", "East", "Kim", "Widget", 5, 10.0),
            make_record("2024-01-06", "X", "West", "Lee", "Gadget", 3, 10.0),
        ];
        let entries = SalesAggregator::breakdown(&records, |r| r.category.as_str());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "X");
        assert!((entries[0].stats.revenue - 80.0).abs() < 1e-9);
        assert_eq!(entries[0].stats.orders, 2);
    }

    #[test]
    fn test_breakdown_orders_by_revenue_then_label() {
        let records = vec![
            make_record("2024-01-05", "Zeta", "East", "Kim", "P1", 1, 10.0),
            make_record("2024-01-05", "Alpha", "East", "Kim", "P2", 1, 10.0),
            make_record("2024-01-05", "Mid", "East", "Kim", "P3", 1, 99.0),
        ];
        let entries = SalesAggregator::breakdown(&records, |r| r.category.as_str());

        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        // Highest revenue first; the 10.0 tie breaks lexically.
        assert_eq!(labels, vec!["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn test_breakdown_partitions_cleaned_set_exactly() {
        let records = sample_records();
        let entries = SalesAggregator::breakdown(&records, |r| r.region.as_str());

        let total_orders: u64 = entries.iter().map(|e| e.stats.orders).sum();
        let total_revenue: f64 = entries.iter().map(|e| e.stats.revenue).sum();
        assert_eq!(total_orders, records.len() as u64);
        let direct: f64 = records.iter().map(|r| r.revenue).sum();
        assert!((total_revenue - direct).abs() < 1e-9);
    }

    // ── top products ──────────────────────────────────────────────────────────

    #[test]
    fn test_top_n_truncates_to_n() {
        let summary = SalesAggregator::aggregate(&sample_records(), 2);

        assert_eq!(summary.top_products.len(), 2);
        // Widget: 50, Gadget: 50, Gizmo: 20. Tie breaks lexically.
        assert_eq!(summary.top_products[0].label, "Gadget");
        assert_eq!(summary.top_products[1].label, "Widget");
    }

    #[test]
    fn test_top_n_returns_all_when_fewer_products() {
        let summary = SalesAggregator::aggregate(&sample_records(), 10);
        assert_eq!(summary.top_products.len(), 3);
    }

    #[test]
    fn test_top_n_dominates_excluded_entries() {
        let summary = SalesAggregator::aggregate(&sample_records(), 2);
        let cutoff = summary
            .top_products
            .iter()
            .map(|e| e.stats.revenue)
            .fold(f64::INFINITY, f64::min);

        let all = SalesAggregator::breakdown(&sample_records(), |r| r.product.as_str());
        for excluded in all.iter().skip(2) {
            assert!(excluded.stats.revenue <= cutoff);
        }
    }

    // ── daily trend ───────────────────────────────────────────────────────────

    #[test]
    fn test_daily_trend_sorted_and_summed() {
        let trend = SalesAggregator::daily_trend(&sample_records());

        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        // Jan 5 holds two rows: 20 + 50.
        assert!((trend[0].revenue - 70.0).abs() < 1e-9);
        assert_eq!(trend[0].quantity, 3);
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_aggregate_empty_input() {
        let summary = SalesAggregator::aggregate(&[], 10);

        assert_eq!(summary.totals.order_count, 0);
        assert_eq!(summary.totals.average_order_value, 0.0);
        assert!(summary.by_category.is_empty());
        assert!(summary.by_region.is_empty());
        assert!(summary.by_salesperson.is_empty());
        assert!(summary.top_products.is_empty());
        assert!(summary.daily_trend.is_empty());
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let records = sample_records();
        let first = SalesAggregator::aggregate(&records, 10);
        let second = SalesAggregator::aggregate(&records, 10);
        assert_eq!(first, second);

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }
}
