// 📊 Summary Roll-up - revenue, cost, profit, top sellers, low stock
//
// Formula:
//   total_profit = Σ total - Σ (cost * quantity)
//   margin       = total_profit / total_revenue * 100   (0 when revenue is 0)
//
// Records without a cost field are NOT treated as free: the report tracks
// how much of the revenue is backed by cost data and withholds profit when
// none of it is.

use crate::config::ReportConfig;
use crate::ranking::{top_entities, RankMetric};
use crate::records::{finite_or_zero, InventoryItem, RankEntry, TimeBucket, TransactionRecord};
use crate::stock::{classify_stock, inventory_valuation, InventoryValuation, StockCounts};
use crate::timeline::{aggregate_by_time, Granularity};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// TIME WINDOW
// ============================================================================

/// Inclusive date range; an open end means unbounded on that side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl TimeWindow {
    pub fn all() -> Self {
        TimeWindow::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        TimeWindow {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Records without a timestamp only belong to the unbounded window
    pub fn contains(&self, timestamp: Option<NaiveDateTime>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(ts) = timestamp else {
            return false;
        };
        let date = ts.date();
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

// ============================================================================
// COST COVERAGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CostCoverage {
    /// Every record carries cost (vacuously true for no records)
    Complete,
    /// Some records carry cost; the rest add revenue without cost, so
    /// profit is overstated
    Partial,
    /// No record carries cost; profit cannot be computed
    Missing,
}

impl CostCoverage {
    fn of(records_with_cost: usize, transaction_count: usize) -> Self {
        if records_with_cost == transaction_count {
            CostCoverage::Complete
        } else if records_with_cost == 0 {
            CostCoverage::Missing
        } else {
            CostCoverage::Partial
        }
    }
}

/// `profit / revenue * 100`, defined as 0 for zero or non-finite input
pub fn profit_margin(total_profit: f64, total_revenue: f64) -> f64 {
    if total_revenue == 0.0 {
        0.0
    } else {
        finite_or_zero(total_profit / total_revenue * 100.0)
    }
}

// ============================================================================
// SUMMARY REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total_revenue: f64,
    pub total_cost: f64,

    /// `None` when records exist but none carries cost data
    pub total_profit: Option<f64>,

    /// Percentage; `None` exactly when `total_profit` is `None`
    pub profit_margin: Option<f64>,

    pub transaction_count: usize,
    pub average_transaction_value: f64,
    pub records_with_cost: usize,
    pub cost_coverage: CostCoverage,
    pub top_entities: Vec<RankEntry>,
    pub low_stock: Vec<InventoryItem>,

    #[serde(default)]
    pub window: TimeWindow,
}

impl SummaryReport {
    pub fn has_profit(&self) -> bool {
        self.total_profit.is_some()
    }

    pub fn summary_line(&self) -> String {
        let profit = match (self.total_profit, self.profit_margin) {
            (Some(p), Some(m)) => format!("profit ${:.2} ({:.1}%)", p, m),
            _ => "profit n/a (no cost data)".to_string(),
        };
        format!(
            "{} transactions, revenue ${:.2}, cost ${:.2}, {}, {} low-stock items",
            self.transaction_count,
            self.total_revenue,
            self.total_cost,
            profit,
            self.low_stock.len()
        )
    }
}

/// Roll up totals, top sellers by revenue, and low-stock items
pub fn build_summary(
    records: &[TransactionRecord],
    items: &[InventoryItem],
    rank_limit: usize,
    low_threshold: u64,
) -> SummaryReport {
    summarize(records, items, RankMetric::Revenue, rank_limit, low_threshold, TimeWindow::all())
}

/// Same as `build_summary`, restricted to records inside `window`
pub fn build_summary_in_window(
    records: &[TransactionRecord],
    items: &[InventoryItem],
    rank_limit: usize,
    low_threshold: u64,
    window: TimeWindow,
) -> SummaryReport {
    summarize(records, items, RankMetric::Revenue, rank_limit, low_threshold, window)
}

fn summarize(
    records: &[TransactionRecord],
    items: &[InventoryItem],
    rank_metric: RankMetric,
    rank_limit: usize,
    low_threshold: u64,
    window: TimeWindow,
) -> SummaryReport {
    let selected: Vec<TransactionRecord> = records
        .iter()
        .filter(|r| window.contains(r.timestamp))
        .cloned()
        .collect();

    let transaction_count = selected.len();
    let total_revenue = finite_or_zero(selected.iter().map(|r| r.total).sum());
    let total_cost = finite_or_zero(selected.iter().filter_map(|r| r.line_cost()).sum());
    let records_with_cost = selected.iter().filter(|r| r.has_cost()).count();
    let cost_coverage = CostCoverage::of(records_with_cost, transaction_count);

    let total_profit = match cost_coverage {
        CostCoverage::Missing => None,
        _ => Some(finite_or_zero(total_revenue - total_cost)),
    };
    let margin = total_profit.map(|p| profit_margin(p, total_revenue));

    if cost_coverage != CostCoverage::Complete {
        tracing::warn!(
            transactions = transaction_count,
            records_with_cost,
            ?cost_coverage,
            "cost data incomplete; profit is overstated or unavailable"
        );
    }

    let average_transaction_value = if transaction_count == 0 {
        0.0
    } else {
        total_revenue / transaction_count as f64
    };

    // Only the low band: out-of-stock items are reported separately
    let low_stock = classify_stock(items, low_threshold).low_stock;

    SummaryReport {
        total_revenue,
        total_cost,
        total_profit,
        profit_margin: margin,
        transaction_count,
        average_transaction_value,
        records_with_cost,
        cost_coverage,
        top_entities: top_entities(&selected, rank_metric, rank_limit),
        low_stock,
        window,
    }
}

// ============================================================================
// METRICS ENGINE
// ============================================================================

/// Everything a sales/inventory dashboard renders, computed in one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub summary: SummaryReport,
    pub granularity: Granularity,
    pub trend: Vec<TimeBucket>,
    pub stock_counts: StockCounts,
    pub out_of_stock: Vec<InventoryItem>,
    pub valuation: InventoryValuation,
}

pub struct MetricsEngine {
    pub config: ReportConfig,
}

impl MetricsEngine {
    pub fn new() -> Self {
        MetricsEngine {
            config: ReportConfig::default(),
        }
    }

    pub fn with_config(config: ReportConfig) -> Self {
        MetricsEngine { config }
    }

    pub fn summary(&self, records: &[TransactionRecord], items: &[InventoryItem]) -> SummaryReport {
        summarize(
            records,
            items,
            self.config.rank_metric,
            self.config.rank_limit,
            self.config.low_stock_threshold,
            self.config.window,
        )
    }

    /// Full dashboard report for the configured window
    pub fn report(&self, records: &[TransactionRecord], items: &[InventoryItem]) -> MetricsReport {
        let summary = self.summary(records, items);

        let windowed: Vec<TransactionRecord> = records
            .iter()
            .filter(|r| self.config.window.contains(r.timestamp))
            .cloned()
            .collect();
        let trend = aggregate_by_time(&windowed, self.config.granularity);

        let classification = classify_stock(items, self.config.low_stock_threshold);

        tracing::info!(
            transactions = summary.transaction_count,
            items = items.len(),
            buckets = trend.len(),
            "built metrics report"
        );

        MetricsReport {
            summary,
            granularity: self.config.granularity,
            trend,
            stock_counts: classification.counts(),
            out_of_stock: classification.out_of_stock,
            valuation: inventory_valuation(items),
        }
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::parse_timestamp;

    fn sale(name: &str, total: f64, date: &str) -> TransactionRecord {
        TransactionRecord::new(name, total, parse_timestamp(date))
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_summary_is_zeroed() {
        let report = build_summary(&[], &[], 5, 10);

        assert_eq!(report.total_revenue, 0.0);
        assert_eq!(report.total_cost, 0.0);
        assert_eq!(report.total_profit, Some(0.0));
        assert_eq!(report.profit_margin, Some(0.0));
        assert_eq!(report.transaction_count, 0);
        assert_eq!(report.average_transaction_value, 0.0);
        assert_eq!(report.cost_coverage, CostCoverage::Complete);
        assert!(report.top_entities.is_empty());
        assert!(report.low_stock.is_empty());
    }

    #[test]
    fn test_profit_and_margin() {
        let records = vec![
            sale("A", 100.0, "2024-01-01").with_line(2.0, 50.0).with_cost(30.0),
            sale("B", 50.0, "2024-01-02").with_line(5.0, 10.0).with_cost(4.0),
        ];

        let report = build_summary(&records, &[], 5, 10);

        assert_eq!(report.total_revenue, 150.0);
        assert_eq!(report.total_cost, 80.0);
        assert_eq!(report.total_profit, Some(70.0));
        let margin = report.profit_margin.unwrap();
        assert!((margin - 46.666_666).abs() < 1e-4);
        assert_eq!(report.average_transaction_value, 75.0);
        assert!(report.has_profit());
    }

    #[test]
    fn test_missing_cost_withholds_profit() {
        let records = vec![sale("A", 100.0, "2024-01-01").with_line(1.0, 100.0)];

        let report = build_summary(&records, &[], 5, 10);

        assert_eq!(report.cost_coverage, CostCoverage::Missing);
        assert_eq!(report.total_profit, None);
        assert_eq!(report.profit_margin, None);
        assert!(report.summary_line().contains("n/a"));
    }

    #[test]
    fn test_partial_cost_is_flagged() {
        let records = vec![
            sale("A", 100.0, "2024-01-01").with_line(1.0, 100.0).with_cost(60.0),
            sale("B", 100.0, "2024-01-01").with_line(1.0, 100.0),
        ];

        let report = build_summary(&records, &[], 5, 10);

        assert_eq!(report.cost_coverage, CostCoverage::Partial);
        assert_eq!(report.records_with_cost, 1);
        assert_eq!(report.total_profit, Some(140.0));
    }

    #[test]
    fn test_overflowing_inputs_stay_finite() {
        use crate::normalizer::normalize_transaction;
        use serde_json::json;

        let records = vec![
            normalize_transaction(&json!({ "name": "Big", "quantity": 1e200, "price": 1e200, "cost": 1e200 })),
            sale("Huge", f64::MAX, "2024-01-01").with_line(1.0, f64::MAX).with_cost(1.0),
            sale("Huge", f64::MAX, "2024-01-02").with_line(1.0, f64::MAX).with_cost(1.0),
        ];

        let report = build_summary(&records, &[], 5, 10);

        assert!(report.total_revenue.is_finite());
        assert!(report.total_cost.is_finite());
        assert!(report.total_profit.unwrap().is_finite());
        assert!(report.profit_margin.unwrap().is_finite());
        assert!(report.average_transaction_value.is_finite());
        assert_eq!(profit_margin(f64::MAX, f64::MIN_POSITIVE), 0.0);
        assert!(serde_json::to_string(&report).unwrap().contains("\"totalRevenue\":0.0"));
    }

    #[test]
    fn test_zero_revenue_margin_is_zero() {
        let records = vec![sale("Free", 0.0, "2024-01-01").with_line(1.0, 0.0).with_cost(2.0)];

        let report = build_summary(&records, &[], 5, 10);

        assert_eq!(report.total_profit, Some(-2.0));
        assert_eq!(report.profit_margin, Some(0.0));
        assert_eq!(profit_margin(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_low_stock_excludes_out_of_stock() {
        let items = vec![
            InventoryItem::new("Empty", 0),
            InventoryItem::new("Low", 3),
            InventoryItem::new("Edge", 10),
            InventoryItem::new("Plenty", 11),
        ];

        let report = build_summary(&[], &items, 5, 10);
        let names: Vec<&str> = report.low_stock.iter().map(|i| i.name.as_str()).collect();

        assert_eq!(names, vec!["Low", "Edge"]);
    }

    #[test]
    fn test_top_entities_delegated() {
        let records = vec![
            sale("Food", 25.50, "2024-01-15"),
            sale("Transport", 12.75, "2024-01-14"),
            sale("Food", 10.0, "2024-01-15"),
        ];

        let report = build_summary(&records, &[], 1, 10);

        assert_eq!(report.top_entities, vec![RankEntry { name: "Food".to_string(), metric: 35.50 }]);
    }

    #[test]
    fn test_window_filters_records() {
        let records = vec![
            sale("A", 10.0, "2024-01-31"),
            sale("B", 20.0, "2024-02-01"),
            sale("C", 30.0, "2024-02-29"),
            sale("D", 40.0, "2024-03-01"),
            TransactionRecord::new("E", 50.0, None),
        ];

        let window = TimeWindow::between(date("2024-02-01"), date("2024-02-29"));
        let report = build_summary_in_window(&records, &[], 5, 10, window);

        assert_eq!(report.transaction_count, 2);
        assert_eq!(report.total_revenue, 50.0);
        assert_eq!(report.window, window);

        let all = build_summary_in_window(&records, &[], 5, 10, TimeWindow::all());
        assert_eq!(all.transaction_count, 5);
    }

    #[test]
    fn test_half_open_window() {
        let window = TimeWindow {
            start: Some(date("2024-02-01")),
            end: None,
        };
        assert!(window.contains(parse_timestamp("2030-01-01")));
        assert!(!window.contains(parse_timestamp("2024-01-31")));
        assert!(!window.contains(None));
    }

    #[test]
    fn test_engine_report() {
        let config = ReportConfig {
            low_stock_threshold: 5,
            rank_limit: 2,
            granularity: Granularity::Month,
            ..ReportConfig::default()
        };
        let engine = MetricsEngine::with_config(config);

        let records = vec![
            sale("A", 10.0, "2024-01-10").with_line(1.0, 10.0).with_cost(5.0),
            sale("B", 20.0, "2024-02-10").with_line(2.0, 10.0).with_cost(5.0),
            sale("A", 15.0, "2024-02-11").with_line(1.0, 15.0).with_cost(5.0),
        ];
        let items = vec![
            InventoryItem::new("A", 0).with_pricing(10.0, 5.0),
            InventoryItem::new("B", 5).with_pricing(10.0, 5.0),
            InventoryItem::new("C", 50).with_pricing(2.0, 1.0),
        ];

        let report = engine.report(&records, &items);

        assert_eq!(report.trend.len(), 2);
        assert_eq!(report.trend[1].key, "2024-02");
        assert_eq!(report.trend[1].sum, 35.0);
        assert_eq!(report.stock_counts, StockCounts { out_of_stock: 1, low_stock: 1, healthy: 1 });
        assert_eq!(report.out_of_stock[0].name, "A");
        assert_eq!(report.summary.top_entities[0].name, "A");
        assert_eq!(report.summary.total_profit, Some(25.0));
        assert_eq!(report.valuation.retail_value, 150.0);
    }

    #[test]
    fn test_engine_rank_metric_quantity() {
        let config = ReportConfig {
            rank_metric: RankMetric::Quantity,
            ..ReportConfig::default()
        };
        let engine = MetricsEngine::with_config(config);

        let records = vec![
            sale("Big", 1000.0, "2024-01-10").with_line(1.0, 1000.0),
            sale("Many", 30.0, "2024-01-10").with_line(30.0, 1.0),
        ];

        let summary = engine.summary(&records, &[]);
        assert_eq!(summary.top_entities[0].name, "Many");
    }

    #[test]
    fn test_summary_is_deterministic() {
        let records = vec![
            sale("A", 1.25, "2024-01-10").with_cost(0.5).with_line(1.0, 1.25),
            sale("B", 2.5, "2024-01-11"),
        ];
        let items = vec![InventoryItem::new("X", 2)];

        let a = serde_json::to_string(&build_summary(&records, &items, 3, 5)).unwrap();
        let b = serde_json::to_string(&build_summary(&records, &items, 3, 5)).unwrap();
        assert_eq!(a, b);
    }
}
