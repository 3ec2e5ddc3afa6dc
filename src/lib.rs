// Sales Metrics - Core Library
// Normalizes sale / invoice / product records and derives dashboard metrics.
// Shared by the CLI, the API server, and tests.

pub mod records;
pub mod normalizer;
pub mod timeline;
pub mod ranking;
pub mod stock;
pub mod summary;
pub mod loader;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use records::{
    TransactionRecord, InventoryItem, TimeBucket, RankEntry, UNKNOWN_KEY,
};
pub use normalizer::{
    Normalizer, FieldAliases, FieldIssue, IssueKind, RecordIssue, NormalizedBatch,
    normalize_transaction, normalize_transaction_with_issues,
    normalize_item, normalize_item_with_issues,
    normalize_transactions, normalize_items,
    coerce_number, parse_timestamp,
};
pub use timeline::{aggregate_by_time, bucket_key, Granularity};
pub use ranking::{top_entities, RankMetric};
pub use stock::{
    classify_stock, stock_level, inventory_valuation,
    StockClassification, StockCounts, StockLevel, InventoryValuation,
};
pub use summary::{
    build_summary, build_summary_in_window, profit_margin,
    SummaryReport, CostCoverage, TimeWindow, MetricsEngine, MetricsReport,
};
pub use loader::{load_records, parse_json_records, InputFormat};
pub use config::ReportConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
