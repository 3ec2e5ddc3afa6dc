// ⚙️ Report Configuration
// Thresholds and limits that differ per deployment (the low-stock threshold
// was 5 in one dashboard and 10 in another), loaded from JSON and then
// overridden from the environment.

use crate::ranking::RankMetric;
use crate::summary::TimeWindow;
use crate::timeline::Granularity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const ENV_LOW_STOCK: &str = "SALES_METRICS_LOW_STOCK";
pub const ENV_RANK_LIMIT: &str = "SALES_METRICS_RANK_LIMIT";
pub const ENV_GRANULARITY: &str = "SALES_METRICS_GRANULARITY";

pub const DEFAULT_LOW_STOCK_THRESHOLD: u64 = 10;
pub const DEFAULT_RANK_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    /// Items with `0 < stock <= low_stock_threshold` are "low"
    pub low_stock_threshold: u64,

    /// Number of top sellers in the summary
    pub rank_limit: usize,

    pub rank_metric: RankMetric,

    /// Bucket size of the revenue trend
    pub granularity: Granularity,

    pub window: TimeWindow,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            rank_limit: DEFAULT_RANK_LIMIT,
            rank_metric: RankMetric::Revenue,
            granularity: Granularity::Day,
            window: TimeWindow::all(),
        }
    }
}

impl ReportConfig {
    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ReportConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded report config");
        Ok(config)
    }

    /// Apply `SALES_METRICS_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; invalid values are logged and ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override::<u64, _>(&lookup, ENV_LOW_STOCK) {
            self.low_stock_threshold = v;
        }
        if let Some(v) = parse_override::<usize, _>(&lookup, ENV_RANK_LIMIT) {
            self.rank_limit = v;
        }
        if let Some(v) = parse_override::<Granularity, _>(&lookup, ENV_GRANULARITY) {
            self.granularity = v;
        }
        self
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring invalid config override");
            None
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
