// 🏆 Ranking Aggregator - top sellers by revenue or units

use crate::records::{finite_or_zero, RankEntry, TransactionRecord};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMetric {
    #[default]
    Revenue,
    Quantity,
}

impl RankMetric {
    fn value_of(&self, record: &TransactionRecord) -> f64 {
        match self {
            RankMetric::Revenue => record.total,
            RankMetric::Quantity => record.quantity,
        }
    }
}

impl FromStr for RankMetric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "revenue" => Ok(RankMetric::Revenue),
            "quantity" | "qty" | "units" => Ok(RankMetric::Quantity),
            other => Err(anyhow!("Unknown rank metric '{}' (expected revenue or quantity)", other)),
        }
    }
}

/// Group by entity name, sum the metric, return the top `limit` descending
///
/// Ties keep first-seen order. Fewer distinct entities than `limit` returns
/// all of them. A `limit` of 0 is treated as 1.
pub fn top_entities(records: &[TransactionRecord], metric: RankMetric, limit: usize) -> Vec<RankEntry> {
    let limit = limit.max(1);

    // Vec keeps encounter order, the map only indexes into it
    let mut entries: Vec<RankEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = record.entity_key();
        let value = metric.value_of(record);
        match index.get(key) {
            Some(&i) => entries[i].metric += value,
            None => {
                index.insert(key, entries.len());
                entries.push(RankEntry {
                    name: key.to_string(),
                    metric: value,
                });
            }
        }
    }

    for entry in &mut entries {
        entry.metric = finite_or_zero(entry.metric);
    }

    // sort_by is stable
    entries.sort_by(|a, b| b.metric.total_cmp(&a.metric));
    entries.truncate(limit);
    entries
}

// ============================================================================
// TESTS
// ============================================================================
