// 📈 Time-Bucket Aggregator - revenue trend by day or month
//
// Conservation: the bucket sums always add up to the input totals. Records
// whose timestamp could not be parsed land in an "Unknown" bucket instead of
// being dropped, so the trend reconciles against the record count.

use crate::records::{TimeBucket, TransactionRecord, UNKNOWN_KEY};
use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Month,
}

impl Granularity {
    /// chrono format string for the bucket key
    pub fn key_format(&self) -> &'static str {
        match self {
            Granularity::Day => "%Y-%m-%d",
            Granularity::Month => "%Y-%m",
        }
    }

    /// First day of the bucket containing `ts`
    pub fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDate {
        let date = ts.date();
        match self {
            Granularity::Day => date,
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

impl FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(anyhow!("Unknown granularity '{}' (expected day or month)", other)),
        }
    }
}

/// Bucket key for one record: `YYYY-MM-DD`, `YYYY-MM`, or "Unknown"
pub fn bucket_key(record: &TransactionRecord, granularity: Granularity) -> String {
    match record.timestamp {
        Some(ts) => ts.format(granularity.key_format()).to_string(),
        None => UNKNOWN_KEY.to_string(),
    }
}

/// Sum `total` per calendar bucket, ascending by key
///
/// Buckets are ordered by date and only formatted on the way out, so years
/// past 9999 (`+10000-01`) still sort after 2024. The "Unknown" bucket, if
/// any, is emitted last.
pub fn aggregate_by_time(records: &[TransactionRecord], granularity: Granularity) -> Vec<TimeBucket> {
    let mut dated: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut unknown: Option<f64> = None;

    for record in records {
        match record.timestamp {
            Some(ts) => {
                *dated.entry(granularity.bucket_start(ts)).or_insert(0.0) += record.total;
            }
            None => *unknown.get_or_insert(0.0) += record.total,
        }
    }

    tracing::debug!(
        records = records.len(),
        buckets = dated.len() + usize::from(unknown.is_some()),
        %granularity,
        "aggregated revenue trend"
    );

    let mut buckets: Vec<TimeBucket> = dated
        .into_iter()
        .map(|(start, sum)| TimeBucket {
            key: start.format(granularity.key_format()).to_string(),
            sum,
        })
        .collect();

    if let Some(sum) = unknown {
        buckets.push(TimeBucket {
            key: UNKNOWN_KEY.to_string(),
            sum,
        });
    }

    buckets
}

// ============================================================================
// TESTS
// ============================================================================
