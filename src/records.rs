// 🧾 Canonical Records - the shapes every aggregator consumes
// Raw REST payloads are mapped onto these by the normalizer; after that the
// aggregators only ever see these value types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Key used for records whose entity name or timestamp is unavailable
pub const UNKNOWN_KEY: &str = "Unknown";

/// Overflowed arithmetic (inf / NaN) is reported as 0
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// One sale / invoice line in canonical form
///
/// `total` is reconciled on read: when the source omitted it, the normalizer
/// derived it from `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,

    pub entity_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    pub quantity: f64,

    pub unit_price: f64,

    /// Per-unit cost. `None` means the source carried no cost at all,
    /// which is different from a cost of zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    pub total: f64,

    /// `None` when the source timestamp could not be parsed
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

impl TransactionRecord {
    pub fn new(entity_name: &str, total: f64, timestamp: Option<NaiveDateTime>) -> Self {
        TransactionRecord {
            id: String::new(),
            entity_name: entity_name.to_string(),
            entity_id: None,
            quantity: 0.0,
            unit_price: 0.0,
            cost: None,
            total,
            timestamp,
        }
    }

    /// Builder pattern: set quantity and unit price
    pub fn with_line(mut self, quantity: f64, unit_price: f64) -> Self {
        self.quantity = quantity;
        self.unit_price = unit_price;
        self
    }

    /// Builder pattern: set per-unit cost
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Builder pattern: set record id
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Cost of the whole line (`cost * quantity`), if cost is known;
    /// 0 if the product overflows
    pub fn line_cost(&self) -> Option<f64> {
        self.cost.map(|c| finite_or_zero(c * self.quantity))
    }

    pub fn has_cost(&self) -> bool {
        self.cost.is_some()
    }

    /// Name used for grouping; blank names fold into "Unknown"
    pub fn entity_key(&self) -> &str {
        let name = self.entity_name.trim();
        if name.is_empty() {
            UNKNOWN_KEY
        } else {
            name
        }
    }
}

// ============================================================================
// INVENTORY ITEM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub stock: u64,
    pub price: f64,
    pub cost: f64,
}

impl InventoryItem {
    pub fn new(name: &str, stock: u64) -> Self {
        InventoryItem {
            id: String::new(),
            name: name.to_string(),
            sku: String::new(),
            stock,
            price: 0.0,
            cost: 0.0,
        }
    }

    /// Builder pattern: set sell price and unit cost
    pub fn with_pricing(mut self, price: f64, cost: f64) -> Self {
        self.price = price;
        self.cost = cost;
        self
    }

    /// Builder pattern: set SKU
    pub fn with_sku(mut self, sku: &str) -> Self {
        self.sku = sku.to_string();
        self
    }

    /// Value of the stock on hand at sell price
    pub fn retail_value(&self) -> f64 {
        self.stock as f64 * self.price
    }

    /// Value of the stock on hand at cost
    pub fn cost_value(&self) -> f64 {
        self.stock as f64 * self.cost
    }

    /// Informational only: the aggregator never rejects these
    pub fn is_priced_below_cost(&self) -> bool {
        self.price < self.cost
    }
}

// ============================================================================
// AGGREGATION OUTPUTS
// ============================================================================

/// One point of a revenue trend (`YYYY-MM-DD`, `YYYY-MM`, or "Unknown")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub key: String,
    pub sum: f64,
}

/// One row of a top-N table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub name: String,
    pub metric: f64,
}

// ============================================================================
// TESTS
// ============================================================================
