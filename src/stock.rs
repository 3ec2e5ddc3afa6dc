// 📦 Stock-Level Classifier - out-of-stock / low / healthy bands
//
// The low-stock threshold is always supplied by the caller; dashboards in
// the field used both 5 and 10, so it is a deployment setting.

use crate::records::{finite_or_zero, InventoryItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockLevel {
    OutOfStock,
    Low,
    Healthy,
}

/// Rules are checked in order: zero first, then the inclusive threshold
pub fn stock_level(item: &InventoryItem, low_threshold: u64) -> StockLevel {
    if item.stock == 0 {
        StockLevel::OutOfStock
    } else if item.stock <= low_threshold {
        StockLevel::Low
    } else {
        StockLevel::Healthy
    }
}

/// Partition of the input items; every item appears in exactly one band
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockClassification {
    pub out_of_stock: Vec<InventoryItem>,
    pub low_stock: Vec<InventoryItem>,
    pub healthy: Vec<InventoryItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCounts {
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub healthy: usize,
}

impl StockClassification {
    pub fn len(&self) -> usize {
        self.out_of_stock.len() + self.low_stock.len() + self.healthy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn counts(&self) -> StockCounts {
        StockCounts {
            out_of_stock: self.out_of_stock.len(),
            low_stock: self.low_stock.len(),
            healthy: self.healthy.len(),
        }
    }

    /// Items that need attention (out of stock or running low)
    pub fn needs_restock(&self) -> usize {
        self.out_of_stock.len() + self.low_stock.len()
    }
}

/// Classify items into bands, preserving input order within each band
pub fn classify_stock(items: &[InventoryItem], low_threshold: u64) -> StockClassification {
    let mut classification = StockClassification::default();

    for item in items {
        let band = match stock_level(item, low_threshold) {
            StockLevel::OutOfStock => &mut classification.out_of_stock,
            StockLevel::Low => &mut classification.low_stock,
            StockLevel::Healthy => &mut classification.healthy,
        };
        band.push(item.clone());
    }

    tracing::debug!(
        items = items.len(),
        low_threshold,
        out_of_stock = classification.out_of_stock.len(),
        low_stock = classification.low_stock.len(),
        "classified stock levels"
    );

    classification
}

// ============================================================================
// INVENTORY VALUATION
// ============================================================================

/// Stock-on-hand value card of the inventory dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValuation {
    pub unit_count: u64,
    pub retail_value: f64,
    pub cost_value: f64,
    pub potential_profit: f64,
}

pub fn inventory_valuation(items: &[InventoryItem]) -> InventoryValuation {
    let mut valuation = items
        .iter()
        .fold(InventoryValuation::default(), |mut acc, item| {
            acc.unit_count = acc.unit_count.saturating_add(item.stock);
            acc.retail_value += item.retail_value();
            acc.cost_value += item.cost_value();
            acc
        });
    valuation.retail_value = finite_or_zero(valuation.retail_value);
    valuation.cost_value = finite_or_zero(valuation.cost_value);
    valuation.potential_profit = finite_or_zero(valuation.retail_value - valuation.cost_value);
    valuation
}

// ============================================================================
// TESTS
// ============================================================================
