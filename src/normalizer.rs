// 🧹 Record Normalizer - heterogeneous REST payloads → canonical records
//
// Every dashboard fetched its own flavour of sale / invoice / product JSON:
// `total` vs `grandTotal`, `qty` vs `quantity`, prices as strings with a
// currency sign, products nested as objects. This module reconciles all of
// that once, at the boundary, so the aggregators never need fallbacks.
//
// Normalization never fails: a malformed field degrades to zero and is
// reported as a FieldIssue instead of rejecting the batch.

use crate::records::{finite_or_zero, InventoryItem, TransactionRecord, UNKNOWN_KEY};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// No alias of the field was present
    Missing,
    /// Present but not a number (coerced to zero / ignored for derivation)
    NonNumeric,
    /// Negative where the canonical shape requires >= 0 (clamped)
    Negative,
    /// Computed from the other line fields
    Derived,
    /// Present but not in any accepted date format
    UnparseableTimestamp,
    /// Derived value overflowed to infinity (set to zero)
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
}

impl FieldIssue {
    fn new(field: &str, kind: IssueKind) -> Self {
        FieldIssue {
            field: field.to_string(),
            kind,
        }
    }
}

/// Issue tagged with the index of the input record it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIssue {
    pub index: usize,
    pub issue: FieldIssue,
}

/// Output of a batch normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedBatch<T> {
    pub records: Vec<T>,
    pub issues: Vec<RecordIssue>,
}

impl<T> NormalizedBatch<T> {
    /// Issues that indicate bad data (derivations are expected and excluded)
    pub fn problem_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.issue.kind != IssueKind::Derived)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.problem_count() == 0
    }
}

// ============================================================================
// FIELD ALIASES
// ============================================================================

/// Key variants observed across the source dashboards, in priority order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAliases {
    pub id: Vec<String>,
    pub entity_name: Vec<String>,
    pub entity_id: Vec<String>,
    pub item_name: Vec<String>,
    pub quantity: Vec<String>,
    pub unit_price: Vec<String>,
    pub cost: Vec<String>,
    pub total: Vec<String>,
    pub timestamp: Vec<String>,
    pub sku: Vec<String>,
    pub stock: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for FieldAliases {
    fn default() -> Self {
        FieldAliases {
            id: keys(&["id", "_id", "invoiceNumber"]),
            entity_name: keys(&["entityName", "productName", "name", "product", "item"]),
            entity_id: keys(&["entityId", "productId", "product_id"]),
            item_name: keys(&["name", "productName", "title"]),
            quantity: keys(&["quantity", "qty", "quantitySold"]),
            unit_price: keys(&["unitPrice", "unit_price", "price", "sellingPrice"]),
            cost: keys(&["cost", "unitCost", "costPrice", "buyingPrice"]),
            total: keys(&["total", "grandTotal", "grand_total", "totalAmount", "amount"]),
            timestamp: keys(&["timestamp", "date", "saleDate", "createdAt", "created_at"]),
            sku: keys(&["sku", "SKU", "code"]),
            stock: keys(&["stock", "countInStock", "stockQuantity", "quantity", "qty"]),
        }
    }
}

// ============================================================================
// VALUE READERS
// ============================================================================

/// Result of reading a numeric field through its aliases
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Absent,
    Invalid,
    Value(f64),
}

impl Numeric {
    fn value(self) -> Option<f64> {
        match self {
            Numeric::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Coerce a JSON value to a finite number
///
/// Accepts numbers and numeric strings such as "$1,299.50" or " 12 ".
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' '))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

fn read_number(raw: &Value, aliases: &[String]) -> Numeric {
    let mut seen = false;
    for key in aliases {
        match raw.get(key.as_str()) {
            None | Some(Value::Null) => continue,
            Some(v) => {
                seen = true;
                if let Some(n) = coerce_number(v) {
                    return Numeric::Value(n);
                }
            }
        }
    }
    if seen {
        Numeric::Invalid
    } else {
        Numeric::Absent
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_text(raw: &Value, aliases: &[String]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| raw.get(key.as_str()))
        .find_map(text_of)
}

/// Populated products arrive as `{ "product": { "name": .., "_id": .. } }`
fn read_nested(raw: &Value, parents: &[&str], fields: &[&str]) -> Option<String> {
    parents
        .iter()
        .filter_map(|p| raw.get(*p))
        .filter(|v| v.is_object())
        .find_map(|obj| fields.iter().filter_map(|f| obj.get(*f)).find_map(text_of))
}

/// Parse the timestamp formats seen in the source data
///
/// RFC 3339 values keep the calendar date as written in their own offset,
/// so a sale stamped `2024-01-15T23:30:00-05:00` stays on the 15th.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Integers, bare or quoted, are treated as Unix epoch milliseconds
/// (`Date.now()`)
fn timestamp_of(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            parse_timestamp(s).or_else(|| s.trim().parse::<i64>().ok().and_then(from_epoch_millis))
        }
        Value::Number(n) => n.as_i64().and_then(from_epoch_millis),
        _ => None,
    }
}

fn from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

fn content_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join("|"));
    format!("{:x}", hasher.finalize())
}

fn checked_derivation(value: f64, field: &str, issues: &mut Vec<FieldIssue>) -> f64 {
    if !value.is_finite() {
        issues.push(FieldIssue::new(field, IssueKind::Overflow));
    }
    finite_or_zero(value)
}

fn divide_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    pub aliases: FieldAliases,
}

impl Normalizer {
    pub fn new() -> Self {
        Normalizer::default()
    }

    pub fn with_aliases(aliases: FieldAliases) -> Self {
        Normalizer { aliases }
    }

    /// Read a non-negative numeric field, recording what happened to it
    fn non_negative(
        &self,
        raw: &Value,
        aliases: &[String],
        field: &str,
        issues: &mut Vec<FieldIssue>,
    ) -> Option<f64> {
        match read_number(raw, aliases) {
            Numeric::Value(v) if v < 0.0 => {
                issues.push(FieldIssue::new(field, IssueKind::Negative));
                Some(0.0)
            }
            Numeric::Invalid => {
                issues.push(FieldIssue::new(field, IssueKind::NonNumeric));
                None
            }
            n => n.value(),
        }
    }

    fn timestamp(&self, raw: &Value, issues: &mut Vec<FieldIssue>) -> Option<NaiveDateTime> {
        let present: Vec<&Value> = self
            .aliases
            .timestamp
            .iter()
            .filter_map(|k| raw.get(k.as_str()))
            .filter(|v| !v.is_null())
            .collect();

        if present.is_empty() {
            issues.push(FieldIssue::new("timestamp", IssueKind::Missing));
            return None;
        }

        let parsed = present.into_iter().find_map(timestamp_of);
        if parsed.is_none() {
            issues.push(FieldIssue::new("timestamp", IssueKind::UnparseableTimestamp));
        }
        parsed
    }

    /// Normalize one sale / invoice line, collecting issues
    pub fn transaction_with_issues(&self, raw: &Value) -> (TransactionRecord, Vec<FieldIssue>) {
        let mut issues = Vec::new();

        let entity_name = read_text(raw, &self.aliases.entity_name)
            .or_else(|| read_nested(raw, &["product", "item"], &["name", "title"]))
            .unwrap_or_else(|| {
                issues.push(FieldIssue::new("entityName", IssueKind::Missing));
                UNKNOWN_KEY.to_string()
            });

        let entity_id = read_text(raw, &self.aliases.entity_id)
            .or_else(|| read_nested(raw, &["product", "item"], &["id", "_id"]));

        let quantity_in = self.non_negative(raw, &self.aliases.quantity, "quantity", &mut issues);
        let price_in = self.non_negative(raw, &self.aliases.unit_price, "unitPrice", &mut issues);
        let cost = self.non_negative(raw, &self.aliases.cost, "cost", &mut issues);

        let total_in = read_number(raw, &self.aliases.total);
        let total_given = total_in.value().is_some();
        let total = match total_in {
            Numeric::Value(t) => t,
            other => {
                if other == Numeric::Invalid {
                    issues.push(FieldIssue::new("total", IssueKind::NonNumeric));
                }
                match (quantity_in, price_in) {
                    (Some(q), Some(p)) => {
                        issues.push(FieldIssue::new("total", IssueKind::Derived));
                        checked_derivation(q * p, "total", &mut issues)
                    }
                    _ => {
                        issues.push(FieldIssue::new("total", IssueKind::Missing));
                        0.0
                    }
                }
            }
        };

        let quantity = match quantity_in {
            Some(q) => q,
            None => match price_in {
                Some(p) if p > 0.0 => {
                    issues.push(FieldIssue::new("quantity", IssueKind::Derived));
                    checked_derivation(divide_or_zero(total, p).max(0.0), "quantity", &mut issues)
                }
                _ => {
                    if !total_given {
                        issues.push(FieldIssue::new("quantity", IssueKind::Missing));
                    }
                    0.0
                }
            },
        };

        let unit_price = match price_in {
            Some(p) => p,
            None if quantity > 0.0 => {
                issues.push(FieldIssue::new("unitPrice", IssueKind::Derived));
                checked_derivation(divide_or_zero(total, quantity).max(0.0), "unitPrice", &mut issues)
            }
            None => {
                if !total_given {
                    issues.push(FieldIssue::new("unitPrice", IssueKind::Missing));
                }
                0.0
            }
        };

        let timestamp = self.timestamp(raw, &mut issues);

        let id = read_text(raw, &self.aliases.id).unwrap_or_else(|| {
            let ts = timestamp.map(|t| t.to_string()).unwrap_or_default();
            content_hash(&[entity_name.as_str(), ts.as_str(), total.to_string().as_str()])
        });

        let record = TransactionRecord {
            id,
            entity_name,
            entity_id,
            quantity,
            unit_price,
            cost,
            total,
            timestamp,
        };

        (record, issues)
    }

    pub fn transaction(&self, raw: &Value) -> TransactionRecord {
        self.transaction_with_issues(raw).0
    }

    /// Normalize one inventory / product document, collecting issues
    pub fn item_with_issues(&self, raw: &Value) -> (InventoryItem, Vec<FieldIssue>) {
        let mut issues = Vec::new();

        let name = read_text(raw, &self.aliases.item_name).unwrap_or_else(|| {
            issues.push(FieldIssue::new("name", IssueKind::Missing));
            UNKNOWN_KEY.to_string()
        });

        let sku = read_text(raw, &self.aliases.sku).unwrap_or_default();

        let stock = match self.non_negative(raw, &self.aliases.stock, "stock", &mut issues) {
            Some(s) => s.floor() as u64,
            None => {
                if !issues.iter().any(|i| i.field == "stock") {
                    issues.push(FieldIssue::new("stock", IssueKind::Missing));
                }
                0
            }
        };

        let mut priced = |aliases: &[String], field: &str| {
            self.non_negative(raw, aliases, field, &mut issues)
                .unwrap_or_else(|| {
                    if !issues.iter().any(|i| i.field == field) {
                        issues.push(FieldIssue::new(field, IssueKind::Missing));
                    }
                    0.0
                })
        };
        let price = priced(self.aliases.unit_price.as_slice(), "price");
        let cost = priced(self.aliases.cost.as_slice(), "cost");

        let id = read_text(raw, &self.aliases.id)
            .unwrap_or_else(|| content_hash(&[name.as_str(), sku.as_str()]));

        let item = InventoryItem {
            id,
            name,
            sku,
            stock,
            price,
            cost,
        };

        (item, issues)
    }

    pub fn item(&self, raw: &Value) -> InventoryItem {
        self.item_with_issues(raw).0
    }

    /// Normalize a whole batch; a bad record never aborts the batch
    pub fn transactions(&self, raw: &[Value]) -> NormalizedBatch<TransactionRecord> {
        let batch = collect_batch(raw, |r| self.transaction_with_issues(r));
        log_batch("transaction", &batch);
        batch
    }

    pub fn items(&self, raw: &[Value]) -> NormalizedBatch<InventoryItem> {
        let batch = collect_batch(raw, |r| self.item_with_issues(r));
        log_batch("inventory", &batch);
        batch
    }
}

fn collect_batch<T, F>(raw: &[Value], mut normalize: F) -> NormalizedBatch<T>
where
    F: FnMut(&Value) -> (T, Vec<FieldIssue>),
{
    let mut records = Vec::with_capacity(raw.len());
    let mut issues = Vec::new();

    for (index, value) in raw.iter().enumerate() {
        let (record, found) = normalize(value);
        records.push(record);
        issues.extend(found.into_iter().map(|issue| RecordIssue { index, issue }));
    }

    NormalizedBatch { records, issues }
}

fn log_batch<T>(kind: &str, batch: &NormalizedBatch<T>) {
    let problems = batch.problem_count();
    if problems > 0 {
        tracing::warn!(
            kind,
            records = batch.records.len(),
            problems,
            "normalized batch with malformed fields"
        );
    } else {
        tracing::debug!(kind, records = batch.records.len(), "normalized batch");
    }
}

// ============================================================================
// CONVENIENCE FUNCTIONS
// ============================================================================

pub fn normalize_transaction(raw: &Value) -> TransactionRecord {
    Normalizer::new().transaction(raw)
}

pub fn normalize_transaction_with_issues(raw: &Value) -> (TransactionRecord, Vec<FieldIssue>) {
    Normalizer::new().transaction_with_issues(raw)
}

pub fn normalize_item(raw: &Value) -> InventoryItem {
    Normalizer::new().item(raw)
}

pub fn normalize_item_with_issues(raw: &Value) -> (InventoryItem, Vec<FieldIssue>) {
    Normalizer::new().item_with_issues(raw)
}

pub fn normalize_transactions(raw: &[Value]) -> NormalizedBatch<TransactionRecord> {
    Normalizer::new().transactions(raw)
}

pub fn normalize_items(raw: &[Value]) -> NormalizedBatch<InventoryItem> {
    Normalizer::new().items(raw)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn has_issue(issues: &[FieldIssue], field: &str, kind: IssueKind) -> bool {
        issues.iter().any(|i| i.field == field && i.kind == kind)
    }

    #[test]
    fn test_grand_total_and_qty_aliases() {
        let raw = json!({
            "productName": "Laptop",
            "qty": 2,
            "unitPrice": 500,
            "grandTotal": 1000,
            "createdAt": "2024-03-02T10:15:00Z"
        });
        let tx = normalize_transaction(&raw);

        assert_eq!(tx.entity_name, "Laptop");
        assert_eq!(tx.quantity, 2.0);
        assert_eq!(tx.unit_price, 500.0);
        assert_eq!(tx.total, 1000.0);
        assert_eq!(tx.timestamp.unwrap().to_string(), "2024-03-02 10:15:00");
    }

    #[test]
    fn test_total_derived_from_line() {
        let raw = json!({ "name": "Pen", "quantity": 3, "price": "1.50", "date": "2024-01-15" });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert_eq!(tx.total, 4.5);
        assert!(has_issue(&issues, "total", IssueKind::Derived));
    }

    #[test]
    fn test_quantity_derived_from_total() {
        let raw = json!({ "name": "Pen", "total": 9, "unitPrice": 3, "date": "2024-01-15" });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert_eq!(tx.quantity, 3.0);
        assert!(has_issue(&issues, "quantity", IssueKind::Derived));
    }

    #[test]
    fn test_quantity_derivation_guards_zero_price() {
        let raw = json!({ "name": "Gift", "total": 9, "unitPrice": 0, "date": "2024-01-15" });
        let tx = normalize_transaction(&raw);

        assert_eq!(tx.quantity, 0.0);
        assert!(tx.quantity.is_finite());
        assert_eq!(tx.unit_price, 0.0);
    }

    #[test]
    fn test_unit_price_derived_from_total() {
        let raw = json!({ "name": "Desk", "total": 300, "quantity": 2, "date": "2024-01-15" });
        let tx = normalize_transaction(&raw);
        assert_eq!(tx.unit_price, 150.0);
    }

    #[test]
    fn test_non_numeric_total_is_not_a_silent_zero() {
        let raw = json!({ "name": "Pen", "total": "n/a", "quantity": 2, "price": 4 });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert_eq!(tx.total, 8.0);
        assert!(has_issue(&issues, "total", IssueKind::NonNumeric));
        assert!(has_issue(&issues, "total", IssueKind::Derived));
    }

    #[test]
    fn test_garbage_record_degrades_to_zero() {
        let raw = json!({ "quantity": "lots", "price": {}, "total": [1, 2] });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert_eq!(tx.entity_name, UNKNOWN_KEY);
        assert_eq!(tx.quantity, 0.0);
        assert_eq!(tx.unit_price, 0.0);
        assert_eq!(tx.total, 0.0);
        assert!(tx.timestamp.is_none());
        assert!(!tx.id.is_empty());
        assert!(has_issue(&issues, "timestamp", IssueKind::Missing));
    }

    #[test]
    fn test_non_object_record_does_not_panic() {
        let tx = normalize_transaction(&json!("just a string"));
        assert_eq!(tx.total, 0.0);
        assert_eq!(tx.entity_name, UNKNOWN_KEY);
    }

    #[test]
    fn test_currency_strings() {
        assert_eq!(coerce_number(&json!("$1,299.50")), Some(1299.5));
        assert_eq!(coerce_number(&json!(" 12 ")), Some(12.0));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!(null)), None);
    }

    #[test]
    fn test_negative_quantity_is_clamped() {
        let raw = json!({ "name": "Pen", "quantity": -2, "price": 3, "total": 6 });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert_eq!(tx.quantity, 0.0);
        assert!(has_issue(&issues, "quantity", IssueKind::Negative));
    }

    #[test]
    fn test_nested_product() {
        let raw = json!({
            "product": { "_id": "p-42", "name": "Keyboard" },
            "quantity": 1,
            "price": 80,
            "saleDate": "2024-02-01"
        });
        let tx = normalize_transaction(&raw);

        assert_eq!(tx.entity_name, "Keyboard");
        assert_eq!(tx.entity_id.as_deref(), Some("p-42"));
    }

    #[test]
    fn test_cost_absent_stays_none() {
        let raw = json!({ "name": "Pen", "total": 5, "date": "2024-01-15" });
        assert_eq!(normalize_transaction(&raw).cost, None);

        let raw = json!({ "name": "Pen", "total": 5, "costPrice": 2 });
        assert_eq!(normalize_transaction(&raw).cost, Some(2.0));
    }

    #[test]
    fn test_timestamp_formats() {
        let expect = |s: &str| parse_timestamp(s).map(|t| t.date().to_string());

        assert_eq!(expect("2024-01-15"), Some("2024-01-15".to_string()));
        assert_eq!(expect("01/15/2024"), Some("2024-01-15".to_string()));
        assert_eq!(expect("2024-01-15 08:00:00"), Some("2024-01-15".to_string()));
        assert_eq!(expect("2024-01-15T08:00:00.123"), Some("2024-01-15".to_string()));
        assert_eq!(expect("2024-01-15T23:30:00-05:00"), Some("2024-01-15".to_string()));
        assert_eq!(expect("yesterday"), None);
        assert_eq!(expect(""), None);
    }

    #[test]
    fn test_epoch_millis_timestamp() {
        let raw = json!({ "name": "Pen", "total": 1, "timestamp": 1705312800000i64 });
        let tx = normalize_transaction(&raw);
        assert_eq!(tx.timestamp.unwrap().date().to_string(), "2024-01-15");
    }

    #[test]
    fn test_quoted_epoch_millis_timestamp() {
        let raw = json!({ "name": "Pen", "total": 1, "timestamp": "1705312800000" });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert_eq!(tx.timestamp.unwrap().date().to_string(), "2024-01-15");
        assert!(!has_issue(&issues, "timestamp", IssueKind::UnparseableTimestamp));
    }

    #[test]
    fn test_overflowing_derivation_is_zeroed() {
        let raw = json!({ "name": "Big", "quantity": 1e200, "price": 1e200 });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert_eq!(tx.total, 0.0);
        assert!(has_issue(&issues, "total", IssueKind::Overflow));

        let raw = json!({ "name": "Tiny", "total": 1e300, "price": 1e-300 });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert_eq!(tx.quantity, 0.0);
        assert!(has_issue(&issues, "quantity", IssueKind::Overflow));
    }

    #[test]
    fn test_unparseable_timestamp_is_reported() {
        let raw = json!({ "name": "Pen", "total": 1, "date": "not a date" });
        let (tx, issues) = normalize_transaction_with_issues(&raw);

        assert!(tx.timestamp.is_none());
        assert!(has_issue(&issues, "timestamp", IssueKind::UnparseableTimestamp));
    }

    #[test]
    fn test_generated_id_is_deterministic() {
        let raw = json!({ "name": "Pen", "total": 1, "date": "2024-01-15" });
        let a = normalize_transaction(&raw);
        let b = normalize_transaction(&raw);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.len(), 64);

        let raw = json!({ "_id": "abc123", "name": "Pen", "total": 1 });
        assert_eq!(normalize_transaction(&raw).id, "abc123");
    }

    #[test]
    fn test_inventory_item_aliases() {
        let raw = json!({
            "_id": "i-1",
            "name": "Mouse",
            "SKU": "MS-01",
            "countInStock": "7",
            "sellingPrice": 25,
            "costPrice": 15
        });
        let item = normalize_item(&raw);

        assert_eq!(item.id, "i-1");
        assert_eq!(item.sku, "MS-01");
        assert_eq!(item.stock, 7);
        assert_eq!(item.price, 25.0);
        assert_eq!(item.cost, 15.0);
    }

    #[test]
    fn test_inventory_stock_floor_and_clamp() {
        assert_eq!(normalize_item(&json!({ "name": "A", "stock": 3.9 })).stock, 3);

        let (item, issues) = normalize_item_with_issues(&json!({ "name": "B", "stock": -4 }));
        assert_eq!(item.stock, 0);
        assert!(has_issue(&issues, "stock", IssueKind::Negative));

        let (item, issues) = normalize_item_with_issues(&json!({ "name": "C" }));
        assert_eq!(item.stock, 0);
        assert!(has_issue(&issues, "stock", IssueKind::Missing));
        assert!(has_issue(&issues, "price", IssueKind::Missing));
    }

    #[test]
    fn test_batch_keeps_every_record() {
        let raw = vec![
            json!({ "name": "A", "total": 1, "date": "2024-01-01" }),
            json!({ "oops": true }),
            json!({ "name": "B", "total": "2", "date": "2024-01-02" }),
        ];
        let batch = normalize_transactions(&raw);

        assert_eq!(batch.records.len(), 3);
        assert!(!batch.is_clean());
        assert!(batch.issues.iter().any(|i| i.index == 1));
        assert!(batch.issues.iter().all(|i| i.index != 0));
    }

    #[test]
    fn test_custom_aliases() {
        let mut aliases = FieldAliases::default();
        aliases.total.insert(0, "montant".to_string());
        let normalizer = Normalizer::with_aliases(aliases);

        let tx = normalizer.transaction(&json!({ "name": "Pain", "montant": 3.2 }));
        assert_eq!(tx.total, 3.2);
    }
}
