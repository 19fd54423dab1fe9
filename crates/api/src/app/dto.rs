//! Inbound payload shapes and their adapters to [`StockReading`] /
//! [`ExpiringItem`].
//!
//! Each inbound shape gets exactly one adapter; the workflow never sees raw
//! JSON.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use uniasia_core::{DomainError, DomainResult};
use uniasia_inventory::{ExpiringItem, Quantity, StockReading};

// -------------------------
// Direct reports
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReportRequest {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub current_quantity: Option<i64>,
    pub previous_quantity: Option<i64>,
}

impl StockReportRequest {
    pub fn into_reading(self) -> DomainResult<StockReading> {
        let product_id = self
            .product_id
            .ok_or_else(|| DomainError::invalid_input("productId is required"))?;
        let product_name = self
            .product_name
            .ok_or_else(|| DomainError::invalid_input("productName is required"))?;
        let current = self
            .current_quantity
            .ok_or_else(|| DomainError::invalid_input("currentQuantity is required"))?;
        StockReading::from_raw(&product_id, &product_name, current, self.previous_quantity)
    }
}

#[derive(Debug, Deserialize)]
pub struct LowStockDigestRequest {
    pub items: Vec<StockReportRequest>,
}

impl LowStockDigestRequest {
    /// All-or-nothing: one bad item rejects the batch.
    pub fn into_readings(self) -> DomainResult<Vec<StockReading>> {
        if self.items.is_empty() {
            return Err(DomainError::invalid_input("items cannot be empty"));
        }
        self.items
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.into_reading().map_err(|e| at_index(i, e)))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringItemRequest {
    pub product_name: Option<String>,
    pub quantity: Option<i64>,
    pub expires_on: Option<NaiveDate>,
}

impl ExpiringItemRequest {
    pub fn into_item(self) -> DomainResult<ExpiringItem> {
        let name = self
            .product_name
            .ok_or_else(|| DomainError::invalid_input("productName is required"))?;
        let quantity = Quantity::new(
            self.quantity
                .ok_or_else(|| DomainError::invalid_input("quantity is required"))?,
        )?;
        let expires_on = self
            .expires_on
            .ok_or_else(|| DomainError::invalid_input("expiresOn is required"))?;
        ExpiringItem::new(name, quantity, expires_on)
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpiringItemsRequest {
    pub items: Vec<ExpiringItemRequest>,
    /// Reference date; defaults to today (UTC).
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl ExpiringItemsRequest {
    pub fn into_items(self) -> DomainResult<Vec<ExpiringItem>> {
        if self.items.is_empty() {
            return Err(DomainError::invalid_input("items cannot be empty"));
        }
        self.items
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.into_item().map_err(|e| at_index(i, e)))
            .collect()
    }
}

fn at_index(i: usize, err: DomainError) -> DomainError {
    match err {
        DomainError::InvalidInput(msg) => DomainError::invalid_input(format!("items[{i}]: {msg}")),
        other => other,
    }
}

// -------------------------
// Backend change feed
// -------------------------

/// Table whose row changes carry stock levels.
pub const PRODUCTS_TABLE: &str = "products";
const STOCK_COLUMN: &str = "stock_quantity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Row-change notification from the backend store
/// (`{ type, table, schema, record, old_record }`).
#[derive(Debug, Deserialize)]
pub struct DatabaseChangePayload {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub record: Option<Value>,
    #[serde(default)]
    pub old_record: Option<Value>,
}

impl DatabaseChangePayload {
    /// `Ok(None)` for changes that carry no new stock level (deletes, other
    /// tables). An update without an old row snapshot has no known previous
    /// quantity.
    pub fn into_reading(self) -> DomainResult<Option<StockReading>> {
        if self.kind == ChangeKind::Delete || self.table != PRODUCTS_TABLE {
            return Ok(None);
        }

        let record = self
            .record
            .ok_or_else(|| DomainError::invalid_input("record is required for inserts and updates"))?;

        let product_id = scalar_string(&record, "id")
            .ok_or_else(|| DomainError::invalid_input("record.id is required"))?;
        let product_name = record
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::invalid_input("record.name is required"))?;
        let current = integer(&record, STOCK_COLUMN)?
            .ok_or_else(|| DomainError::invalid_input(format!("record.{STOCK_COLUMN} is required")))?;

        let previous = match (self.kind, self.old_record.as_ref()) {
            (ChangeKind::Update, Some(old)) => integer(old, STOCK_COLUMN)?,
            _ => None,
        };

        StockReading::from_raw(&product_id, product_name, current, previous).map(Some)
    }
}

/// Row keys arrive as strings (uuid) or numbers (serial).
fn scalar_string(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer column; `numeric` columns come through as strings.
fn integer(row: &Value, key: &str) -> DomainResult<Option<i64>> {
    match row.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| DomainError::invalid_input(format!("{key} must be an integer"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| DomainError::invalid_input(format!("{key} must be an integer"))),
        Some(_) => Err(DomainError::invalid_input(format!("{key} must be an integer"))),
    }
}
