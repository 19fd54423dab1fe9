//! Inventory domain module: stock readings and the low-stock rule.
//!
//! This crate contains business rules for inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod expiry;
pub mod stock;
pub mod threshold;

pub use expiry::{ExpiringItem, ExpiryWindow};
pub use stock::{Quantity, StockReading};
pub use threshold::{StockAssessment, Threshold, ThresholdMonitor};
