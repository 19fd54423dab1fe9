//! Expiring stock (sealants, adhesives and other dated goods).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use uniasia_core::{DomainError, DomainResult};

use crate::stock::Quantity;

/// A batch of a product with an expiry date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringItem {
    product_name: String,
    quantity: Quantity,
    expires_on: NaiveDate,
}

impl ExpiringItem {
    pub fn new(product_name: impl Into<String>, quantity: Quantity, expires_on: NaiveDate) -> DomainResult<Self> {
        let product_name = product_name.into().trim().to_string();
        if product_name.is_empty() {
            return Err(DomainError::invalid_input("product name cannot be empty"));
        }
        Ok(Self {
            product_name,
            quantity,
            expires_on,
        })
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn expires_on(&self) -> NaiveDate {
        self.expires_on
    }

    /// Days from `today` until expiry; negative once expired.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.expires_on - today).num_days()
    }
}

/// How far ahead an expiry date must be to be reported.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpiryWindow(u32);

impl ExpiryWindow {
    pub const DEFAULT: ExpiryWindow = ExpiryWindow(30);

    pub const fn days(days: u32) -> Self {
        Self(days)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Inclusive of the window's last day; already-expired stock is always in.
    pub fn contains(self, item: &ExpiringItem, today: NaiveDate) -> bool {
        item.days_remaining(today) <= i64::from(self.0)
    }

    /// Items inside the window, soonest expiry first.
    pub fn select<'a>(self, items: &'a [ExpiringItem], today: NaiveDate) -> Vec<&'a ExpiringItem> {
        let mut selected: Vec<&ExpiringItem> =
            items.iter().filter(|i| self.contains(i, today)).collect();
        selected.sort_by_key(|i| i.expires_on);
        selected
    }
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}
