use serde::{Deserialize, Serialize};

use uniasia_core::{DomainError, DomainResult, ProductId};

/// Non-negative stock quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Validate a raw quantity coming off the wire.
    ///
    /// Negative values are rejected rather than clamped to zero so a bad
    /// upstream payload never masquerades as "out of stock".
    pub fn new(raw: i64) -> DomainResult<Self> {
        if raw < 0 {
            return Err(DomainError::invalid_input(format!(
                "quantity cannot be negative (got {raw})"
            )));
        }
        u32::try_from(raw)
            .map(Self)
            .map_err(|_| DomainError::invalid_input(format!("quantity out of range (got {raw})")))
    }

    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One observation of a product's stock level.
///
/// `previous` is `None` when the caller has no reliable prior value (an insert,
/// or a direct report without history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReading {
    product_id: ProductId,
    product_name: String,
    current: Quantity,
    previous: Option<Quantity>,
}

impl StockReading {
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        current: Quantity,
        previous: Option<Quantity>,
    ) -> DomainResult<Self> {
        let product_name = product_name.into().trim().to_string();
        if product_name.is_empty() {
            return Err(DomainError::invalid_input("product name cannot be empty"));
        }
        Ok(Self {
            product_id,
            product_name,
            current,
            previous,
        })
    }

    /// Build from raw wire values, validating every field.
    pub fn from_raw(
        product_id: &str,
        product_name: &str,
        current: i64,
        previous: Option<i64>,
    ) -> DomainResult<Self> {
        let product_id = ProductId::new(product_id)
            .map_err(|_| DomainError::invalid_input("product id cannot be empty"))?;
        let current = Quantity::new(current)?;
        let previous = previous.map(Quantity::new).transpose()?;
        Self::new(product_id, product_name, current, previous)
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn current(&self) -> Quantity {
        self.current
    }

    pub fn previous(&self) -> Option<Quantity> {
        self.previous
    }
}
