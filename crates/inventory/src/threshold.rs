//! Low-stock threshold rule.
//!
//! One rule for every entry point: a product is low when its quantity is at or
//! below the threshold, and an alert fires only on the downward crossing. With
//! no prior quantity there is no history to suppress a repeat, so a low reading
//! alerts once.

use serde::{Deserialize, Serialize};

use crate::stock::{Quantity, StockReading};

/// Quantity at or below which a product counts as low stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(u32);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(5);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_low(self, quantity: Quantity) -> bool {
        quantity.get() <= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl core::fmt::Display for Threshold {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Why a reading does or does not warrant an alert.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAssessment {
    /// Previous quantity above the threshold, current at or below it.
    CrossedBelow,
    /// Current quantity is low and there is no prior value to compare with.
    LowWithoutHistory,
    /// Already low before this change.
    StillLow,
    /// Above the threshold.
    Healthy,
}

impl StockAssessment {
    pub fn should_notify(self) -> bool {
        matches!(self, Self::CrossedBelow | Self::LowWithoutHistory)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CrossedBelow => "crossed_below",
            Self::LowWithoutHistory => "low_without_history",
            Self::StillLow => "still_low",
            Self::Healthy => "healthy",
        }
    }
}

/// Decides whether a stock change should alert administrators.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ThresholdMonitor {
    threshold: Threshold,
}

impl ThresholdMonitor {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn assess(&self, current: Quantity, previous: Option<Quantity>) -> StockAssessment {
        if !self.threshold.is_low(current) {
            return StockAssessment::Healthy;
        }
        match previous {
            None => StockAssessment::LowWithoutHistory,
            Some(prev) if self.threshold.is_low(prev) => StockAssessment::StillLow,
            Some(_) => StockAssessment::CrossedBelow,
        }
    }

    pub fn should_notify(&self, current: Quantity, previous: Option<Quantity>) -> bool {
        self.assess(current, previous).should_notify()
    }

    pub fn assess_reading(&self, reading: &StockReading) -> StockAssessment {
        self.assess(reading.current(), reading.previous())
    }

    /// Readings that should alert, in input order.
    pub fn crossings<'a>(&self, readings: &'a [StockReading]) -> Vec<&'a StockReading> {
        readings
            .iter()
            .filter(|r| self.assess_reading(r).should_notify())
            .collect()
    }
}
