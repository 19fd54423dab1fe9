//! Audit trail of notification outcomes.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use uniasia_core::NotificationId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivityLogError {
    #[error("activity log write failed: {0}")]
    Write(String),
}

/// One audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: NotificationId,
    /// e.g. `notification.low_stock.sent`.
    pub action: String,
    /// Product name or digest label the row is about.
    pub entity: String,
    pub details: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

/// Append-only activity log.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, record: ActivityRecord) -> Result<(), ActivityLogError>;
}

/// In-process activity log (dev/test wiring).
#[derive(Debug, Default)]
pub struct InMemoryActivityLog {
    inner: Mutex<Vec<ActivityRecord>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ActivityRecord> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn record(&self, record: ActivityRecord) -> Result<(), ActivityLogError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }
}
