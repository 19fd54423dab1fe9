use serde::{Deserialize, Serialize};
use thiserror::Error;

use uniasia_core::DomainError;

/// Failure of a notification attempt.
///
/// None of these abort the operation that triggered the notification; they are
/// folded into a [`crate::NotifyReport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The event payload was missing or malformed; nothing was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Neither the directory nor the fallback list produced an address.
    #[error("no notification recipients available")]
    NoRecipients,

    /// The message transport rejected or failed the send.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

impl NotifyError {
    pub fn failure(&self) -> NotifyFailure {
        match self {
            NotifyError::InvalidInput(_) => NotifyFailure::InvalidInput,
            NotifyError::NoRecipients => NotifyFailure::NoRecipients,
            NotifyError::DeliveryFailed(_) => NotifyFailure::DeliveryFailed,
        }
    }
}

impl From<DomainError> for NotifyError {
    fn from(value: DomainError) -> Self {
        NotifyError::InvalidInput(value.to_string())
    }
}

/// Machine-readable reason code carried in reports and API responses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotifyFailure {
    InvalidInput,
    NoRecipients,
    DeliveryFailed,
}

impl NotifyFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyFailure::InvalidInput => "InvalidInput",
            NotifyFailure::NoRecipients => "NoRecipients",
            NotifyFailure::DeliveryFailed => "DeliveryFailed",
        }
    }
}

impl core::fmt::Display for NotifyFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
