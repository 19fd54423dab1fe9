//! Outbound message delivery seam.

use async_trait::async_trait;
use thiserror::Error;

use uniasia_core::EmailAddress;

use crate::message::OutboundMessage;

/// Error type for message delivery failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No provider is configured for this process.
    #[error("mail transport not configured")]
    NotConfigured,

    /// The provider could not be reached (network, DNS, timeout).
    #[error("mail provider unreachable: {0}")]
    Unreachable(String),

    /// The provider answered with a non-success status.
    #[error("mail provider rejected the message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Sends one message addressed to every recipient in a single call.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, to: &[EmailAddress], message: &OutboundMessage) -> Result<(), TransportError>;
}
