//! Mail transports.

use async_trait::async_trait;

use uniasia_core::EmailAddress;
use uniasia_notifications::{MessageTransport, OutboundMessage, TransportError};

pub mod http;

pub use http::HttpMailTransport;

/// Transport used when no mail provider is configured.
///
/// Every send fails with [`TransportError::NotConfigured`], so notifications
/// surface as `DeliveryFailed` instead of silently disappearing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledTransport;

#[async_trait]
impl MessageTransport for DisabledTransport {
    async fn send(&self, to: &[EmailAddress], message: &OutboundMessage) -> Result<(), TransportError> {
        tracing::warn!(
            subject = %message.subject,
            recipients = to.len(),
            "mail transport not configured; message dropped"
        );
        Err(TransportError::NotConfigured)
    }
}
