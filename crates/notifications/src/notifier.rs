//! Admin fan-out notifier.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use uniasia_core::EmailAddress;
use uniasia_inventory::{Quantity, Threshold};

use crate::error::{NotifyError, NotifyFailure};
use crate::message::{ExpiringLine, LowStockLine, OutboundMessage};
use crate::recipient::{RecipientResolver, RecipientSource};
use crate::transport::MessageTransport;

/// Result of one notification attempt.
///
/// `sent_count` is the number of addresses on the single send call, so a
/// failed send always reports zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReport {
    pub ok: bool,
    pub sent_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<EmailAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RecipientSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<NotifyFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl NotifyReport {
    fn sent(recipients: Vec<EmailAddress>, source: RecipientSource) -> Self {
        Self {
            ok: true,
            sent_count: recipients.len(),
            recipients,
            source: Some(source),
            reason: None,
            detail: None,
        }
    }

    fn failed(err: &NotifyError, recipients: Vec<EmailAddress>, source: Option<RecipientSource>) -> Self {
        Self {
            ok: false,
            sent_count: 0,
            recipients,
            source,
            reason: Some(err.failure()),
            detail: Some(err.to_string()),
        }
    }

    pub fn rejected(err: &NotifyError) -> Self {
        Self::failed(err, Vec::new(), None)
    }
}

/// Resolves the administrator audience and delivers one message to all of it.
///
/// No deduplication happens here: calling twice with the same payload sends
/// twice. Callers gate on the threshold crossing.
#[derive(Clone)]
pub struct AdminNotifier {
    resolver: RecipientResolver,
    transport: Arc<dyn MessageTransport>,
}

impl AdminNotifier {
    pub fn new(resolver: RecipientResolver, transport: Arc<dyn MessageTransport>) -> Self {
        Self { resolver, transport }
    }

    /// Resolve recipients and send `message` in a single transport call.
    ///
    /// Never fails: every error is folded into the returned report.
    pub async fn notify(&self, message: &OutboundMessage) -> NotifyReport {
        let resolved = match self.resolver.resolve().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(subject = %message.subject, reason = %e, "notification not sent");
                return NotifyReport::rejected(&e);
            }
        };

        match self.transport.send(&resolved.addresses, message).await {
            Ok(()) => {
                tracing::info!(
                    subject = %message.subject,
                    recipients = resolved.addresses.len(),
                    source = ?resolved.source,
                    "notification sent"
                );
                NotifyReport::sent(resolved.addresses, resolved.source)
            }
            Err(e) => {
                let err = NotifyError::DeliveryFailed(e.to_string());
                tracing::warn!(
                    subject = %message.subject,
                    recipients = resolved.addresses.len(),
                    error = %e,
                    "notification delivery failed"
                );
                NotifyReport::failed(&err, resolved.addresses, Some(resolved.source))
            }
        }
    }

    pub async fn notify_low_stock(&self, product_name: &str, quantity: Quantity, threshold: Threshold) -> NotifyReport {
        if product_name.trim().is_empty() {
            return NotifyReport::rejected(&NotifyError::InvalidInput(
                "product name cannot be empty".to_string(),
            ));
        }
        let message = OutboundMessage::low_stock(product_name.trim(), quantity, threshold);
        self.notify(&message).await
    }

    pub async fn notify_low_stock_digest(&self, lines: &[LowStockLine], threshold: Threshold) -> NotifyReport {
        if lines.is_empty() {
            return NotifyReport::rejected(&NotifyError::InvalidInput(
                "digest has no products".to_string(),
            ));
        }
        let message = OutboundMessage::low_stock_digest(lines, threshold);
        self.notify(&message).await
    }

    pub async fn notify_expiring(&self, lines: &[ExpiringLine]) -> NotifyReport {
        if lines.is_empty() {
            return NotifyReport::rejected(&NotifyError::InvalidInput(
                "no expiring items".to_string(),
            ));
        }
        let message = OutboundMessage::expiring_items(lines);
        self.notify(&message).await
    }
}
