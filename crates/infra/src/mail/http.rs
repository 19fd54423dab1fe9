//! Transactional email over a JSON HTTP API.
//!
//! The request shape follows the common provider format (Resend and
//! compatible services): one POST per message with every recipient in `to`.

use async_trait::async_trait;
use serde::Serialize;

use uniasia_core::EmailAddress;
use uniasia_notifications::{MessageTransport, OutboundMessage, TransportError};

use crate::config::MailConfig;

/// Longest provider error body kept in a [`TransportError::Rejected`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

pub struct HttpMailTransport {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailTransport {
    pub fn new(config: MailConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn request_body<'a>(&'a self, to: &'a [EmailAddress], message: &'a OutboundMessage) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.config.from,
            to: to.iter().map(EmailAddress::as_str).collect(),
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        }
    }
}

#[async_trait]
impl MessageTransport for HttpMailTransport {
    async fn send(&self, to: &[EmailAddress], message: &OutboundMessage) -> Result<(), TransportError> {
        let body = self.request_body(to, message);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), recipients = to.len(), "mail provider accepted message");
            return Ok(());
        }

        let mut text = response.text().await.unwrap_or_default();
        truncate_on_char_boundary(&mut text, MAX_ERROR_BODY);
        Err(TransportError::Rejected {
            status: status.as_u16(),
            body: text,
        })
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}
