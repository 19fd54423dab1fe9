//! Administrator recipient resolution.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use uniasia_core::EmailAddress;

use crate::error::NotifyError;

/// A single notification audience member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationRecipient {
    pub email_address: EmailAddress,
}

impl From<EmailAddress> for NotificationRecipient {
    fn from(email_address: EmailAddress) -> Self {
        Self { email_address }
    }
}

/// Directory lookup failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// "List accounts with the administrator role → email addresses".
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn admin_emails(&self) -> Result<Vec<EmailAddress>, DirectoryError>;
}

/// A directory with no accounts (used when no backend store is configured).
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDirectory;

#[async_trait]
impl RecipientDirectory for EmptyDirectory {
    async fn admin_emails(&self) -> Result<Vec<EmailAddress>, DirectoryError> {
        Ok(Vec::new())
    }
}

/// Statically configured recipients.
///
/// Serves as the fallback audience when the directory is empty, and can also
/// stand in as a directory itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticRecipients(Vec<EmailAddress>);

impl StaticRecipients {
    pub fn new(addresses: Vec<EmailAddress>) -> Self {
        Self(dedup(addresses))
    }

    pub fn addresses(&self) -> &[EmailAddress] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[async_trait]
impl RecipientDirectory for StaticRecipients {
    async fn admin_emails(&self) -> Result<Vec<EmailAddress>, DirectoryError> {
        Ok(self.0.clone())
    }
}

/// Where a resolved recipient list came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientSource {
    Directory,
    Fallback,
}

/// A non-empty, de-duplicated recipient list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecipients {
    pub addresses: Vec<EmailAddress>,
    pub source: RecipientSource,
}

/// Directory first, static fallback second.
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn RecipientDirectory>,
    fallback: StaticRecipients,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn RecipientDirectory>, fallback: StaticRecipients) -> Self {
        Self { directory, fallback }
    }

    /// Resolve the current administrator audience.
    ///
    /// A failing directory is treated like an empty one so the fallback list
    /// still gets the alert.
    pub async fn resolve(&self) -> Result<ResolvedRecipients, NotifyError> {
        let from_directory = match self.directory.admin_emails().await {
            Ok(addresses) => dedup(addresses),
            Err(e) => {
                tracing::warn!(error = %e, "admin directory lookup failed; using fallback recipients");
                Vec::new()
            }
        };

        if !from_directory.is_empty() {
            return Ok(ResolvedRecipients {
                addresses: from_directory,
                source: RecipientSource::Directory,
            });
        }

        if !self.fallback.is_empty() {
            tracing::debug!(
                count = self.fallback.addresses().len(),
                "admin directory empty; using fallback recipients"
            );
            return Ok(ResolvedRecipients {
                addresses: self.fallback.addresses().to_vec(),
                source: RecipientSource::Fallback,
            });
        }

        Err(NotifyError::NoRecipients)
    }
}

fn dedup(addresses: Vec<EmailAddress>) -> Vec<EmailAddress> {
    let mut out: Vec<EmailAddress> = Vec::with_capacity(addresses.len());
    for a in addresses {
        if !out.contains(&a) {
            out.push(a);
        }
    }
    out
}
