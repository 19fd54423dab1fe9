//! Service wiring: pick the directory, mail transport and activity log
//! adapters from configuration and assemble the workflow.

use std::sync::Arc;

use anyhow::Context;

use uniasia_core::EmailAddress;
use uniasia_infra::activity::PgActivityLog;
use uniasia_infra::db;
use uniasia_infra::directory::PgAdminDirectory;
use uniasia_infra::mail::{DisabledTransport, HttpMailTransport};
use uniasia_inventory::{ExpiryWindow, Threshold, ThresholdMonitor};
use uniasia_notifications::{
    ActivityLog, AdminNotifier, EmptyDirectory, InMemoryActivityLog, LowStockWorkflow, MessageTransport,
    RecipientDirectory, RecipientResolver, StaticRecipients,
};

use crate::config::ApiConfig;

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub workflow: LowStockWorkflow,
}

impl AppServices {
    pub fn new(workflow: LowStockWorkflow) -> Self {
        Self { workflow }
    }

    /// Assemble the workflow from already-built adapters.
    pub fn from_parts(
        threshold: Threshold,
        expiry_window: ExpiryWindow,
        directory: Arc<dyn RecipientDirectory>,
        fallback: Vec<EmailAddress>,
        transport: Arc<dyn MessageTransport>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        let resolver = RecipientResolver::new(directory, StaticRecipients::new(fallback));
        let notifier = AdminNotifier::new(resolver, transport);
        let workflow = LowStockWorkflow::new(ThresholdMonitor::new(threshold), expiry_window, notifier, activity);
        Self::new(workflow)
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let (directory, activity): (Arc<dyn RecipientDirectory>, Arc<dyn ActivityLog>) = match &config.database {
        Some(db_config) => {
            let pool = db::connect(db_config).await.context("connect to postgres")?;
            let directory: Arc<dyn RecipientDirectory> =
                Arc::new(PgAdminDirectory::with_role(pool.clone(), config.admin_role.clone()));
            let activity: Arc<dyn ActivityLog> = Arc::new(PgActivityLog::new(pool));
            (directory, activity)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; admin directory is empty and activity is kept in memory");
            let directory: Arc<dyn RecipientDirectory> = Arc::new(EmptyDirectory);
            let activity: Arc<dyn ActivityLog> = Arc::new(InMemoryActivityLog::new());
            (directory, activity)
        }
    };

    let transport: Arc<dyn MessageTransport> = match &config.mail {
        Some(mail_config) => {
            Arc::new(HttpMailTransport::new(mail_config.clone()).context("build mail client")?)
        }
        None => {
            tracing::warn!("MAIL_API_KEY not set; notifications will report DeliveryFailed");
            Arc::new(DisabledTransport)
        }
    };

    if config.fallback_recipients.is_empty() {
        tracing::info!("no ADMIN_FALLBACK_EMAILS configured");
    }

    Ok(AppServices::from_parts(
        config.threshold,
        config.expiry_window,
        directory,
        config.fallback_recipients.clone(),
        transport,
        activity,
    ))
}
