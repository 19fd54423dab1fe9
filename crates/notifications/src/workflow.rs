//! Decide → resolve → deliver → report.
//!
//! Every entry point (webhook, direct report, digests) funnels through
//! [`LowStockWorkflow`], so there is exactly one threshold rule in play.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use uniasia_core::{NotificationId, ProductId};
use uniasia_inventory::{
    ExpiringItem, ExpiryWindow, Quantity, StockAssessment, StockReading, Threshold, ThresholdMonitor,
};

use crate::activity::{ActivityLog, ActivityRecord};
use crate::message::{ExpiringLine, LowStockLine};
use crate::notifier::{AdminNotifier, NotifyReport};
use crate::recipient::NotificationRecipient;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Sent,
    Skipped,
    Failed,
}

impl Outcome {
    fn from_report(report: &NotifyReport) -> Self {
        if report.ok { Outcome::Sent } else { Outcome::Failed }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Sent => "sent",
            Outcome::Skipped => "skipped",
            Outcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LowStock,
    LowStockDigest,
    ExpiringItems,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::LowStock => "low_stock",
            NotificationKind::LowStockDigest => "low_stock_digest",
            NotificationKind::ExpiringItems => "expiring_items",
        }
    }
}

/// Result of evaluating one stock reading.
///
/// `outcome == Sent` implies the reading crossed the threshold and
/// `recipients` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: NotificationId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Quantity,
    pub previous_quantity: Option<Quantity>,
    pub threshold: Threshold,
    pub assessment: StockAssessment,
    pub recipients: Vec<NotificationRecipient>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<NotifyReport>,
}

/// Result of a batch (digest) notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestEvent {
    pub id: NotificationId,
    pub kind: NotificationKind,
    /// Number of items the caller submitted.
    pub evaluated: usize,
    /// Product names included in the message.
    pub included: Vec<String>,
    pub recipients: Vec<NotificationRecipient>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<NotifyReport>,
}

#[derive(Clone)]
pub struct LowStockWorkflow {
    monitor: ThresholdMonitor,
    expiry_window: ExpiryWindow,
    notifier: AdminNotifier,
    activity: Arc<dyn ActivityLog>,
}

impl LowStockWorkflow {
    pub fn new(
        monitor: ThresholdMonitor,
        expiry_window: ExpiryWindow,
        notifier: AdminNotifier,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            monitor,
            expiry_window,
            notifier,
            activity,
        }
    }

    pub fn threshold(&self) -> Threshold {
        self.monitor.threshold()
    }

    pub fn expiry_window(&self) -> ExpiryWindow {
        self.expiry_window
    }

    /// Evaluate a single reading and notify administrators on a crossing.
    pub async fn process(&self, reading: &StockReading) -> NotificationEvent {
        let assessment = self.monitor.assess_reading(reading);
        let threshold = self.monitor.threshold();

        let mut event = NotificationEvent {
            id: NotificationId::new(),
            product_id: reading.product_id().clone(),
            product_name: reading.product_name().to_string(),
            quantity: reading.current(),
            previous_quantity: reading.previous(),
            threshold,
            assessment,
            recipients: Vec::new(),
            outcome: Outcome::Skipped,
            report: None,
        };

        if !assessment.should_notify() {
            tracing::debug!(
                product_id = %event.product_id,
                quantity = %event.quantity,
                assessment = assessment.as_str(),
                "low-stock notification skipped"
            );
            return event;
        }

        let report = self
            .notifier
            .notify_low_stock(reading.product_name(), reading.current(), threshold)
            .await;

        event.outcome = Outcome::from_report(&report);
        if event.outcome == Outcome::Sent {
            event.recipients = to_recipients(&report);
        }
        event.report = Some(report);

        self.audit(
            event.id,
            NotificationKind::LowStock,
            event.outcome,
            &event.product_name,
            serde_json::json!({
                "product_id": event.product_id,
                "quantity": event.quantity,
                "previous_quantity": event.previous_quantity,
                "threshold": threshold,
                "assessment": assessment,
                "report": event.report,
            }),
        )
        .await;

        event
    }

    /// Evaluate many readings and send one message for all crossings.
    pub async fn process_batch(&self, readings: &[StockReading]) -> DigestEvent {
        let crossed: Vec<LowStockLine> = self
            .monitor
            .crossings(readings)
            .into_iter()
            .map(LowStockLine::from)
            .collect();

        let mut event = DigestEvent {
            id: NotificationId::new(),
            kind: NotificationKind::LowStockDigest,
            evaluated: readings.len(),
            included: crossed.iter().map(|l| l.product_name.clone()).collect(),
            recipients: Vec::new(),
            outcome: Outcome::Skipped,
            report: None,
        };

        if crossed.is_empty() {
            tracing::debug!(evaluated = readings.len(), "low-stock digest skipped: no crossings");
            return event;
        }

        let report = self
            .notifier
            .notify_low_stock_digest(&crossed, self.monitor.threshold())
            .await;
        self.finish_digest(&mut event, report).await;
        event
    }

    /// Report stock expiring within the configured window in one message.
    pub async fn process_expiring(&self, items: &[ExpiringItem], today: NaiveDate) -> DigestEvent {
        let lines: Vec<ExpiringLine> = self
            .expiry_window
            .select(items, today)
            .into_iter()
            .map(|i| ExpiringLine::from_item(i, today))
            .collect();

        let mut event = DigestEvent {
            id: NotificationId::new(),
            kind: NotificationKind::ExpiringItems,
            evaluated: items.len(),
            included: lines.iter().map(|l| l.product_name.clone()).collect(),
            recipients: Vec::new(),
            outcome: Outcome::Skipped,
            report: None,
        };

        if lines.is_empty() {
            tracing::debug!(
                evaluated = items.len(),
                window_days = self.expiry_window.get(),
                "expiring-items notification skipped: nothing in window"
            );
            return event;
        }

        let report = self.notifier.notify_expiring(&lines).await;
        self.finish_digest(&mut event, report).await;
        event
    }

    async fn finish_digest(&self, event: &mut DigestEvent, report: NotifyReport) {
        event.outcome = Outcome::from_report(&report);
        if event.outcome == Outcome::Sent {
            event.recipients = to_recipients(&report);
        }
        event.report = Some(report);

        let entity = format!("{} item(s)", event.included.len());
        self.audit(
            event.id,
            event.kind,
            event.outcome,
            &entity,
            serde_json::json!({
                "evaluated": event.evaluated,
                "included": event.included,
                "report": event.report,
            }),
        )
        .await;
    }

    /// Append an audit row; a failing log never changes the outcome.
    async fn audit(
        &self,
        id: NotificationId,
        kind: NotificationKind,
        outcome: Outcome,
        entity: &str,
        details: serde_json::Value,
    ) {
        let record = ActivityRecord {
            id,
            action: format!("notification.{}.{}", kind.as_str(), outcome.as_str()),
            entity: entity.to_string(),
            details,
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.activity.record(record).await {
            tracing::warn!(notification_id = %id, error = %e, "failed to record notification activity");
        }
    }
}

fn to_recipients(report: &NotifyReport) -> Vec<NotificationRecipient> {
    report
        .recipients
        .iter()
        .cloned()
        .map(NotificationRecipient::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityLogError, InMemoryActivityLog};
    use crate::error::NotifyFailure;
    use crate::notifier::tests::{emails, notifier_with, RecordingTransport};

    use async_trait::async_trait;

    struct BrokenActivityLog;

    #[async_trait]
    impl ActivityLog for BrokenActivityLog {
        async fn record(&self, _record: ActivityRecord) -> Result<(), ActivityLogError> {
            Err(ActivityLogError::Write("disk full".to_string()))
        }
    }

    fn workflow(
        directory: &[&str],
        fallback: &[&str],
        transport: Arc<RecordingTransport>,
        activity: Arc<dyn ActivityLog>,
    ) -> LowStockWorkflow {
        LowStockWorkflow::new(
            ThresholdMonitor::new(Threshold::new(5)),
            ExpiryWindow::days(30),
            notifier_with(directory, fallback, transport),
            activity,
        )
    }

    fn reading(current: i64, previous: Option<i64>) -> StockReading {
        StockReading::from_raw("p-1", "Hex Bolt M8", current, previous).unwrap()
    }

    #[tokio::test]
    async fn crossing_sends_to_both_admins() {
        let transport = Arc::new(RecordingTransport::default());
        let log = Arc::new(InMemoryActivityLog::new());
        let wf = workflow(&["a@x.com", "b@x.com"], &[], transport.clone(), log.clone());

        let event = wf.process(&reading(3, Some(10))).await;

        assert_eq!(event.assessment, StockAssessment::CrossedBelow);
        assert_eq!(event.outcome, Outcome::Sent);
        assert_eq!(event.recipients.len(), 2);
        let report = event.report.unwrap();
        assert!(report.ok);
        assert_eq!(report.sent_count, 2);
        assert_eq!(transport.send_count(), 1);

        let rows = log.all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action, "notification.low_stock.sent");
        assert_eq!(rows[0].entity, "Hex Bolt M8");
        assert_eq!(rows[0].id, event.id);
    }

    #[tokio::test]
    async fn still_low_skips_without_calling_notifier() {
        let transport = Arc::new(RecordingTransport::default());
        let log = Arc::new(InMemoryActivityLog::new());
        let wf = workflow(&["a@x.com"], &[], transport.clone(), log.clone());

        let event = wf.process(&reading(2, Some(3))).await;

        assert_eq!(event.outcome, Outcome::Skipped);
        assert_eq!(event.assessment, StockAssessment::StillLow);
        assert!(event.report.is_none());
        assert!(event.recipients.is_empty());
        assert_eq!(transport.send_count(), 0);
        assert!(log.all().is_empty());
    }

    #[tokio::test]
    async fn no_recipients_fails_without_recipients_on_event() {
        let transport = Arc::new(RecordingTransport::default());
        let log = Arc::new(InMemoryActivityLog::new());
        let wf = workflow(&[], &[], transport.clone(), log.clone());

        let event = wf.process(&reading(0, None)).await;

        assert_eq!(event.outcome, Outcome::Failed);
        assert!(event.recipients.is_empty());
        assert_eq!(event.report.unwrap().reason, Some(NotifyFailure::NoRecipients));
        assert_eq!(log.all()[0].action, "notification.low_stock.failed");
    }

    #[tokio::test]
    async fn delivery_failure_is_failed_outcome() {
        let transport = Arc::new(RecordingTransport::failing());
        let wf = workflow(&["a@x.com"], &[], transport.clone(), Arc::new(InMemoryActivityLog::new()));

        let event = wf.process(&reading(1, Some(8))).await;

        assert_eq!(event.outcome, Outcome::Failed);
        assert!(event.recipients.is_empty());
        assert_eq!(event.report.unwrap().reason, Some(NotifyFailure::DeliveryFailed));
    }

    #[tokio::test]
    async fn broken_activity_log_does_not_change_outcome() {
        let transport = Arc::new(RecordingTransport::default());
        let wf = workflow(&["a@x.com"], &[], transport.clone(), Arc::new(BrokenActivityLog));

        let event = wf.process(&reading(1, Some(8))).await;
        assert_eq!(event.outcome, Outcome::Sent);
    }

    #[tokio::test]
    async fn batch_sends_one_message_for_all_crossings() {
        let transport = Arc::new(RecordingTransport::default());
        let wf = workflow(&[], &["ops@uniasia.com"], transport.clone(), Arc::new(InMemoryActivityLog::new()));

        let readings = vec![
            StockReading::from_raw("a", "Anchor", 1, Some(9)).unwrap(),
            StockReading::from_raw("b", "Bracket", 2, Some(3)).unwrap(),
            StockReading::from_raw("d", "Dowel", 4, None).unwrap(),
        ];
        let event = wf.process_batch(&readings).await;

        assert_eq!(event.kind, NotificationKind::LowStockDigest);
        assert_eq!(event.outcome, Outcome::Sent);
        assert_eq!(event.evaluated, 3);
        assert_eq!(event.included, vec!["Anchor".to_string(), "Dowel".to_string()]);
        assert_eq!(event.recipients, vec![NotificationRecipient::from(emails(&["ops@uniasia.com"])[0].clone())]);
        assert_eq!(transport.send_count(), 1);
    }

    #[tokio::test]
    async fn batch_without_crossings_is_skipped() {
        let transport = Arc::new(RecordingTransport::default());
        let wf = workflow(&["a@x.com"], &[], transport.clone(), Arc::new(InMemoryActivityLog::new()));

        let readings = vec![StockReading::from_raw("b", "Bracket", 40, Some(3)).unwrap()];
        let event = wf.process_batch(&readings).await;

        assert_eq!(event.outcome, Outcome::Skipped);
        assert_eq!(transport.send_count(), 0);
    }

    #[tokio::test]
    async fn expiring_items_inside_window_are_sent() {
        let transport = Arc::new(RecordingTransport::default());
        let wf = workflow(&["a@x.com"], &[], transport.clone(), Arc::new(InMemoryActivityLog::new()));
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let items = vec![
            ExpiringItem::new("Sealant", Quantity::from_u32(6), NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()).unwrap(),
            ExpiringItem::new("Primer", Quantity::from_u32(2), NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()).unwrap(),
        ];
        let event = wf.process_expiring(&items, today).await;

        assert_eq!(event.kind, NotificationKind::ExpiringItems);
        assert_eq!(event.outcome, Outcome::Sent);
        assert_eq!(event.included, vec!["Sealant".to_string()]);
        let sends = transport.sends.lock().unwrap();
        assert!(sends[0].1.subject.contains("Expiring stock: 1 item(s)"));
    }
}
