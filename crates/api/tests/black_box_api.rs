use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use uniasia_api::app::{self, AppServices};
use uniasia_core::EmailAddress;
use uniasia_inventory::{ExpiryWindow, Threshold};
use uniasia_notifications::{
    ActivityLog, DirectoryError, EmptyDirectory, InMemoryActivityLog, MessageTransport, OutboundMessage,
    RecipientDirectory, StaticRecipients, TransportError,
};

const SECRET: &str = "test-secret";

/// Captures outbound messages instead of calling a mail provider.
#[derive(Default)]
struct CapturingTransport {
    sent: Mutex<Vec<(Vec<String>, OutboundMessage)>>,
    fail: bool,
}

impl CapturingTransport {
    fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    fn sent(&self) -> Vec<(Vec<String>, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageTransport for CapturingTransport {
    async fn send(&self, to: &[EmailAddress], message: &OutboundMessage) -> Result<(), TransportError> {
        let to = to.iter().map(|e| e.as_str().to_string()).collect();
        self.sent.lock().unwrap().push((to, message.clone()));
        if self.fail {
            return Err(TransportError::Rejected { status: 500, body: "boom".to_string() });
        }
        Ok(())
    }
}

struct BrokenDirectory;

#[async_trait]
impl RecipientDirectory for BrokenDirectory {
    async fn admin_emails(&self) -> Result<Vec<EmailAddress>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".to_string()))
    }
}

fn emails(list: &[&str]) -> Vec<EmailAddress> {
    list.iter().map(|e| EmailAddress::parse(e).unwrap()).collect()
}

struct TestServer {
    base_url: String,
    transport: Arc<CapturingTransport>,
    activity: Arc<InMemoryActivityLog>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(
            Arc::new(StaticRecipients::new(emails(&["admin1@uniasia.com", "admin2@uniasia.com"]))),
            Vec::new(),
            CapturingTransport::default(),
        )
        .await
    }

    async fn spawn_with(
        directory: Arc<dyn RecipientDirectory>,
        fallback: Vec<EmailAddress>,
        transport: CapturingTransport,
    ) -> Self {
        let transport = Arc::new(transport);
        let activity = Arc::new(InMemoryActivityLog::new());
        let services = AppServices::from_parts(
            Threshold::DEFAULT,
            ExpiryWindow::DEFAULT,
            directory,
            fallback,
            transport.clone(),
            activity.clone() as Arc<dyn ActivityLog>,
        );

        // Same router as prod, bound to an ephemeral port.
        let router = app::build_app(SECRET, services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url,
            transport,
            activity,
            handle,
        }
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = reqwest::Client::new()
            .post(format!("{}{}", self.base_url, path))
            .header("x-webhook-secret", SECRET)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn product_update(previous: i64, current: i64) -> Value {
    json!({
        "type": "UPDATE",
        "table": "products",
        "schema": "public",
        "record": { "id": "p-100", "name": "Hex Bolt M8", "stock_quantity": current },
        "old_record": { "id": "p-100", "name": "Hex Bolt M8", "stock_quantity": previous },
    })
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_wrong_secret_is_rejected_before_evaluation() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/webhooks/inventory", srv.base_url))
        .json(&product_update(10, 3))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/webhooks/inventory", srv.base_url))
        .header("x-webhook-secret", "wrong")
        .json(&product_update(10, 3))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    // Garbage bodies are not even parsed without the secret.
    let res = client
        .post(format!("{}/stock/report", srv.base_url))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert!(srv.transport.sent().is_empty());
    assert!(srv.activity.all().is_empty());
}

#[tokio::test]
async fn bearer_secret_is_accepted() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(format!("{}/stock/report", srv.base_url))
        .bearer_auth(SECRET)
        .json(&json!({ "productId": "p-1", "productName": "Anchor", "currentQuantity": 20 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn crossing_notifies_every_admin_in_one_send() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.post("/webhooks/inventory", product_update(10, 3)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);

    let event = &body["notification"];
    assert_eq!(event["productName"], "Hex Bolt M8");
    assert_eq!(event["quantity"], 3);
    assert_eq!(event["previousQuantity"], 10);
    assert_eq!(event["outcome"], "sent");
    assert_eq!(event["report"]["ok"], true);
    assert_eq!(event["report"]["sentCount"], 2);
    assert_eq!(event["recipients"].as_array().unwrap().len(), 2);

    let sent = srv.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, vec!["admin1@uniasia.com", "admin2@uniasia.com"]);
    assert!(sent[0].1.text.contains("Hex Bolt M8"));
    assert!(sent[0].1.text.contains('3'));

    let log = srv.activity.all();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "notification.low_stock.sent");
}

#[tokio::test]
async fn staying_low_does_not_notify_again() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.post("/webhooks/inventory", product_update(3, 2)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["outcome"], "skipped");
    assert_eq!(body["notification"]["recipients"], json!([]));

    let (_, body) = srv.post("/webhooks/inventory", product_update(10, 6)).await;
    assert_eq!(body["notification"]["outcome"], "skipped");

    assert!(srv.transport.sent().is_empty());
    assert!(srv.activity.all().is_empty());
}

#[tokio::test]
async fn exactly_at_threshold_counts_as_low() {
    let srv = TestServer::spawn().await;
    let (_, body) = srv.post("/webhooks/inventory", product_update(6, 5)).await;
    assert_eq!(body["notification"]["outcome"], "sent");
}

#[tokio::test]
async fn direct_report_without_history_notifies_when_low() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv
        .post(
            "/stock/report",
            json!({ "productId": "p-7", "productName": "Anchor", "currentQuantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["previousQuantity"], Value::Null);
    assert_eq!(body["notification"]["outcome"], "sent");
    assert_eq!(srv.transport.sent().len(), 1);
}

#[tokio::test]
async fn negative_quantity_is_invalid_input() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.post("/webhooks/inventory", product_update(10, -1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, _) = srv
        .post(
            "/stock/report",
            json!({ "productId": "p-1", "productName": "Anchor", "currentQuantity": 2, "previousQuantity": -3 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(srv.transport.sent().is_empty());
}

#[tokio::test]
async fn malformed_json_is_invalid_input() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(format!("{}/stock/report", srv.base_url))
        .header("x-webhook-secret", SECRET)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn delivery_failure_is_reported_not_raised() {
    let srv = TestServer::spawn_with(
        Arc::new(StaticRecipients::new(emails(&["admin1@uniasia.com"]))),
        Vec::new(),
        CapturingTransport::failing(),
    )
    .await;

    let (status, body) = srv.post("/webhooks/inventory", product_update(10, 3)).await;
    assert_eq!(status, StatusCode::OK);
    let event = &body["notification"];
    assert_eq!(event["outcome"], "failed");
    assert_eq!(event["recipients"], json!([]));
    assert_eq!(event["report"]["ok"], false);
    assert_eq!(event["report"]["sentCount"], 0);
    assert_eq!(event["report"]["reason"], "DeliveryFailed");

    let log = srv.activity.all();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "notification.low_stock.failed");
}

#[tokio::test]
async fn no_recipients_anywhere_is_reported() {
    let srv = TestServer::spawn_with(Arc::new(EmptyDirectory), Vec::new(), CapturingTransport::default()).await;

    let (status, body) = srv.post("/webhooks/inventory", product_update(10, 3)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["outcome"], "failed");
    assert_eq!(body["notification"]["report"]["reason"], "NoRecipients");
    assert!(srv.transport.sent().is_empty());
}

#[tokio::test]
async fn unavailable_directory_falls_back_to_configured_recipients() {
    let srv = TestServer::spawn_with(
        Arc::new(BrokenDirectory),
        emails(&["ops@uniasia.com"]),
        CapturingTransport::default(),
    )
    .await;

    let (_, body) = srv.post("/webhooks/inventory", product_update(10, 3)).await;
    let report = &body["notification"]["report"];
    assert_eq!(report["ok"], true);
    assert_eq!(report["source"], "fallback");
    assert_eq!(srv.transport.sent()[0].0, vec!["ops@uniasia.com"]);
}

#[tokio::test]
async fn deletes_and_other_tables_are_acknowledged_without_evaluation() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post(
            "/webhooks/inventory",
            json!({
                "type": "DELETE",
                "table": "products",
                "old_record": { "id": "p-100", "name": "Hex Bolt M8", "stock_quantity": 0 },
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": true, "notification": null }));

    let (status, body) = srv
        .post(
            "/webhooks/inventory",
            json!({ "type": "INSERT", "table": "orders", "record": { "id": 1 } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"], Value::Null);

    assert!(srv.transport.sent().is_empty());
}

#[tokio::test]
async fn digest_sends_one_message_for_all_crossings() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post(
            "/notifications/low-stock/digest",
            json!({ "items": [
                { "productId": "a", "productName": "Anchor", "currentQuantity": 2, "previousQuantity": 8 },
                { "productId": "b", "productName": "Bracket", "currentQuantity": 40, "previousQuantity": 50 },
                { "productId": "c", "productName": "Clamp", "currentQuantity": 0 },
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "low_stock_digest");
    assert_eq!(body["evaluated"], 3);
    assert_eq!(body["included"], json!(["Anchor", "Clamp"]));
    assert_eq!(body["outcome"], "sent");

    let sent = srv.transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.text.contains("Anchor"));
    assert!(!sent[0].1.text.contains("Bracket"));
}

#[tokio::test]
async fn expiring_items_outside_the_window_are_left_out() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post(
            "/notifications/expiring",
            json!({
                "today": "2026-03-01",
                "items": [
                    { "productName": "Sealant", "quantity": 6, "expiresOn": "2026-03-10" },
                    { "productName": "Primer", "quantity": 2, "expiresOn": "2026-06-01" },
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "expiring_items");
    assert_eq!(body["included"], json!(["Sealant"]));
    assert_eq!(body["outcome"], "sent");
    assert_eq!(srv.transport.sent().len(), 1);

    let (status, body) = srv.post("/notifications/expiring", json!({ "items": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}
