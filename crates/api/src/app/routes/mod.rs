use axum::{Router, routing::post};

pub mod notifications;
pub mod stock;
pub mod system;
pub mod webhooks;

/// Router for all secret-guarded endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/webhooks/inventory", post(webhooks::inventory_change))
        .route("/stock/report", post(stock::report))
        .route("/notifications/low-stock/digest", post(notifications::low_stock_digest))
        .route("/notifications/expiring", post(notifications::expiring))
}
