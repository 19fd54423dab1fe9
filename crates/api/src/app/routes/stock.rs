use std::sync::Arc;

use axum::{Extension, Json, extract::rejection::JsonRejection, response::IntoResponse};
use serde_json::json;

use crate::app::dto::StockReportRequest;
use crate::app::errors;
use crate::app::services::AppServices;

/// Direct stock report from a client that already knows both levels.
pub async fn report(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<StockReportRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let reading = match req.into_reading() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let event = services.workflow.process(&reading).await;
    Json(json!({ "received": true, "notification": event })).into_response()
}
