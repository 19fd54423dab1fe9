use std::sync::Arc;

use axum::{Extension, Json, extract::rejection::JsonRejection, response::IntoResponse};
use serde_json::json;

use crate::app::dto::DatabaseChangePayload;
use crate::app::errors;
use crate::app::services::AppServices;

/// Row-change webhook from the backend store.
///
/// Responds 200 once the payload is valid, whatever happened to the
/// notification; the outcome is in the returned event.
pub async fn inventory_change(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<DatabaseChangePayload>, JsonRejection>,
) -> axum::response::Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let table = payload.table.clone();
    let kind = payload.kind;

    let reading = match payload.into_reading() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let Some(reading) = reading else {
        tracing::debug!(table = %table, kind = ?kind, "change carries no stock level; ignored");
        return Json(json!({ "received": true, "notification": null })).into_response();
    };

    let event = services.workflow.process(&reading).await;
    Json(json!({ "received": true, "notification": event })).into_response()
}
