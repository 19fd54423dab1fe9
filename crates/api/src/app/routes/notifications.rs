use std::sync::Arc;

use axum::{Extension, Json, extract::rejection::JsonRejection, response::IntoResponse};
use chrono::Utc;

use crate::app::dto::{ExpiringItemsRequest, LowStockDigestRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn low_stock_digest(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LowStockDigestRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let readings = match req.into_readings() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    Json(services.workflow.process_batch(&readings).await).into_response()
}

pub async fn expiring(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<ExpiringItemsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let today = req.today.unwrap_or_else(|| Utc::now().date_naive());
    let items = match req.into_items() {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    Json(services.workflow.process_expiring(&items, today).await).into_response()
}
