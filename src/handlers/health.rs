use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};

use crate::services::DashboardService;

/// GET /health - process health; does not call Firestore
pub async fn get(Extension(service): Extension<DashboardService>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
        "project_id": service.client().project_id(),
        "database_id": service.client().database_id(),
    }))
}
