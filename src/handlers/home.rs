use axum::response::Json;
use serde_json::{json, Value};

/// GET / - liveness banner the dashboard uses to test the datasource
pub async fn get() -> Json<Value> {
    Json(json!({ "message": "Server is running" }))
}
