use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Envelope the dashboard datasource reads: `{"message": ..., "documents": [...]}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub documents: Vec<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn documents(message: impl Into<String>, documents: Vec<T>) -> Self {
        Self {
            message: message.into(),
            documents,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let documents = match serde_json::to_value(&self.documents) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response documents: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": true,
                        "message": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "message": self.message,
            "documents": documents
        });

        (StatusCode::OK, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
