use axum::extract::Extension;

use crate::firestore::Document;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DashboardService;

/// GET /restaurants-cache - every restaurant document, unflattened
pub async fn get(Extension(service): Extension<DashboardService>) -> ApiResult<Document> {
    let documents = service.restaurants().await?;
    tracing::info!("Fetched {} restaurant documents", documents.len());

    Ok(ApiResponse::documents(
        format!(
            "Documents fetched successfully from {}",
            service.restaurants_collection()
        ),
        documents,
    ))
}
