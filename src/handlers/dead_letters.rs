use axum::extract::{Extension, Query};

use super::utils::SubCollectionQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{DashboardRow, DashboardService};

/// GET /dead-letters-specific?subCollection=2024-12-16
///
/// One entry per store order of each dead-lettered payload filed under that day.
pub async fn get(
    Query(query): Query<SubCollectionQuery>,
    Extension(service): Extension<DashboardService>,
) -> ApiResult<DashboardRow> {
    let sub_collection = query.require()?;

    let rows = service.dead_letters(sub_collection).await?;
    tracing::info!("Fetched {} dead letter rows for {}", rows.len(), sub_collection);

    Ok(ApiResponse::documents("Documents fetched successfully", rows))
}
