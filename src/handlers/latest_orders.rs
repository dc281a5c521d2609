use axum::extract::{Extension, Query};

use super::utils::SubCollectionQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{DashboardRow, DashboardService};

/// GET /latest-orders?subCollection=I001
///
/// Collection-group query over every `I001` collection; each order gets a
/// `combinedField` of sub-collection, order number, creation and posting dates.
pub async fn get(
    Query(query): Query<SubCollectionQuery>,
    Extension(service): Extension<DashboardService>,
) -> ApiResult<DashboardRow> {
    let sub_collection = query.require()?;

    let rows = service.latest_orders(sub_collection).await?;
    tracing::info!("Fetched {} latest orders for {}", rows.len(), sub_collection);

    Ok(ApiResponse::documents("Documents fetched successfully", rows))
}
