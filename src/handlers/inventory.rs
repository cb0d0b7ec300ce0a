use axum::{extract::Query, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::database::repository;
use crate::middleware::authorize::Staff;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::sensitivity::Visibility;
use crate::policy::filters::filter_inventory;
use crate::policy::list::filter_list;

#[derive(Debug, Deserialize)]
pub struct InventoryQuery {
    /// Restrict to parts at or below their reorder threshold.
    #[serde(default)]
    pub below_reorder: bool,
}

/// GET /api/inventory - stock levels; pricing masked for workers under hide
pub async fn list(
    Staff(user): Staff,
    Extension(vis): Extension<Visibility>,
    Query(query): Query<InventoryQuery>,
) -> ApiResult<Value> {
    let records = repository::list_inventory(query.below_reorder).await?;
    let filtered = filter_list(Some(&Value::Array(records)), |r| {
        filter_inventory(r, user.role, vis.hide)
    });
    Ok(ApiResponse::success(filtered))
}
