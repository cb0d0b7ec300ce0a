use axum::{extract::Path, Extension};
use serde_json::Value;

use crate::database::repository;
use crate::error::ApiError;
use crate::middleware::authorize::Staff;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::sensitivity::Visibility;
use crate::policy::filters::filter_document;

/// GET /api/documents/:document_id - one stored document
///
/// Metadata stays visible for workers; the embedded content is masked when
/// the hide flag is set.
pub async fn get(
    Staff(user): Staff,
    Extension(vis): Extension<Visibility>,
    Path(document_id): Path<i64>,
) -> ApiResult<Value> {
    let record = repository::document_by_id(document_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("document {} not found", document_id)))?;
    Ok(ApiResponse::success(filter_document(
        &record, user.role, vis.hide,
    )))
}
