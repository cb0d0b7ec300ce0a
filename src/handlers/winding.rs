use axum::{extract::Path, Extension};
use serde_json::Value;

use crate::database::repository;
use crate::error::ApiError;
use crate::middleware::authorize::Staff;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::sensitivity::Visibility;
use crate::policy::filters::filter_winding_details;

/// GET /api/jobs/:job_number/winding - rewind specifications for one job
///
/// Each row carries its own joined `job_status`, and the stage gate is
/// applied per record rather than once per call.
pub async fn list_for_job(
    Staff(user): Staff,
    Extension(vis): Extension<Visibility>,
    Path(job_number): Path<String>,
) -> ApiResult<Value> {
    let records = repository::winding_for_job(&job_number).await?;

    // A job without winding records is an empty list; a missing job is 404.
    if records.is_empty() && repository::job_status(&job_number).await?.is_none() {
        return Err(ApiError::not_found(format!("job {} not found", job_number)));
    }

    let filtered: Vec<Value> = records
        .iter()
        .map(|record| {
            let job_status = record
                .get("job_status")
                .and_then(Value::as_str)
                .unwrap_or_default();
            filter_winding_details(record, user.role, vis.hide, job_status)
        })
        .collect();

    Ok(ApiResponse::success(Value::Array(filtered)))
}
