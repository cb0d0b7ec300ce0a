use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{AuditAction, AuditEvent, AuditLog};
use crate::database::repository::{self, NewJob};
use crate::error::ApiError;
use crate::middleware::authorize::{ensure_job_access, AnyUser, Managers, Staff};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::sensitivity::Visibility;
use crate::policy::filters::filter_service_request;
use crate::policy::list::filter_list;
use crate::policy::Role;

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
    pub customer: Option<i64>,
}

/// GET /api/jobs - list jobs, filtered per role
pub async fn list(
    AnyUser(user): AnyUser,
    Extension(vis): Extension<Visibility>,
    Query(query): Query<JobListQuery>,
) -> ApiResult<Value> {
    // Customers only ever see their own jobs, whatever they ask for.
    let customer_id = if user.role == Role::Customer {
        Some(user.customer_id.ok_or_else(|| {
            ApiError::forbidden("customer account is not linked to a customer record")
        })?)
    } else {
        query.customer
    };

    let records = repository::list_jobs(query.status.as_deref(), customer_id).await?;
    let filtered = filter_list(Some(&Value::Array(records)), |r| {
        filter_service_request(r, user.role, vis.hide)
    });
    Ok(ApiResponse::success(filtered))
}

/// GET /api/jobs/:job_number - one job with nested collections
pub async fn get(
    AnyUser(user): AnyUser,
    Extension(vis): Extension<Visibility>,
    Path(job_number): Path<String>,
) -> ApiResult<Value> {
    let record = repository::job_with_details(&job_number)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {} not found", job_number)))?;

    // Ownership comes after the fetch (a missing job stays 404) and before
    // any filtering.
    ensure_job_access(&user, record.get("customer_id").and_then(Value::as_i64))?;

    Ok(ApiResponse::success(filter_service_request(
        &record, user.role, vis.hide,
    )))
}

/// POST /api/jobs - register a repair request
pub async fn create(
    Managers(user): Managers,
    Extension(audit): Extension<AuditLog>,
    Json(payload): Json<NewJob>,
) -> ApiResult<Value> {
    if payload.motor_type.trim().is_empty() {
        return Err(ApiError::bad_request("motor_type must not be empty"));
    }

    let record = repository::insert_job(&payload).await?;
    let job_number = record
        .get("job_number")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    audit.record(
        AuditEvent::new(
            AuditAction::JobCreated,
            user.user_id,
            json!({ "customer_id": payload.customer_id }),
        )
        .for_job(&job_number),
    );

    Ok(ApiResponse::created(record))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// PUT /api/jobs/:job_number/status - move a job through the workflow
pub async fn update_status(
    Staff(user): Staff,
    Extension(vis): Extension<Visibility>,
    Extension(audit): Extension<AuditLog>,
    Path(job_number): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> ApiResult<Value> {
    let status = payload.status.trim();
    if status.is_empty() {
        return Err(ApiError::bad_request("status must not be empty"));
    }

    let previous = repository::job_status(&job_number)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {} not found", job_number)))?;

    let record = repository::update_job_status(&job_number, status)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {} not found", job_number)))?;

    audit.record(
        AuditEvent::new(
            AuditAction::JobStatusChanged,
            user.user_id,
            json!({ "from": previous, "to": status }),
        )
        .for_job(&job_number),
    );

    Ok(ApiResponse::success(filter_service_request(
        &record, user.role, vis.hide,
    )))
}
