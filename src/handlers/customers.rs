use axum::{extract::Path, Extension, Json};
use serde_json::{json, Value};

use crate::audit::{AuditAction, AuditEvent, AuditLog};
use crate::database::repository::{self, NewCustomer};
use crate::error::ApiError;
use crate::middleware::authorize::{Managers, Staff};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::sensitivity::Visibility;
use crate::policy::filters::filter_customer;
use crate::policy::list::filter_list;

/// GET /api/customers - customer roster, PII masked for workers under hide
pub async fn list(
    Staff(user): Staff,
    Extension(vis): Extension<Visibility>,
) -> ApiResult<Value> {
    let records = repository::list_customers().await?;
    let filtered = filter_list(Some(&Value::Array(records)), |r| {
        filter_customer(r, user.role, vis.hide)
    });
    Ok(ApiResponse::success(filtered))
}

/// GET /api/customers/:customer_id
pub async fn get(
    Staff(user): Staff,
    Extension(vis): Extension<Visibility>,
    Path(customer_id): Path<i64>,
) -> ApiResult<Value> {
    let record = repository::customer_by_id(customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("customer {} not found", customer_id)))?;
    Ok(ApiResponse::success(filter_customer(
        &record, user.role, vis.hide,
    )))
}

/// POST /api/customers
pub async fn create(
    Managers(user): Managers,
    Extension(audit): Extension<AuditLog>,
    Json(payload): Json<NewCustomer>,
) -> ApiResult<Value> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }

    let record = repository::insert_customer(&payload).await?;
    audit.record(AuditEvent::new(
        AuditAction::CustomerCreated,
        user.user_id,
        json!({ "customer_id": record.get("customer_id") }),
    ));

    Ok(ApiResponse::created(record))
}
