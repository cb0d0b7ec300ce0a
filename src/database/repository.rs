//! Data-access layer.
//!
//! Raw entity records are fetched as role-agnostic JSON (`row_to_json` /
//! `jsonb_build_object`), so the policy layer reshapes them without knowing
//! column types. Not-found is `Ok(None)` or an empty list, never an error.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use sqlx::Row;
use uuid::Uuid;

use super::{pool, DatabaseError};

/// Initial workflow status for a newly created job.
pub const INITIAL_JOB_STATUS: &str = "Estimation in Progress";

/// Row from the users table, used by the login route.
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub worker_id: Option<i64>,
    pub customer_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NewJob {
    pub customer_id: i64,
    pub motor_type: String,
    pub motor_make: Option<String>,
    pub hp: Option<Decimal>,
    pub kw: Option<Decimal>,
    pub phase: Option<i16>,
    pub estimated_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

pub async fn user_by_email(email: &str) -> Result<Option<UserRow>, DatabaseError> {
    let pool = pool().await?;
    let user = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, name, email, password_hash, role, worker_id, customer_id \
         FROM users WHERE email = $1 AND active",
    )
    .bind(email)
    .fetch_optional(&pool)
    .await?;
    Ok(user)
}

/// One job with every nested collection the filter layer may reshape.
pub async fn job_with_details(job_number: &str) -> Result<Option<Value>, DatabaseError> {
    let pool = pool().await?;
    let row = sqlx::query(
        "SELECT (row_to_json(j)::jsonb || jsonb_build_object(\
            'customer_name', c.name,\
            'work_logs', COALESCE((SELECT jsonb_agg(row_to_json(w)::jsonb ORDER BY w.work_log_id)\
                FROM work_logs w WHERE w.job_number = j.job_number), '[]'::jsonb),\
            'parts_used', COALESCE((SELECT jsonb_agg(row_to_json(p)::jsonb ORDER BY p.part_used_id)\
                FROM parts_used p WHERE p.job_number = j.job_number), '[]'::jsonb),\
            'payments', COALESCE((SELECT jsonb_agg(row_to_json(pay)::jsonb ORDER BY pay.payment_id)\
                FROM payments pay WHERE pay.job_number = j.job_number), '[]'::jsonb),\
            'winding_details', COALESCE((SELECT jsonb_agg(row_to_json(wd)::jsonb ORDER BY wd.winding_id)\
                FROM winding_details wd WHERE wd.job_number = j.job_number), '[]'::jsonb),\
            'documents', COALESCE((SELECT jsonb_agg(row_to_json(d)::jsonb ORDER BY d.document_id)\
                FROM documents d WHERE d.job_number = j.job_number), '[]'::jsonb)\
         )) AS row \
         FROM jobs j JOIN customers c ON c.customer_id = j.customer_id \
         WHERE j.job_number = $1",
    )
    .bind(job_number)
    .fetch_optional(&pool)
    .await?;

    row.map(|r| r.try_get::<Value, _>("row"))
        .transpose()
        .map_err(DatabaseError::from)
}

/// Flat job list with the customer name joined in, newest first.
pub async fn list_jobs(
    status: Option<&str>,
    customer_id: Option<i64>,
) -> Result<Vec<Value>, DatabaseError> {
    let pool = pool().await?;
    let rows = sqlx::query(
        "SELECT row_to_json(t) AS row FROM (\
            SELECT j.*, c.name AS customer_name \
            FROM jobs j JOIN customers c ON c.customer_id = j.customer_id \
            WHERE ($1::text IS NULL OR j.status = $1) \
              AND ($2::bigint IS NULL OR j.customer_id = $2) \
            ORDER BY j.date_received DESC, j.job_number DESC\
         ) t",
    )
    .bind(status)
    .bind(customer_id)
    .fetch_all(&pool)
    .await?;

    rows.into_iter()
        .map(|r| r.try_get::<Value, _>("row").map_err(DatabaseError::from))
        .collect()
}

pub async fn insert_job(job: &NewJob) -> Result<Value, DatabaseError> {
    let pool = pool().await?;
    let row = sqlx::query(
        "INSERT INTO jobs \
            (customer_id, motor_type, motor_make, hp, kw, phase, status, date_received, \
             estimated_amount, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, CURRENT_DATE, $8, $9) \
         RETURNING to_jsonb(jobs) AS row",
    )
    .bind(job.customer_id)
    .bind(&job.motor_type)
    .bind(&job.motor_make)
    .bind(job.hp)
    .bind(job.kw)
    .bind(job.phase)
    .bind(INITIAL_JOB_STATUS)
    .bind(job.estimated_amount)
    .bind(&job.notes)
    .fetch_one(&pool)
    .await?;

    row.try_get::<Value, _>("row").map_err(DatabaseError::from)
}

/// Current workflow status of a job; `None` when the job does not exist.
pub async fn job_status(job_number: &str) -> Result<Option<String>, DatabaseError> {
    let pool = pool().await?;
    let status = sqlx::query_scalar::<_, String>("SELECT status FROM jobs WHERE job_number = $1")
        .bind(job_number)
        .fetch_optional(&pool)
        .await?;
    Ok(status)
}

/// Update a job's workflow status; `None` when the job does not exist.
pub async fn update_job_status(
    job_number: &str,
    status: &str,
) -> Result<Option<Value>, DatabaseError> {
    let pool = pool().await?;
    let row = sqlx::query(
        "UPDATE jobs SET status = $2 WHERE job_number = $1 RETURNING to_jsonb(jobs) AS row",
    )
    .bind(job_number)
    .bind(status)
    .fetch_optional(&pool)
    .await?;

    row.map(|r| r.try_get::<Value, _>("row"))
        .transpose()
        .map_err(DatabaseError::from)
}

/// Winding records for one job, each joined with the parent job status so
/// the stage gate has per-record context.
pub async fn winding_for_job(job_number: &str) -> Result<Vec<Value>, DatabaseError> {
    let pool = pool().await?;
    let rows = sqlx::query(
        "SELECT row_to_json(t) AS row FROM (\
            SELECT wd.*, j.status AS job_status \
            FROM winding_details wd JOIN jobs j ON j.job_number = wd.job_number \
            WHERE wd.job_number = $1 \
            ORDER BY wd.winding_id\
         ) t",
    )
    .bind(job_number)
    .fetch_all(&pool)
    .await?;

    rows.into_iter()
        .map(|r| r.try_get::<Value, _>("row").map_err(DatabaseError::from))
        .collect()
}

pub async fn list_customers() -> Result<Vec<Value>, DatabaseError> {
    let pool = pool().await?;
    let rows = sqlx::query(
        "SELECT row_to_json(c) AS row FROM customers c ORDER BY c.customer_id",
    )
    .fetch_all(&pool)
    .await?;

    rows.into_iter()
        .map(|r| r.try_get::<Value, _>("row").map_err(DatabaseError::from))
        .collect()
}

pub async fn customer_by_id(customer_id: i64) -> Result<Option<Value>, DatabaseError> {
    let pool = pool().await?;
    let row = sqlx::query("SELECT row_to_json(c) AS row FROM customers c WHERE c.customer_id = $1")
        .bind(customer_id)
        .fetch_optional(&pool)
        .await?;

    row.map(|r| r.try_get::<Value, _>("row"))
        .transpose()
        .map_err(DatabaseError::from)
}

pub async fn insert_customer(customer: &NewCustomer) -> Result<Value, DatabaseError> {
    let pool = pool().await?;
    let row = sqlx::query(
        "INSERT INTO customers (name, company_name, phone, email, address, city) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING to_jsonb(customers) AS row",
    )
    .bind(&customer.name)
    .bind(&customer.company_name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(&customer.address)
    .bind(&customer.city)
    .fetch_one(&pool)
    .await?;

    row.try_get::<Value, _>("row").map_err(DatabaseError::from)
}

pub async fn list_inventory(below_reorder: bool) -> Result<Vec<Value>, DatabaseError> {
    let pool = pool().await?;
    let rows = sqlx::query(
        "SELECT row_to_json(i) AS row FROM inventory i \
         WHERE (NOT $1) OR i.quantity <= i.reorder_threshold \
         ORDER BY i.part_name",
    )
    .bind(below_reorder)
    .fetch_all(&pool)
    .await?;

    rows.into_iter()
        .map(|r| r.try_get::<Value, _>("row").map_err(DatabaseError::from))
        .collect()
}

pub async fn document_by_id(document_id: i64) -> Result<Option<Value>, DatabaseError> {
    let pool = pool().await?;
    let row = sqlx::query("SELECT row_to_json(d) AS row FROM documents d WHERE d.document_id = $1")
        .bind(document_id)
        .fetch_optional(&pool)
        .await?;

    row.map(|r| r.try_get::<Value, _>("row"))
        .transpose()
        .map_err(DatabaseError::from)
}
