use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, verify_password, Claims};
use crate::database::repository;
use crate::error::ApiError;
use crate::middleware::authorize::AnyUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::policy::Role;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - exchange credentials for a bearer token
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let user = repository::user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    // A row with an unknown role would mint a token the authenticator then
    // discards; reject it here instead.
    user.role
        .parse::<Role>()
        .map_err(|e| {
            tracing::error!("user {} has an invalid role: {}", user.user_id, e);
            ApiError::internal_server_error("account is misconfigured")
        })?;

    let claims = Claims::new(
        user.user_id,
        user.name.clone(),
        user.role.clone(),
        user.worker_id,
        user.customer_id,
    );
    let token = generate_jwt(claims).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal_server_error("could not issue token")
    })?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "user_id": user.user_id,
            "name": user.name,
            "role": user.role,
        }
    })))
}

/// GET /api/auth/whoami - echo the authenticated identity
pub async fn whoami(AnyUser(user): AnyUser) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user_id": user.user_id,
        "name": user.name,
        "role": user.role.as_str(),
        "worker_id": user.worker_id,
        "customer_id": user.customer_id,
    })))
}
