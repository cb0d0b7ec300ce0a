//! Route-level role authorization.
//!
//! Coarse accept/reject per route, independent of the sensitivity filtering
//! that further narrows what an accepted request sees. Anonymous requests
//! get 401; a known identity with the wrong role gets 403. The Customer
//! job-ownership check also lives here: it runs after the record is fetched
//! (so a missing job stays 404) and before any filtering.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::policy::{Role, MANAGERS, STAFF};

use super::auth::AuthUser;

fn user_from_parts(parts: &Parts) -> Result<AuthUser, ApiError> {
    parts
        .extensions
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("authentication required"))
}

fn ensure_role(user: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "role {} may not access this resource",
            user.role
        )))
    }
}

/// Any authenticated requester.
pub struct AnyUser(pub AuthUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AnyUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AnyUser(user_from_parts(parts)?))
    }
}

/// Admin, Owner or Worker.
pub struct Staff(pub AuthUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Staff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = user_from_parts(parts)?;
        ensure_role(&user, STAFF)?;
        Ok(Staff(user))
    }
}

/// Admin or Owner.
pub struct Managers(pub AuthUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Managers {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = user_from_parts(parts)?;
        ensure_role(&user, MANAGERS)?;
        Ok(Managers(user))
    }
}

/// A customer may only access a job recorded against their own customer id.
/// Mismatch is access-denied, distinct from not-found.
pub fn ensure_job_access(user: &AuthUser, job_customer_id: Option<i64>) -> Result<(), ApiError> {
    if user.role != Role::Customer {
        return Ok(());
    }
    match (user.customer_id, job_customer_id) {
        (Some(own), Some(owner)) if own == owner => Ok(()),
        _ => Err(ApiError::forbidden("this job belongs to another customer")),
    }
}
