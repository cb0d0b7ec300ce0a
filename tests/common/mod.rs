#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{routing::get, Extension, Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use motorshop_api::audit::AuditLog;
use motorshop_api::auth::{generate_jwt, Claims};
use motorshop_api::middleware::auth::{authenticate, AuthUser};
use motorshop_api::middleware::sensitivity::{sensitive_info_toggle, Visibility};
use motorshop_api::policy::Role;

/// Bearer header value for a token with the given role, signed with the
/// development secret the server config falls back to.
pub fn bearer(role: Role, user_id: Uuid, customer_id: Option<i64>) -> String {
    let claims = Claims::new(
        user_id,
        "test user".to_string(),
        role.as_str().to_string(),
        None,
        customer_id,
    );
    format!("Bearer {}", generate_jwt(claims).expect("dev config has a jwt secret"))
}

/// Echo what the middleware stack decided for this request.
async fn probe(
    Extension(vis): Extension<Visibility>,
    user: Option<Extension<AuthUser>>,
) -> Json<Value> {
    Json(json!({
        "hide": vis.hide,
        "role": user.map(|Extension(u)| u.role.as_str().to_string()),
    }))
}

/// A route that always fails, for the deferred-audit tests.
async fn boom() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"success": false, "error": "boom"})),
    )
}

/// Minimal router running the real authentication + sensitivity stack,
/// without any database-backed handlers.
pub fn probe_app(audit: AuditLog) -> Router {
    Router::new()
        .route("/probe", get(probe))
        .route("/boom", get(boom))
        .layer(from_fn(sensitive_info_toggle))
        .layer(from_fn(authenticate))
        .layer(Extension(audit))
}

/// Drive one request through a router and decode the JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("infallible service");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}
