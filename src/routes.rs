use axum::{
    middleware::from_fn,
    routing::{get, post, put},
    Extension, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::audit::AuditLog;
use crate::handlers;
use crate::middleware::{auth, sensitivity};

/// Build the application router.
///
/// Layer order (outermost first): trace, CORS, audit handle, lenient
/// authentication, sensitivity toggle, routes. Authentication must run
/// before the toggle so the decision sees the requester identity.
pub fn app(audit: AuditLog) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(handlers::auth::login))
        // Protected API (role gates live in the handler extractors)
        .route("/api/auth/whoami", get(handlers::auth::whoami))
        .route(
            "/api/jobs",
            get(handlers::jobs::list).post(handlers::jobs::create),
        )
        .route("/api/jobs/:job_number", get(handlers::jobs::get))
        .route(
            "/api/jobs/:job_number/status",
            put(handlers::jobs::update_status),
        )
        .route(
            "/api/jobs/:job_number/winding",
            get(handlers::winding::list_for_job),
        )
        .route(
            "/api/customers",
            get(handlers::customers::list).post(handlers::customers::create),
        )
        .route(
            "/api/customers/:customer_id",
            get(handlers::customers::get),
        )
        .route("/api/inventory", get(handlers::inventory::list))
        .route("/api/documents/:document_id", get(handlers::documents::get))
        // Global middleware
        .layer(from_fn(sensitivity::sensitive_info_toggle))
        .layer(from_fn(auth::authenticate))
        .layer(Extension(audit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Motorshop API",
            "version": version,
            "description": "Role-aware REST backend for a motor repair service shop",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "jobs": "/api/jobs[/:job_number] (protected)",
                "winding": "/api/jobs/:job_number/winding (staff)",
                "customers": "/api/customers[/:customer_id] (staff)",
                "inventory": "/api/inventory (staff)",
                "documents": "/api/documents/:document_id (staff)",
            },
            "sensitivity": {
                "query": "hideSensitive=true|false",
                "header": "x-hide-sensitive: true|false",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
