//! Sensitivity toggle middleware.
//!
//! Computes the per-request hide flag once, injects it as an explicit
//! [`Visibility`] extension for handlers to thread into the filter
//! functions, records attempted bypasses immediately, and records a
//! "Sensitive Data Viewed" event only after the response completes 2xx.

use axum::{extract::Request, middleware::Next, response::Response, Extension};

use crate::audit::AuditLog;
use crate::policy::decision::{decide, SensitiveToggle};

use super::auth::AuthUser;

/// Query parameter carrying the toggle signal.
pub const TOGGLE_PARAM: &str = "hideSensitive";

/// Header alternative, for clients that cannot alter the query string.
pub const TOGGLE_HEADER: &str = "x-hide-sensitive";

/// Per-request visibility, recomputed on every request and never persisted.
#[derive(Debug, Clone, Copy)]
pub struct Visibility {
    pub hide: bool,
}

pub async fn sensitive_info_toggle(
    Extension(audit): Extension<AuditLog>,
    mut request: Request,
    next: Next,
) -> Response {
    let requester = request.extensions().get::<AuthUser>().cloned();
    let toggle = toggle_signal(&request);
    let decision = decide(requester.as_ref(), toggle, request.uri().path());

    if let Some(event) = decision.immediate {
        audit.record(event);
    }

    request.extensions_mut().insert(Visibility {
        hide: decision.hide,
    });

    let response = next.run(request).await;

    // The deferred event fires at most once, and only for a 2xx outcome.
    if response.status().is_success() {
        if let Some(event) = decision.deferred {
            audit.record(event);
        }
    }

    response
}

/// The query parameter wins over the header when both are present.
fn toggle_signal(request: &Request) -> SensitiveToggle {
    let from_query = request.uri().query().and_then(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key.as_ref() == TOGGLE_PARAM)
            .map(|(_, value)| value.into_owned())
    });
    if let Some(value) = from_query {
        return SensitiveToggle::parse(Some(&value));
    }

    let from_header = request
        .headers()
        .get(TOGGLE_HEADER)
        .and_then(|h| h.to_str().ok());
    SensitiveToggle::parse(from_header)
}
