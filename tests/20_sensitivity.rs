mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use motorshop_api::audit::{AuditAction, AuditLog};
use motorshop_api::policy::Role;
use uuid::Uuid;

// These tests drive the real authentication + sensitivity middleware stack
// in-process and assert on the audit events that come out of the queue.

#[tokio::test]
async fn anonymous_hides_and_ignores_the_override() -> Result<()> {
    let (audit, mut rx) = AuditLog::channel();
    let app = common::probe_app(audit);

    let req = Request::builder()
        .uri("/probe?hideSensitive=false")
        .body(Body::empty())?;
    let (status, body) = common::send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hide"], true);
    assert_eq!(body["role"], serde_json::Value::Null);
    assert!(rx.try_recv().is_err(), "anonymous requests emit no events");
    Ok(())
}

#[tokio::test]
async fn worker_bypass_attempt_is_forced_hidden_and_audited_once() -> Result<()> {
    let (audit, mut rx) = AuditLog::channel();
    let app = common::probe_app(audit);
    let user_id = Uuid::new_v4();

    let req = Request::builder()
        .uri("/probe?hideSensitive=false")
        .header("authorization", common::bearer(Role::Worker, user_id, None))
        .body(Body::empty())?;
    let (status, body) = common::send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hide"], true);
    assert_eq!(body["role"], "Worker");

    let event = rx.try_recv().expect("exactly one event");
    assert_eq!(event.action, AuditAction::UnauthorizedSensitiveToggle);
    assert_eq!(event.changed_by, user_id);
    assert_eq!(event.details["role"], "Worker");
    assert_eq!(event.details["route"], "/probe");
    assert!(rx.try_recv().is_err(), "no second event");
    Ok(())
}

#[tokio::test]
async fn customer_bypass_via_header_is_audited() -> Result<()> {
    let (audit, mut rx) = AuditLog::channel();
    let app = common::probe_app(audit);
    let user_id = Uuid::new_v4();

    let req = Request::builder()
        .uri("/probe")
        .header("authorization", common::bearer(Role::Customer, user_id, Some(7)))
        .header("x-hide-sensitive", "false")
        .body(Body::empty())?;
    let (_, body) = common::send(app, req).await;

    assert_eq!(body["hide"], true);
    let event = rx.try_recv().expect("bypass attempt recorded");
    assert_eq!(event.action, AuditAction::UnauthorizedSensitiveToggle);
    assert_eq!(event.details["role"], "Customer");
    Ok(())
}

#[tokio::test]
async fn worker_without_override_emits_nothing() -> Result<()> {
    let (audit, mut rx) = AuditLog::channel();
    let app = common::probe_app(audit);

    let req = Request::builder()
        .uri("/probe")
        .header(
            "authorization",
            common::bearer(Role::Worker, Uuid::new_v4(), None),
        )
        .body(Body::empty())?;
    let (_, body) = common::send(app, req).await;

    assert_eq!(body["hide"], true);
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn admin_show_resolves_and_is_audited_after_success() -> Result<()> {
    let (audit, mut rx) = AuditLog::channel();
    let app = common::probe_app(audit);
    let user_id = Uuid::new_v4();

    let req = Request::builder()
        .uri("/probe?hideSensitive=false")
        .header("authorization", common::bearer(Role::Admin, user_id, None))
        .body(Body::empty())?;
    let (status, body) = common::send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hide"], false);

    let event = rx.try_recv().expect("sensitive view recorded");
    assert_eq!(event.action, AuditAction::SensitiveDataViewed);
    assert_eq!(event.changed_by, user_id);
    assert!(rx.try_recv().is_err(), "at most one emission per request");
    Ok(())
}

#[tokio::test]
async fn admin_show_on_a_failing_route_emits_nothing() -> Result<()> {
    let (audit, mut rx) = AuditLog::channel();
    let app = common::probe_app(audit);

    let req = Request::builder()
        .uri("/boom?hideSensitive=false")
        .header(
            "authorization",
            common::bearer(Role::Admin, Uuid::new_v4(), None),
        )
        .body(Body::empty())?;
    let (status, _) = common::send(app, req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(rx.try_recv().is_err(), "no event for a non-2xx response");
    Ok(())
}

#[tokio::test]
async fn admin_defaults_to_hide_with_no_events() -> Result<()> {
    let (audit, mut rx) = AuditLog::channel();
    let app = common::probe_app(audit);

    let req = Request::builder()
        .uri("/probe")
        .header(
            "authorization",
            common::bearer(Role::Owner, Uuid::new_v4(), None),
        )
        .body(Body::empty())?;
    let (_, body) = common::send(app, req).await;

    assert_eq!(body["hide"], true);
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn invalid_token_is_treated_as_anonymous() -> Result<()> {
    let (audit, mut rx) = AuditLog::channel();
    let app = common::probe_app(audit);

    let req = Request::builder()
        .uri("/probe?hideSensitive=false")
        .header("authorization", "Bearer not-a-real-token")
        .body(Body::empty())?;
    let (status, body) = common::send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hide"], true);
    assert_eq!(body["role"], serde_json::Value::Null);
    assert!(rx.try_recv().is_err());
    Ok(())
}
